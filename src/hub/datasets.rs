//! Hugging Face dataset download and upload

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::DataTable;

/// Rows fetched per datasets-server page
const PAGE_SIZE: usize = 100;

/// Organization that receives translated datasets
const TARGET_ORGANIZATION: &str = "HAERAE-HUB";

/// Derive the Hub repo id for a translated dataset
///
/// Path separators in the source name are flattened with underscores.
pub fn translated_repo_id(dataset_name: &str) -> String {
    let safe_name = dataset_name.replace('/', "_");
    format!("{}/hret_agent_{}_translated", TARGET_ORGANIZATION, safe_name)
}

/// Client for the Hugging Face datasets server and Hub API
#[derive(Debug, Clone)]
pub struct HubClient {
    client: reqwest::Client,
    datasets_server: String,
    hub_endpoint: String,
    token: Option<String>,
    write_token: Option<String>,
}

impl HubClient {
    /// Create a client from pipeline configuration
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            datasets_server: "https://datasets-server.huggingface.co".to_string(),
            hub_endpoint: "https://huggingface.co".to_string(),
            token: config.hf_token.clone(),
            write_token: config.hf_write_token.clone(),
        })
    }

    /// List the subset (config) names of a dataset
    ///
    /// Any failure is logged and reported as an empty list.
    pub async fn check_subsets(&self, dataset_name: &str) -> Vec<String> {
        match self.fetch_splits(dataset_name).await {
            Ok(subsets) => subsets,
            Err(e) => {
                error!("Error checking subsets for {}: {}", dataset_name, e);
                Vec::new()
            }
        }
    }

    async fn fetch_splits(&self, dataset_name: &str) -> Result<Vec<String>> {
        let url = format!("{}/splits", self.datasets_server);
        let mut request = self.client.get(&url).query(&[("dataset", dataset_name)]);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let json: Value = response.json().await?;
        Ok(parse_subsets(&json))
    }

    /// Download one split of a dataset as a table of strings
    pub async fn download(
        &self,
        dataset_name: &str,
        subset: Option<&str>,
        split: &str,
    ) -> Result<DataTable> {
        let mut table: Option<DataTable> = None;
        let mut offset = 0usize;

        loop {
            let page = self
                .fetch_rows_page(dataset_name, subset, split, offset)
                .await?;

            let target = table.get_or_insert_with(|| DataTable::new(parse_columns(&page)));
            let fetched = append_rows(&page, target)?;
            offset += fetched;

            let total = page["num_rows_total"].as_u64().unwrap_or(0) as usize;
            debug!("Fetched {}/{} rows of {}", offset, total, dataset_name);
            if fetched == 0 || offset >= total {
                break;
            }
        }

        let table = table.ok_or_else(|| TranslationError::DatasetError {
            message: format!("no rows returned for {}", dataset_name),
        })?;

        info!(
            "Downloaded dataset: {} rows, {} columns",
            table.n_rows(),
            table.n_cols()
        );
        Ok(table)
    }

    async fn fetch_rows_page(
        &self,
        dataset_name: &str,
        subset: Option<&str>,
        split: &str,
        offset: usize,
    ) -> Result<Value> {
        let url = format!("{}/rows", self.datasets_server);
        let offset_s = offset.to_string();
        let length_s = PAGE_SIZE.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("dataset", dataset_name),
            ("split", split),
            ("offset", &offset_s),
            ("length", &length_s),
        ];
        if let Some(config) = subset {
            query.push(("config", config));
        }

        let mut request = self.client.get(&url).query(&query);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    /// Push a translated table to the Hub under the derived repo id
    pub async fn push(&self, table: &DataTable, dataset_name: &str) -> Result<String> {
        let token = self
            .write_token
            .as_ref()
            .ok_or_else(|| TranslationError::ConfigError {
                message: "HF_ACCESS_TOKEN is required to push datasets".to_string(),
            })?;

        let repo_id = translated_repo_id(dataset_name);
        self.ensure_repo(&repo_id, token).await?;
        self.commit_csv(&repo_id, table, token).await?;

        info!("Dataset pushed to HF Hub: {}", repo_id);
        Ok(format!("Successfully pushed to {}", repo_id))
    }

    /// Create the dataset repo; an already-existing repo is fine
    async fn ensure_repo(&self, repo_id: &str, token: &str) -> Result<()> {
        let (organization, name) =
            repo_id
                .split_once('/')
                .ok_or_else(|| TranslationError::HubError {
                    message: format!("invalid repo id: {}", repo_id),
                })?;

        let url = format!("{}/api/repos/create", self.hub_endpoint);
        let body = serde_json::json!({
            "type": "dataset",
            "name": name,
            "organization": organization,
            "private": false,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        // 409 means the repo already exists, which is what we want anyway.
        if !status.is_success() && status.as_u16() != 409 {
            return Err(TranslationError::HubError {
                message: format!(
                    "repo creation failed with {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                ),
            });
        }

        Ok(())
    }

    /// Commit the table as `data/train.csv` via the NDJSON commit endpoint
    async fn commit_csv(&self, repo_id: &str, table: &DataTable, token: &str) -> Result<()> {
        let csv = table.to_csv()?;
        let header = serde_json::json!({
            "key": "header",
            "value": {"summary": "Upload translated dataset", "description": ""},
        });
        let file = serde_json::json!({
            "key": "file",
            "value": {
                "path": "data/train.csv",
                "content": BASE64.encode(csv.as_bytes()),
                "encoding": "base64",
            },
        });
        let body = format!("{}\n{}", header, file);

        let url = format!("{}/api/datasets/{}/commit/main", self.hub_endpoint, repo_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::HubError {
                message: format!(
                    "commit failed with {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                ),
            });
        }

        Ok(())
    }
}

/// Collect subset names from a /splits response, first-seen order
fn parse_subsets(json: &Value) -> Vec<String> {
    let mut subsets = Vec::new();
    if let Some(splits) = json["splits"].as_array() {
        for item in splits {
            if let Some(config) = item["config"].as_str() {
                if !subsets.iter().any(|s| s == config) {
                    subsets.push(config.to_string());
                }
            }
        }
    }
    subsets
}

/// Column names from a /rows response, in feature order
fn parse_columns(page: &Value) -> Vec<String> {
    page["features"]
        .as_array()
        .map(|features| {
            features
                .iter()
                .filter_map(|f| f["name"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Append a /rows page to the table; returns the number of rows appended
fn append_rows(page: &Value, table: &mut DataTable) -> Result<usize> {
    let rows = page["rows"].as_array().cloned().unwrap_or_default();
    let columns = table.column_names().to_vec();
    let count = rows.len();

    for item in rows {
        let row = columns
            .iter()
            .map(|name| cell_to_string(&item["row"][name]))
            .collect();
        table.push_row(row)?;
    }

    Ok(count)
}

/// Stringify one cell the way the pipeline expects: strings stay as-is,
/// nulls become empty, everything else keeps its JSON rendering
fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_translated_repo_id_flattens_separators() {
        assert_eq!(
            translated_repo_id("HAERAE-HUB/QARV"),
            "HAERAE-HUB/hret_agent_HAERAE-HUB_QARV_translated"
        );
    }

    #[test]
    fn test_translated_repo_id_plain_name() {
        assert_eq!(
            translated_repo_id("squad"),
            "HAERAE-HUB/hret_agent_squad_translated"
        );
    }

    #[test]
    fn test_parse_subsets_dedups_across_splits() {
        let json = json!({"splits": [
            {"dataset": "d", "config": "default", "split": "train"},
            {"dataset": "d", "config": "default", "split": "test"},
            {"dataset": "d", "config": "extended", "split": "train"},
        ]});
        assert_eq!(parse_subsets(&json), vec!["default", "extended"]);
    }

    #[test]
    fn test_parse_subsets_bad_shape_is_empty() {
        assert!(parse_subsets(&json!({"error": "not found"})).is_empty());
    }

    #[test]
    fn test_parse_columns_preserves_feature_order() {
        let page = json!({"features": [
            {"feature_idx": 0, "name": "question", "type": {"dtype": "string"}},
            {"feature_idx": 1, "name": "answer", "type": {"dtype": "string"}},
        ]});
        assert_eq!(parse_columns(&page), vec!["question", "answer"]);
    }

    #[test]
    fn test_append_rows_stringifies_cells() {
        let page = json!({
            "features": [
                {"name": "question"}, {"name": "score"}, {"name": "note"},
            ],
            "rows": [
                {"row_idx": 0, "row": {"question": "hi", "score": 3, "note": null}},
                {"row_idx": 1, "row": {"question": "yo", "score": 1.5, "note": "x"}},
            ],
            "num_rows_total": 2,
        });

        let mut table = DataTable::new(parse_columns(&page));
        let appended = append_rows(&page, &mut table).unwrap();

        assert_eq!(appended, 2);
        assert_eq!(table.column_values(0), vec!["hi", "yo"]);
        assert_eq!(table.column_values(1), vec!["3", "1.5"]);
        assert_eq!(table.column_values(2), vec!["", "x"]);
    }

    #[test]
    fn test_hub_client_creation() {
        let config = TranslatorConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };
        assert!(HubClient::new(&config).is_ok());
    }
}
