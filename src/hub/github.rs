//! Pull-request creation against the target GitHub repository

use serde_json::Value;
use tracing::info;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};

const GITHUB_API: &str = "https://api.github.com";

/// Client for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_endpoint: String,
    token: String,
    repo: String,
}

impl GithubClient {
    /// Create a client from pipeline configuration
    ///
    /// Requires `GITHUB_TOKEN` and `GITHUB_REPO` to be configured.
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let token = config
            .github_token
            .clone()
            .ok_or_else(|| TranslationError::ConfigError {
                message: "GITHUB_TOKEN is required for pull-request creation".to_string(),
            })?;
        let repo = config
            .github_repo
            .clone()
            .ok_or_else(|| TranslationError::ConfigError {
                message: "GITHUB_REPO is required for pull-request creation".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            api_endpoint: GITHUB_API.to_string(),
            token,
            repo,
        })
    }

    /// Open a pull request from `branch` against the repo's default branch
    ///
    /// Returns a message naming the created PR's URL.
    pub async fn create_pull_request(
        &self,
        branch: &str,
        title: &str,
        description: &str,
    ) -> Result<String> {
        let base_branch = self.default_branch().await?;

        let url = format!("{}/repos/{}/pulls", self.api_endpoint, self.repo);
        let body = serde_json::json!({
            "title": title,
            "body": description,
            "head": branch,
            "base": base_branch,
        });

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
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
        let html_url = json["html_url"].as_str().unwrap_or_default().to_string();

        info!("Pull request created: {}", html_url);
        Ok(format!("Pull Request created: {}", html_url))
    }

    /// Default branch of the target repository
    async fn default_branch(&self) -> Result<String> {
        let url = format!("{}/repos/{}", self.api_endpoint, self.repo);
        let response = self
            .request(reqwest::Method::GET, &url)
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
        json["default_branch"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "repository response has no default_branch".to_string(),
            })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", env!("CARGO_PKG_NAME"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_github() -> TranslatorConfig {
        TranslatorConfig {
            api_key: "test_key".to_string(),
            github_token: Some("gh_token".to_string()),
            github_repo: Some("HAERAE-HUB/hret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        assert!(GithubClient::new(&config_with_github()).is_ok());
    }

    #[test]
    fn test_client_requires_token() {
        let config = TranslatorConfig {
            github_token: None,
            ..config_with_github()
        };
        assert!(GithubClient::new(&config).is_err());
    }

    #[test]
    fn test_client_requires_repo() {
        let config = TranslatorConfig {
            github_repo: None,
            ..config_with_github()
        };
        assert!(GithubClient::new(&config).is_err());
    }
}
