//! Core data models for dataset translation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::errors::{Result, TranslationError};

/// One message of a chat-completion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Build a user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling options for a completion call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Decoded completion response item
///
/// `text` is `None` when the response does not carry the expected
/// `choices[0].message.content` shape; the raw payload is kept for logging.
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    pub text: Option<String>,
    pub raw: serde_json::Value,
}

impl TranslationOutput {
    /// Decode a raw response item. Never fails: a missing or malformed
    /// content field yields `text: None`.
    pub fn decode(raw: serde_json::Value) -> Self {
        let text = raw
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string());

        Self { text, raw }
    }
}

/// Whether a batch came back translated or fell through untranslated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// The backend call succeeded and the texts are translations
    Translated,
    /// All retries were exhausted; the texts are the original inputs
    Fallback,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Translated => write!(f, "translated"),
            BatchStatus::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result of one batch translation
///
/// `texts` always has the same length and ordering as the input batch,
/// including the fallback case.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub texts: Vec<String>,
    pub status: BatchStatus,
}

impl BatchOutcome {
    pub fn translated(texts: Vec<String>) -> Self {
        Self {
            texts,
            status: BatchStatus::Translated,
        }
    }

    pub fn fallback(texts: Vec<String>) -> Self {
        Self {
            texts,
            status: BatchStatus::Fallback,
        }
    }

    /// True when the batch fell through untranslated
    pub fn is_fallback(&self) -> bool {
        self.status == BatchStatus::Fallback
    }
}

/// Rectangular table of string cells with named columns
///
/// Stand-in for the dataframe shape the pipeline moves around: every cell is
/// already stringified at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create an empty table with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; the row width must match the column count
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(TranslationError::DatasetError {
                message: format!(
                    "row width {} does not match column count {}",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Replace all column names positionally
    ///
    /// Duplicate names among the replacements are accepted as-is.
    pub fn rename_columns(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(TranslationError::DatasetError {
                message: format!(
                    "{} replacement names for {} columns",
                    names.len(),
                    self.columns.len()
                ),
            });
        }
        self.columns = names;
        Ok(())
    }

    /// Owned copy of one column's values, top to bottom
    pub fn column_values(&self, index: usize) -> Vec<String> {
        self.rows.iter().map(|row| row[index].clone()).collect()
    }

    /// Replace one column's values, top to bottom
    pub fn set_column(&mut self, index: usize, values: Vec<String>) -> Result<()> {
        if index >= self.columns.len() {
            return Err(TranslationError::DatasetError {
                message: format!("column index {} out of range", index),
            });
        }
        if values.len() != self.rows.len() {
            return Err(TranslationError::DatasetError {
                message: format!(
                    "{} values for {} rows in column {}",
                    values.len(),
                    self.rows.len(),
                    self.columns[index]
                ),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
        Ok(())
    }

    /// First `n` rows as a new table
    pub fn head(&self, n: usize) -> DataTable {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Render as a pipe-delimited markdown table
    pub fn to_markdown(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let render_row = |cells: &[String]| -> String {
            let padded: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let mut out = String::new();
        out.push_str(&render_row(&self.columns));
        out.push('\n');
        let separators: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        out.push_str(&format!("|{}|", separators.join("|")));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
        out
    }

    /// Serialize the whole table as CSV (header row first)
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.columns)
            .map_err(|e| TranslationError::DatasetError {
                message: e.to_string(),
            })?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| TranslationError::DatasetError {
                    message: e.to_string(),
                })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| TranslationError::DatasetError {
                message: e.to_string(),
            })?;
        String::from_utf8(bytes).map_err(|e| TranslationError::DatasetError {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> DataTable {
        let mut table = DataTable::new(vec!["question".to_string(), "answer".to_string()]);
        table
            .push_row(vec!["hello".to_string(), "world".to_string()])
            .unwrap();
        table
            .push_row(vec!["foo".to_string(), "bar".to_string()])
            .unwrap();
        table
    }

    #[test]
    fn test_decode_well_formed_response() {
        let raw = json!({
            "choices": [{"message": {"content": "  안녕하세요  "}}]
        });
        let output = TranslationOutput::decode(raw);
        assert_eq!(output.text.as_deref(), Some("안녕하세요"));
    }

    #[test]
    fn test_decode_missing_choices() {
        let output = TranslationOutput::decode(json!({"error": "rate limited"}));
        assert!(output.text.is_none());
    }

    #[test]
    fn test_decode_empty_choices() {
        let output = TranslationOutput::decode(json!({"choices": []}));
        assert!(output.text.is_none());
    }

    #[test]
    fn test_decode_non_string_content() {
        let raw = json!({"choices": [{"message": {"content": 42}}]});
        let output = TranslationOutput::decode(raw);
        assert!(output.text.is_none());
    }

    #[test]
    fn test_decode_keeps_raw_payload() {
        let raw = json!({"choices": [{"message": {"content": "ok"}}], "id": "req-1"});
        let output = TranslationOutput::decode(raw.clone());
        assert_eq!(output.raw, raw);
    }

    #[test]
    fn test_push_row_width_mismatch() {
        let mut table = DataTable::new(vec!["a".to_string()]);
        assert!(table
            .push_row(vec!["x".to_string(), "y".to_string()])
            .is_err());
    }

    #[test]
    fn test_rename_columns_positional() {
        let mut table = sample_table();
        table
            .rename_columns(vec!["질문".to_string(), "답변".to_string()])
            .unwrap();
        assert_eq!(table.column_names(), &["질문", "답변"]);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn test_rename_columns_allows_duplicates() {
        let mut table = sample_table();
        table
            .rename_columns(vec!["같음".to_string(), "같음".to_string()])
            .unwrap();
        assert_eq!(table.column_names(), &["같음", "같음"]);
    }

    #[test]
    fn test_set_column_roundtrip() {
        let mut table = sample_table();
        table
            .set_column(1, vec!["세계".to_string(), "막대".to_string()])
            .unwrap();
        assert_eq!(table.column_values(1), vec!["세계", "막대"]);
        assert_eq!(table.column_values(0), vec!["hello", "foo"]);
    }

    #[test]
    fn test_set_column_length_mismatch() {
        let mut table = sample_table();
        assert!(table.set_column(0, vec!["only one".to_string()]).is_err());
    }

    #[test]
    fn test_head_truncates() {
        let table = sample_table();
        assert_eq!(table.head(1).n_rows(), 1);
        assert_eq!(table.head(10).n_rows(), 2);
    }

    #[test]
    fn test_markdown_has_header_and_rows() {
        let table = sample_table();
        let md = table.to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("question"));
        assert!(lines[1].starts_with('|'));
        assert!(lines[2].contains("hello"));
    }

    #[test]
    fn test_csv_quotes_embedded_commas() {
        let mut table = DataTable::new(vec!["text".to_string()]);
        table.push_row(vec!["a, b".to_string()]).unwrap();
        let csv = table.to_csv().unwrap();
        assert_eq!(csv, "text\n\"a, b\"\n");
    }
}
