//! Whole-table translation over the batch translator

use tracing::{info, warn};

use crate::core::client::BatchTranslator;
use crate::core::errors::Result;
use crate::core::models::DataTable;

/// Translates a table's headers and cell values column by column
#[derive(Clone)]
pub struct DatasetProcessor {
    translator: BatchTranslator,
}

impl DatasetProcessor {
    /// Create a new dataset processor
    pub fn new(translator: BatchTranslator) -> Self {
        Self { translator }
    }

    /// Create from environment configuration
    pub fn from_env() -> Result<Self> {
        let translator = BatchTranslator::from_env()?;
        Ok(Self::new(translator))
    }

    /// Translator handle
    pub fn translator(&self) -> &BatchTranslator {
        &self.translator
    }

    /// Translate column names and every cell value into Korean
    ///
    /// Row and column counts are preserved. Column values are translated in
    /// fixed-size chunks, each chunk strictly after the previous one; a chunk
    /// that exhausted its retries keeps its original text.
    pub async fn translate_table(&self, table: &DataTable) -> Result<DataTable> {
        let mut translated = table.clone();

        // Headers first, as one batch; the mapping is positional and
        // translated names are not checked for uniqueness.
        let headers = table.column_names().to_vec();
        let header_outcome = self.translator.translate(&headers).await;
        if header_outcome.is_fallback() {
            warn!("Column name translation fell back to the original names");
        }
        translated.rename_columns(header_outcome.texts)?;

        let batch_size = self.translator.config().batch_size;
        let mut fallback_chunks = 0usize;

        for index in 0..translated.n_cols() {
            let values = translated.column_values(index);
            let mut column = Vec::with_capacity(values.len());

            for chunk in values.chunks(batch_size) {
                let outcome = self.translator.translate(chunk).await;
                if outcome.is_fallback() {
                    fallback_chunks += 1;
                }
                column.extend(outcome.texts);
            }

            translated.set_column(index, column)?;
        }

        if fallback_chunks > 0 {
            warn!(
                "{} chunk(s) kept their original text after exhausted retries",
                fallback_chunks
            );
        }
        info!(
            "Table translation complete: {} rows, {} columns",
            translated.n_rows(),
            translated.n_cols()
        );

        Ok(translated)
    }
}
