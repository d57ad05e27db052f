//! Batch translation client with retry and fallback logic

use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::core::backend::{CompletionBackend, HttpBackend};
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{BatchOutcome, ChatMessage, CompletionOptions, TranslationOutput};

/// Prompt template for Korean translation
pub const TRANSLATION_PROMPT: &str =
    "Translate the following text to Korean: {source}, Translation:";

/// Fill the translation prompt template with the source text
pub fn translation_prompt(source: &str) -> String {
    TRANSLATION_PROMPT.replace("{source}", source)
}

/// Extract the text enclosed by `<translation>...</translation>` tags
///
/// Returns `None` when the tags are not present.
pub fn translation_section(text: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"(?s)<translation>(.*?)</translation>").unwrap());
    re.captures(text).map(|caps| caps[1].trim().to_string())
}

/// Batch translator over a completion backend
///
/// Retry is all-or-nothing per batch: a failed call is retried whole, and a
/// batch that exhausts its attempts is returned untranslated. A malformed
/// item inside a successful call becomes an empty string for that item only.
#[derive(Clone)]
pub struct BatchTranslator {
    backend: Arc<dyn CompletionBackend>,
    config: Arc<TranslatorConfig>,
}

impl BatchTranslator {
    /// Create a translator with the default HTTP backend
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;
        let backend = Arc::new(HttpBackend::new(&config)?);
        Ok(Self {
            backend,
            config: Arc::new(config),
        })
    }

    /// Create a translator over a caller-supplied backend
    pub fn with_backend(config: TranslatorConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::load()?;
        Self::new(config)
    }

    /// Pipeline configuration
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Backend handle, for collaborators that issue their own calls
    pub fn backend(&self) -> Arc<dyn CompletionBackend> {
        Arc::clone(&self.backend)
    }

    /// Translate a batch of texts to Korean
    ///
    /// The returned texts always match the input in length and order. After
    /// `max_retries` failed attempts the original texts are echoed back with
    /// status [`crate::core::models::BatchStatus::Fallback`].
    pub async fn translate(&self, texts: &[String]) -> BatchOutcome {
        if texts.is_empty() {
            return BatchOutcome::translated(Vec::new());
        }

        let payloads: Vec<Vec<ChatMessage>> = texts
            .iter()
            .map(|text| vec![ChatMessage::user(translation_prompt(text))])
            .collect();
        let options = CompletionOptions::default();

        for attempt in 1..=self.config.max_retries {
            match self.attempt_batch(&payloads, texts.len(), &options).await {
                Ok(translations) => {
                    if attempt > 1 {
                        info!("Batch translation succeeded on attempt {}", attempt);
                    }
                    return BatchOutcome::translated(translations);
                }
                Err(e) => {
                    warn!("Batch translation attempt {} failed: {}", attempt, e);
                    if attempt < self.config.max_retries {
                        sleep(self.config.sleep_duration()).await;
                    }
                }
            }
        }

        error!("Max retries reached for batch translation");
        BatchOutcome::fallback(texts.to_vec())
    }

    /// One whole-batch attempt: call the backend and decode every item
    async fn attempt_batch(
        &self,
        payloads: &[Vec<ChatMessage>],
        expected: usize,
        options: &CompletionOptions,
    ) -> Result<Vec<String>> {
        let responses = self
            .backend
            .complete_batch(&self.config.model, payloads, options)
            .await?;

        if responses.len() != expected {
            return Err(TranslationError::InvalidResponseError {
                message: format!(
                    "expected {} response items, got {}",
                    expected,
                    responses.len()
                ),
            });
        }

        let translations = responses
            .into_iter()
            .map(|raw| {
                let output = TranslationOutput::decode(raw);
                match output.text {
                    Some(text) => translation_section(&text).unwrap_or(text),
                    None => {
                        debug!("Unparseable response item: {}", output.raw);
                        String::new()
                    }
                }
            })
            .collect();

        Ok(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend that replays a scripted sequence of call results
    struct MockBackend {
        calls: AtomicUsize,
        payload_counts: Mutex<Vec<usize>>,
        script: Mutex<VecDeque<Result<Vec<Value>>>>,
    }

    impl MockBackend {
        fn new(script: Vec<Result<Vec<Value>>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                payload_counts: Mutex::new(Vec::new()),
                script: Mutex::new(script.into()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for MockBackend {
        async fn complete_batch(
            &self,
            _model: &str,
            payloads: &[Vec<ChatMessage>],
            _options: &CompletionOptions,
        ) -> Result<Vec<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payload_counts.lock().unwrap().push(payloads.len());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock script exhausted")
        }
    }

    fn ok_call(contents: &[&str]) -> Result<Vec<Value>> {
        Ok(contents
            .iter()
            .map(|c| json!({"choices": [{"message": {"content": c}}]}))
            .collect())
    }

    fn failed_call() -> Result<Vec<Value>> {
        Err(TranslationError::NetworkError {
            message: "connection reset".to_string(),
        })
    }

    fn test_config() -> TranslatorConfig {
        TranslatorConfig {
            api_key: "test_key".to_string(),
            max_retries: 3,
            sleep_time: 0.0,
            ..Default::default()
        }
    }

    fn translator(backend: Arc<MockBackend>) -> BatchTranslator {
        BatchTranslator::with_backend(test_config(), backend)
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_translation_prompt_substitution() {
        let prompt = translation_prompt("hello");
        assert_eq!(
            prompt,
            "Translate the following text to Korean: hello, Translation:"
        );
    }

    #[test]
    fn test_translation_section_extraction() {
        let text = "sure!\n<translation>안녕하세요</translation>\nanything else?";
        assert_eq!(translation_section(text).as_deref(), Some("안녕하세요"));
    }

    #[test]
    fn test_translation_section_absent() {
        assert!(translation_section("안녕하세요").is_none());
    }

    #[tokio::test]
    async fn test_translate_success_first_attempt() {
        let backend = MockBackend::new(vec![ok_call(&["안녕", "세계"])]);
        let translator = translator(Arc::clone(&backend));

        let outcome = translator.translate(&texts(&["hello", "world"])).await;

        assert_eq!(outcome.texts, vec!["안녕", "세계"]);
        assert!(!outcome.is_fallback());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_translate_preserves_length_and_order() {
        let backend = MockBackend::new(vec![ok_call(&["영", "일", "이", "삼"])]);
        let translator = translator(Arc::clone(&backend));

        let input = texts(&["zero", "one", "two", "three"]);
        let outcome = translator.translate(&input).await;

        assert_eq!(outcome.texts.len(), input.len());
        assert_eq!(outcome.texts, vec!["영", "일", "이", "삼"]);
        assert_eq!(*backend.payload_counts.lock().unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn test_translate_retries_then_succeeds() {
        let backend = MockBackend::new(vec![
            failed_call(),
            failed_call(),
            ok_call(&["고양이"]),
        ]);
        let translator = translator(Arc::clone(&backend));

        let outcome = translator.translate(&texts(&["cat"])).await;

        assert_eq!(outcome.texts, vec!["고양이"]);
        assert!(!outcome.is_fallback());
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_translate_exhausts_retries_returns_original() {
        let backend = MockBackend::new(vec![failed_call(), failed_call(), failed_call()]);
        let translator = translator(Arc::clone(&backend));

        let outcome = translator.translate(&texts(&["x"])).await;

        assert_eq!(outcome.texts, vec!["x"]);
        assert!(outcome.is_fallback());
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_malformed_item_becomes_empty_without_retry() {
        let backend = MockBackend::new(vec![Ok(vec![
            json!({"choices": [{"message": {"content": "안녕"}}]}),
            json!({"unexpected": true}),
        ])]);
        let translator = translator(Arc::clone(&backend));

        let outcome = translator.translate(&texts(&["hello", "world"])).await;

        assert_eq!(outcome.texts, vec!["안녕", ""]);
        assert!(!outcome.is_fallback());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_response_count_mismatch_triggers_retry() {
        let backend = MockBackend::new(vec![
            ok_call(&["하나만"]),
            ok_call(&["하나", "둘"]),
        ]);
        let translator = translator(Arc::clone(&backend));

        let outcome = translator.translate(&texts(&["one", "two"])).await;

        assert_eq!(outcome.texts, vec!["하나", "둘"]);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_tagged_response_is_unwrapped() {
        let backend = MockBackend::new(vec![ok_call(&[
            "Here you go: <translation>번역된 텍스트</translation>",
        ])]);
        let translator = translator(Arc::clone(&backend));

        let outcome = translator.translate(&texts(&["some text"])).await;

        assert_eq!(outcome.texts, vec!["번역된 텍스트"]);
    }

    #[tokio::test]
    async fn test_empty_input_skips_backend() {
        let backend = MockBackend::new(vec![]);
        let translator = translator(Arc::clone(&backend));

        let outcome = translator.translate(&[]).await;

        assert!(outcome.texts.is_empty());
        assert!(!outcome.is_fallback());
        assert_eq!(backend.calls(), 0);
    }
}
