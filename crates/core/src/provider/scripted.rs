use crate::catalog::LanguageEntry;
use crate::provider::{
    Detection, ProviderError, TranslationProvider, TranslationRequest, TranslationResult,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory provider with canned answers. Anything not scripted fails
/// with HTTP 500.
#[derive(Debug, Default)]
pub(crate) struct ScriptedProvider {
    languages: Option<Vec<LanguageEntry>>,
    translation: Option<TranslationResult>,
    detection: Option<Detection>,
    language_calls: AtomicUsize,
    translate_requests: Mutex<Vec<TranslationRequest>>,
    detect_texts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn with_languages(languages: Vec<LanguageEntry>) -> Self {
        Self {
            languages: Some(languages),
            ..Default::default()
        }
    }

    pub(crate) fn translation(mut self, text: &str, detected: Option<(&str, f64)>) -> Self {
        self.translation = Some(TranslationResult {
            text: text.to_owned(),
            detected: detected.map(|(code, score)| Detection {
                code: code.to_owned(),
                score,
            }),
        });
        self
    }

    pub(crate) fn detection(mut self, code: &str, score: f64) -> Self {
        self.detection = Some(Detection {
            code: code.to_owned(),
            score,
        });
        self
    }

    pub(crate) fn language_calls(&self) -> usize {
        self.language_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn translate_requests(&self) -> Vec<TranslationRequest> {
        self.translate_requests
            .lock()
            .expect("translate requests lock")
            .clone()
    }

    pub(crate) fn detect_texts(&self) -> Vec<String> {
        self.detect_texts.lock().expect("detect texts lock").clone()
    }
}

fn server_error() -> ProviderError {
    ProviderError::Status {
        status: 500,
        body: "scripted failure".to_owned(),
    }
}

impl TranslationProvider for ScriptedProvider {
    fn languages(&self) -> BoxFuture<'_, Result<Vec<LanguageEntry>, ProviderError>> {
        self.language_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.languages.clone().ok_or_else(server_error);
        async move { result }.boxed()
    }

    fn translate(
        &self,
        request: TranslationRequest,
    ) -> BoxFuture<'_, Result<TranslationResult, ProviderError>> {
        self.translate_requests
            .lock()
            .expect("translate requests lock")
            .push(request);
        let result = self.translation.clone().ok_or_else(server_error);
        async move { result }.boxed()
    }

    fn detect(&self, text: String) -> BoxFuture<'_, Result<Detection, ProviderError>> {
        self.detect_texts.lock().expect("detect texts lock").push(text);
        let result = self.detection.clone().ok_or_else(server_error);
        async move { result }.boxed()
    }
}
