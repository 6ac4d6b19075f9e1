mod azure;
#[cfg(test)]
mod scripted;

use crate::catalog::LanguageEntry;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use azure::AzureTranslator;
#[cfg(test)]
pub(crate) use scripted::ScriptedProvider;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    /// `None` leaves source detection to the provider.
    pub from: Option<String>,
    pub to: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub code: String,
    /// Provider confidence in `[0, 1]`.
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TranslationResult {
    pub text: String,
    /// Only present when the request omitted `from`.
    pub detected: Option<Detection>,
}

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

pub trait TranslationProvider: Send + Sync {
    /// Languages supported for translation, in provider order.
    fn languages(&self) -> BoxFuture<'_, Result<Vec<LanguageEntry>, ProviderError>>;

    fn translate(
        &self,
        request: TranslationRequest,
    ) -> BoxFuture<'_, Result<TranslationResult, ProviderError>>;

    fn detect(&self, text: String) -> BoxFuture<'_, Result<Detection, ProviderError>>;
}
