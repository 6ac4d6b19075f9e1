//! Name-level translation and detection on top of a [`TranslationProvider`].
//!
//! Operations here never fail: provider and selection errors become
//! [`Notice`]s plus a sentinel value, so the page stays usable.

use crate::catalog::{CatalogCache, CatalogLoad, LanguageCatalog, DETECT_SENTINEL};
use crate::config::DetectMode;
use crate::notice::Notice;
use crate::provider::{Detection, TranslationProvider, TranslationRequest};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub const INVALID_SELECTION_TEXT: &str = "Invalid language selection.";
pub const TRANSLATION_FAILED_TEXT: &str = "Error during translation.";

/// What the translate action produced. Only `Translated` carries provider
/// content; the other variants render as fixed messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslationText {
    Translated(String),
    InvalidSelection,
    Failed,
}

impl TranslationText {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Translated(text) => text,
            Self::InvalidSelection => INVALID_SELECTION_TEXT,
            Self::Failed => TRANSLATION_FAILED_TEXT,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

impl fmt::Display for TranslationText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DetectedLanguage {
    /// Catalog display name, or the raw code when the catalog lacks it.
    pub name: String,
    pub code: String,
    pub confidence: f64,
}

impl DetectedLanguage {
    fn resolve(detection: Detection, catalog: &LanguageCatalog) -> Self {
        Self {
            name: catalog.display_name(&detection.code),
            code: detection.code,
            confidence: detection.score,
        }
    }

    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }

    pub fn describe(&self) -> String {
        format!(
            "Detected language: {} (confidence {})",
            self.name,
            self.confidence_percent()
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TranslateOutcome {
    pub text: TranslationText,
    pub detected: Option<DetectedLanguage>,
    pub notices: Vec<Notice>,
}

impl TranslateOutcome {
    fn invalid_selection() -> Self {
        Self {
            text: TranslationText::InvalidSelection,
            detected: None,
            notices: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectOutcome {
    pub detected: Option<DetectedLanguage>,
    pub notices: Vec<Notice>,
}

pub struct TranslatorService {
    provider: Arc<dyn TranslationProvider>,
    mode: DetectMode,
    catalog: CatalogCache,
}

impl TranslatorService {
    pub fn new(provider: Arc<dyn TranslationProvider>, mode: DetectMode) -> Self {
        Self {
            provider,
            mode,
            catalog: CatalogCache::new(),
        }
    }

    pub fn mode(&self) -> DetectMode {
        self.mode
    }

    /// Fetches the catalog on first use; later calls return the stored load.
    pub async fn fetch_languages(&self) -> &CatalogLoad {
        self.catalog.get_or_fetch(self.provider.as_ref()).await
    }

    pub async fn translate(
        &self,
        text: &str,
        source_name: Option<&str>,
        target_name: Option<&str>,
    ) -> TranslateOutcome {
        let catalog = Arc::clone(&self.fetch_languages().await.catalog);

        let Some(to) = target_name.and_then(|name| catalog.code_for(name)) else {
            tracing::debug!(target_name = ?target_name, "target language does not resolve");
            return TranslateOutcome::invalid_selection();
        };

        let from = match (self.mode, source_name) {
            (DetectMode::Auto, None) | (DetectMode::Auto, Some(DETECT_SENTINEL)) => None,
            (DetectMode::Auto, Some(name)) => catalog.code_for(name),
            (DetectMode::Manual, name) => match name.and_then(|n| catalog.code_for(n)) {
                Some(code) => Some(code),
                None => {
                    tracing::debug!(source_name = ?name, "source language does not resolve");
                    return TranslateOutcome::invalid_selection();
                }
            },
        };

        let request = TranslationRequest {
            text: text.to_owned(),
            from: from.map(str::to_owned),
            to: to.to_owned(),
        };
        tracing::info!(to, from = ?from, chars = text.chars().count(), "translating");

        match self.provider.translate(request).await {
            Ok(result) => {
                let detected = result
                    .detected
                    .map(|d| DetectedLanguage::resolve(d, &catalog));
                let notices = detected.iter().map(|d| Notice::info(d.describe())).collect();
                TranslateOutcome {
                    text: TranslationText::Translated(result.text),
                    detected,
                    notices,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "translation failed");
                TranslateOutcome {
                    text: TranslationText::Failed,
                    detected: None,
                    notices: vec![Notice::error(format!("Translation error: {e}"))],
                }
            }
        }
    }

    pub async fn detect_language(&self, text: &str) -> DetectOutcome {
        if text.trim().is_empty() {
            return DetectOutcome::default();
        }

        let catalog = Arc::clone(&self.fetch_languages().await.catalog);
        match self.provider.detect(text.to_owned()).await {
            Ok(detection) => {
                tracing::debug!(code = %detection.code, score = detection.score, "language detected");
                DetectOutcome {
                    detected: Some(DetectedLanguage::resolve(detection, &catalog)),
                    notices: Vec::new(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "language detection failed");
                DetectOutcome {
                    detected: None,
                    notices: vec![Notice::error(format!("Language detection error: {e}"))],
                }
            }
        }
    }
}
