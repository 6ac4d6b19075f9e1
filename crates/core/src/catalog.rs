use crate::config::DetectMode;
use crate::notice::Notice;
use crate::provider::TranslationProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Synthetic source choice meaning "let the provider infer the language".
pub const DETECT_SENTINEL: &str = "Detect";
pub const PREFERRED_SOURCE: &str = "English";
pub const PREFERRED_TARGET: &str = "French";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageEntry {
    pub display_name: String,
    pub code: String,
}

impl LanguageEntry {
    pub fn new<N: Into<String>, C: Into<String>>(display_name: N, code: C) -> Self {
        Self {
            display_name: display_name.into(),
            code: code.into(),
        }
    }
}

/// Display name -> provider code, in provider order.
///
/// When two codes share a display name the later code wins, and the name
/// keeps the position where it first appeared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    entries: Vec<LanguageEntry>,
}

impl LanguageCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = LanguageEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            match catalog
                .entries
                .iter_mut()
                .find(|e| e.display_name == entry.display_name)
            {
                Some(existing) => existing.code = entry.code,
                None => catalog.entries.push(entry),
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.display_name.as_str())
    }

    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.display_name == name)
            .map(|e| e.code.as_str())
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.display_name.as_str())
    }

    /// Display name for `code`, or the raw code when the catalog has no entry.
    pub fn display_name(&self, code: &str) -> String {
        self.name_for(code).unwrap_or(code).to_owned()
    }

    pub fn default_source(&self) -> Option<&str> {
        self.preferred_or_first(PREFERRED_SOURCE)
    }

    pub fn default_target(&self) -> Option<&str> {
        self.preferred_or_first(PREFERRED_TARGET)
    }

    pub fn source_choices(&self, mode: DetectMode) -> Vec<&str> {
        match mode {
            DetectMode::Auto => std::iter::once(DETECT_SENTINEL).chain(self.names()).collect(),
            DetectMode::Manual => self.names().collect(),
        }
    }

    pub fn target_choices(&self) -> Vec<&str> {
        self.names().filter(|n| *n != DETECT_SENTINEL).collect()
    }

    fn preferred_or_first(&self, preferred: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.display_name == preferred)
            .or_else(|| self.entries.first())
            .map(|e| e.display_name.as_str())
    }
}

/// Result of the one catalog fetch a process performs.
#[derive(Clone, Debug, Default)]
pub struct CatalogLoad {
    pub catalog: Arc<LanguageCatalog>,
    pub notices: Vec<Notice>,
}

/// Initialise-once holder for the language catalog. A failed fetch is
/// stored as an empty catalog and is not retried.
#[derive(Debug, Default)]
pub struct CatalogCache {
    cell: OnceCell<CatalogLoad>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&CatalogLoad> {
        self.cell.get()
    }

    pub async fn get_or_fetch(&self, provider: &dyn TranslationProvider) -> &CatalogLoad {
        self.cell
            .get_or_init(|| async {
                match provider.languages().await {
                    Ok(entries) => {
                        let catalog = LanguageCatalog::from_entries(entries);
                        tracing::info!(languages = catalog.len(), "language catalog loaded");
                        CatalogLoad {
                            catalog: Arc::new(catalog),
                            notices: Vec::new(),
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "fetching supported languages failed");
                        CatalogLoad {
                            catalog: Arc::new(LanguageCatalog::default()),
                            notices: vec![Notice::error(format!(
                                "Error fetching supported languages: {e}"
                            ))],
                        }
                    }
                }
            })
            .await
    }
}
