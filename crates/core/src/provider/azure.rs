use crate::catalog::LanguageEntry;
use crate::config::Credentials;
use crate::provider::{
    Detection, ProviderError, TranslationProvider, TranslationRequest, TranslationResult,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_VERSION: &str = "3.0";
const HEADER_SUBSCRIPTION_KEY: &str = "Ocp-Apim-Subscription-Key";
const HEADER_SUBSCRIPTION_REGION: &str = "Ocp-Apim-Subscription-Region";

/// Client for the Azure AI Translator v3 REST API.
#[derive(Clone)]
pub struct AzureTranslator {
    client: Client,
    credentials: Credentials,
}

impl AzureTranslator {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<RequestBuilder, ProviderError> {
        let url = self.credentials.endpoint.url(path, params)?;
        tracing::debug!(%method, %url, "provider request");
        Ok(self
            .client
            .request(method, url)
            .header(HEADER_SUBSCRIPTION_KEY, self.credentials.api_key.expose())
            .header(HEADER_SUBSCRIPTION_REGION, self.credentials.region.as_str())
            .header(CONTENT_TYPE, "application/json"))
    }
}

#[derive(Serialize)]
struct TextItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Deserialize)]
struct LanguagesResponse {
    // Map keeps provider order (serde_json `preserve_order`).
    translation: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct LanguageDetails {
    name: String,
}

#[derive(Deserialize)]
struct TranslateItem {
    translations: Vec<TranslatedText>,
    #[serde(rename = "detectedLanguage")]
    detected_language: Option<DetectItem>,
}

#[derive(Deserialize)]
struct TranslatedText {
    text: String,
}

#[derive(Deserialize)]
struct DetectItem {
    language: String,
    score: f64,
}

impl From<DetectItem> for Detection {
    fn from(item: DetectItem) -> Self {
        Self {
            code: item.language,
            score: item.score,
        }
    }
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ProviderError> {
    let response = builder.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status = status.as_u16(), "provider returned error status");
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse JSON: {e}")))
}

fn first<T>(items: Vec<T>, what: &str) -> Result<T, ProviderError> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse(format!("no {what} in response")))
}

impl AzureTranslator {
    async fn fetch_languages(&self) -> Result<Vec<LanguageEntry>, ProviderError> {
        let builder = self.request(
            Method::GET,
            "/languages",
            &[("api-version", API_VERSION), ("scope", "translation")],
        )?;
        let response: LanguagesResponse = send_json(builder).await?;

        response
            .translation
            .into_iter()
            .map(|(code, details)| -> Result<LanguageEntry, ProviderError> {
                let details: LanguageDetails = serde_json::from_value(details).map_err(|e| {
                    ProviderError::InvalidResponse(format!("language `{code}`: {e}"))
                })?;
                Ok(LanguageEntry::new(details.name, code))
            })
            .collect()
    }

    async fn post_translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResult, ProviderError> {
        let mut params = vec![("api-version", API_VERSION), ("to", request.to.as_str())];
        if let Some(from) = request.from.as_deref() {
            params.push(("from", from));
        }

        let builder = self
            .request(Method::POST, "/translate", &params)?
            .json(&[TextItem {
                text: &request.text,
            }]);
        let items: Vec<TranslateItem> = send_json(builder).await?;

        let item = first(items, "translation results")?;
        let translated = first(item.translations, "translations")?;

        Ok(TranslationResult {
            text: translated.text,
            detected: item.detected_language.map(Detection::from),
        })
    }

    async fn post_detect(&self, text: String) -> Result<Detection, ProviderError> {
        let builder = self
            .request(Method::POST, "/detect", &[("api-version", API_VERSION)])?
            .json(&[TextItem { text: &text }]);
        let items: Vec<DetectItem> = send_json(builder).await?;

        Ok(first(items, "detection results")?.into())
    }
}

impl TranslationProvider for AzureTranslator {
    fn languages(&self) -> BoxFuture<'_, Result<Vec<LanguageEntry>, ProviderError>> {
        self.fetch_languages().boxed()
    }

    fn translate(
        &self,
        request: TranslationRequest,
    ) -> BoxFuture<'_, Result<TranslationResult, ProviderError>> {
        self.post_translate(request).boxed()
    }

    fn detect(&self, text: String) -> BoxFuture<'_, Result<Detection, ProviderError>> {
        self.post_detect(text).boxed()
    }
}
