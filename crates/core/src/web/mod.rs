//! HTTP front-end: the translation page, the detection endpoint and a
//! liveness probe.

mod page;

use crate::config::DetectMode;
use crate::debounce::{AutoDetect, AutoDetectStatus, AutoDetector};
use crate::notice::Notice;
use crate::service::TranslatorService;
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub use page::{escape, render, PageView};

pub const BLANK_INPUT_WARNING: &str = "Please enter text to translate.";

/// Shared state handed to every handler.
pub struct AppState {
    service: TranslatorService,
    detector: AutoDetector,
}

impl AppState {
    pub fn new(service: TranslatorService, detect_delay: Duration) -> Self {
        Self {
            service,
            detector: AutoDetector::new(detect_delay),
        }
    }

    pub fn service(&self) -> &TranslatorService {
        &self.service
    }

    pub fn detect_delay(&self) -> Duration {
        self.detector.delay()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslateForm {
    #[serde(default)]
    pub text: String,
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetectBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DetectResponse {
    pub status: AutoDetectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub notices: Vec<Notice>,
}

impl From<&AutoDetect> for DetectResponse {
    fn from(result: &AutoDetect) -> Self {
        let outcome = result.outcome();
        let detected = outcome.and_then(|o| o.detected.as_ref());
        let notices = outcome.map(|o| o.notices.clone()).unwrap_or_default();
        let message = detected
            .map(|d| d.describe())
            .or_else(|| notices.first().map(|n| n.message.clone()));
        Self {
            status: result.status(),
            name: detected.map(|d| d.name.clone()),
            code: detected.map(|d| d.code.clone()),
            confidence: detected.map(|d| d.confidence),
            message,
            notices,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/translate", get(index).post(translate))
        .route("/api/detect", post(detect))
        .route("/healthz", get(health))
        .with_state(state)
}

pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let load = state.service.fetch_languages().await;
    let mut view = PageView::new(&load.catalog, state.service.mode());
    view.notices = load.notices.clone();
    Html(render(&view))
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TranslateForm>,
) -> Html<String> {
    let load = state.service.fetch_languages().await;
    let mut notices = load.notices.clone();

    let outcome = if form.text.trim().is_empty() {
        notices.push(Notice::warning(BLANK_INPUT_WARNING));
        None
    } else {
        let outcome = state
            .service
            .translate(&form.text, form.source.as_deref(), form.target.as_deref())
            .await;
        notices.extend(outcome.notices.iter().cloned());
        Some(outcome)
    };

    let mut view = PageView::new(&load.catalog, state.service.mode());
    view.text = &form.text;
    view.source = form.source.as_deref();
    view.target = form.target.as_deref();
    view.notices = notices;
    if let Some(outcome) = &outcome {
        view.translation = Some(&outcome.text);
        if state.service.mode() == DetectMode::Auto {
            if let Some(detected) = &outcome.detected {
                view.source = Some(detected.name.as_str());
            }
        }
    }
    Html(render(&view))
}

async fn detect(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DetectBody>,
) -> Json<DetectResponse> {
    let result = state.detector.on_input(&state.service, &body.text).await;
    Json(DetectResponse::from(&result))
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LanguageEntry;
    use crate::provider::ScriptedProvider;

    struct TestServer {
        base: String,
        provider: Arc<ScriptedProvider>,
        http: reqwest::Client,
    }

    impl TestServer {
        async fn start(provider: ScriptedProvider, mode: DetectMode) -> Self {
            let provider = Arc::new(provider);
            let service = TranslatorService::new(provider.clone(), mode);
            let state = Arc::new(AppState::new(service, Duration::ZERO));
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let addr = listener.local_addr().expect("addr");
            tokio::spawn(serve(listener, state, std::future::pending()));
            Self {
                base: format!("http://{addr}"),
                provider,
                http: reqwest::Client::new(),
            }
        }

        async fn get(&self, path: &str) -> String {
            self.http
                .get(format!("{}{path}", self.base))
                .send()
                .await
                .expect("send")
                .text()
                .await
                .expect("body")
        }

        async fn submit(&self, fields: &[(&str, &str)]) -> String {
            let body = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields)
                .finish();
            self.http
                .post(format!("{}/translate", self.base))
                .header("content-type", "application/x-www-form-urlencoded")
                .body(body)
                .send()
                .await
                .expect("send")
                .text()
                .await
                .expect("body")
        }

        async fn detect(&self, text: &str) -> serde_json::Value {
            self.http
                .post(format!("{}/api/detect", self.base))
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await
                .expect("send")
                .json()
                .await
                .expect("json")
        }
    }

    fn languages() -> Vec<LanguageEntry> {
        vec![
            LanguageEntry::new("English", "en"),
            LanguageEntry::new("French", "fr"),
            LanguageEntry::new("Spanish", "es"),
        ]
    }

    #[tokio::test]
    async fn index_renders_catalog_with_defaults() {
        let server = TestServer::start(ScriptedProvider::with_languages(languages()), DetectMode::Auto).await;

        let html = server.get("/").await;
        assert!(html.contains("<h1>Azure AI Translator</h1>"));
        assert!(html.contains(r#"<option value="Detect" selected>Detect</option>"#));
        assert!(html.contains(r#"<option value="French" selected>French</option>"#));

        server.get("/").await;
        assert_eq!(server.provider.language_calls(), 1);
    }

    #[tokio::test]
    async fn catalog_failure_still_renders_page() {
        let server = TestServer::start(ScriptedProvider::default(), DetectMode::Auto).await;

        let html = server.get("/").await;
        assert!(html.contains("Error fetching supported languages:"));
        assert!(html.contains("<form"));
        assert_eq!(server.get("/healthz").await, "OK");
    }

    #[tokio::test]
    async fn blank_submit_warns_without_calling_provider() {
        let server = TestServer::start(
            ScriptedProvider::with_languages(languages()).translation("x", None),
            DetectMode::Auto,
        )
        .await;

        let html = server
            .submit(&[("text", "   "), ("source", "Detect"), ("target", "French")])
            .await;
        assert!(html.contains(BLANK_INPUT_WARNING));
        assert!(!html.contains("Translated Text:"));
        assert!(server.provider.translate_requests().is_empty());
    }

    #[tokio::test]
    async fn submit_renders_translation_and_keeps_selection() {
        let server = TestServer::start(
            ScriptedProvider::with_languages(languages()).translation("Bonjour", None),
            DetectMode::Manual,
        )
        .await;

        let html = server
            .submit(&[("text", "Hello"), ("source", "Spanish"), ("target", "French")])
            .await;
        assert!(html.contains(r#"<p id="translation">Bonjour</p>"#));
        assert!(html.contains(r#"<option value="Spanish" selected>Spanish</option>"#));
        assert!(html.contains(">Hello</textarea>"));
    }

    #[tokio::test]
    async fn auto_submit_selects_detected_source() {
        let server = TestServer::start(
            ScriptedProvider::with_languages(languages()).translation("Hello", Some(("es", 0.97))),
            DetectMode::Auto,
        )
        .await;

        let html = server
            .submit(&[("text", "Hola"), ("source", "Detect"), ("target", "English")])
            .await;
        assert!(html.contains("Detected language: Spanish (confidence 97.00%)"));
        assert!(html.contains(r#"<option value="Spanish" selected>Spanish</option>"#));
        assert_eq!(server.provider.translate_requests()[0].from, None);
    }

    #[tokio::test]
    async fn provider_error_renders_sentinel_and_error() {
        let server = TestServer::start(ScriptedProvider::with_languages(languages()), DetectMode::Auto).await;

        let html = server
            .submit(&[("text", "Hello"), ("source", "English"), ("target", "French")])
            .await;
        assert!(html.contains(r#"<p id="translation">Error during translation.</p>"#));
        assert!(html.contains(r#"<div class="notice error">Translation error: HTTP 500"#));
    }

    #[tokio::test]
    async fn detect_endpoint_reports_language() {
        let server = TestServer::start(
            ScriptedProvider::with_languages(languages()).detection("es", 0.97),
            DetectMode::Auto,
        )
        .await;

        let body = server.detect("Hola").await;
        assert_eq!(body["status"], "detected");
        assert_eq!(body["name"], "Spanish");
        assert_eq!(body["code"], "es");
        assert_eq!(body["message"], "Detected language: Spanish (confidence 97.00%)");

        let body = server.detect("  ").await;
        assert_eq!(body["status"], "empty");
        assert_eq!(server.provider.detect_texts().len(), 1);
    }
}
