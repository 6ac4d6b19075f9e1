//! In-process stand-in for the translator REST API, recording every request.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub raw_query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub(crate) fn query(&self, key: &str) -> Option<&str> {
        let raw = self.raw_query.as_deref()?;
        // Values in these tests never need percent-decoding.
        raw.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct Recorder {
    responses: Mutex<HashMap<String, (u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub(crate) struct FakeAzure {
    addr: SocketAddr,
    recorder: Arc<Recorder>,
}

impl FakeAzure {
    pub(crate) async fn start() -> Self {
        let recorder = Arc::new(Recorder::default());
        let app = Router::new()
            .fallback(record)
            .with_state(Arc::clone(&recorder));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake provider");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, recorder }
    }

    pub(crate) fn respond(self, path: &str, status: u16, body: &str) -> Self {
        self.recorder
            .responses
            .lock()
            .expect("responses lock")
            .insert(path.to_owned(), (status, body.to_owned()));
        self
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.recorder.requests.lock().expect("requests lock").clone()
    }
}

async fn record(
    State(recorder): State<Arc<Recorder>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    recorder
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_owned(),
            raw_query: uri.query().map(str::to_owned),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });

    let (status, body) = recorder
        .responses
        .lock()
        .expect("responses lock")
        .get(uri.path())
        .cloned()
        .unwrap_or((404, String::new()));
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body,
    )
}
