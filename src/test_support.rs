//! Test helpers: signed tokens and an in-process stub of the backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::config::{ApiConfig, Config};
use crate::session::Session;
use crate::Portal;

/// A login token shaped like the backend's, signed with a throwaway key
pub(crate) fn issue_token(role: Option<&str>, name: &str, department: &str) -> String {
    let mut claims = json!({
        "id": format!("id-{}", name.to_lowercase()),
        "name": name,
        "department": department,
    });
    if let Some(role) = role {
        claims["role"] = json!(role);
    }
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test"))
        .expect("token encodes")
}

pub(crate) fn session(role: &str, name: &str, department: &str) -> Session {
    Session::from_token(&issue_token(Some(role), name, department)).expect("token decodes")
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    /// Multipart parts as (name, text or file name), in the order sent
    pub form: Vec<(String, String)>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct StubState {
    /// `None` answers with an empty body
    routes: Mutex<HashMap<(String, String), (u16, Option<Value>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Backend stand-in that answers canned JSON and records every request
pub(crate) struct StubBackend {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr: SocketAddr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Answer `method path` (path without the `/api` prefix) with `status` and `body`
    pub fn on(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state
            .routes
            .lock()
            .insert((method.to_string(), path.to_string()), (status, Some(body)));
    }

    /// Answer `method path` with `status` and no body at all
    pub fn on_empty(&self, method: &str, path: &str, status: u16) {
        self.state
            .routes
            .lock()
            .insert((method.to_string(), path.to_string()), (status, None));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last_body(&self, method: &str, path: &str) -> Option<Value> {
        self.state
            .requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .and_then(|r| r.body.clone())
    }

    /// Multipart parts of the last `method path` request
    pub fn last_form(&self, method: &str, path: &str) -> Option<Vec<(String, String)>> {
        self.state
            .requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .map(|r| r.form.clone())
    }

    pub fn config(&self) -> Config {
        Config {
            api: ApiConfig {
                base_url: self.base_url.clone(),
                ..ApiConfig::default()
            },
            ..Config::default()
        }
    }

    /// Portal signed in with `role` against this backend
    pub fn portal(&self, role: &str) -> Portal {
        self.portal_with(self.config(), Some(session(role, "Ada", "IT")))
    }

    pub fn portal_with(&self, config: Config, session: Option<Session>) -> Portal {
        Portal::new(config, session).expect("portal builds")
    }
}

async fn handle(State(state): State<Arc<StubState>>, request: Request) -> Response {
    let method = request.method().to_string();
    let full_path = request.uri().path().to_string();
    let path = full_path
        .strip_prefix("/api")
        .unwrap_or(&full_path)
        .to_string();
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let (body, form) = if is_multipart {
        (None, form_parts(request).await)
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        (serde_json::from_slice(&bytes).ok(), Vec::new())
    };

    state.requests.lock().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body,
        form,
        authorization,
    });

    let canned = state.routes.lock().get(&(method, path)).cloned();
    match canned {
        Some((status, body)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            match body {
                Some(body) => (status, Json(body)).into_response(),
                None => status.into_response(),
            }
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"msg": "Not stubbed"}))).into_response(),
    }
}

async fn form_parts(request: Request) -> Vec<(String, String)> {
    let Ok(mut multipart) = Multipart::from_request(request, &()).await else {
        return Vec::new();
    };
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name().map(str::to_string) {
            Some(file_name) => file_name,
            None => field.text().await.unwrap_or_default(),
        };
        parts.push((name, value));
    }
    parts
}
