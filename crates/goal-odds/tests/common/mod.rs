#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use goal_odds::config::ApiConfig;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Canned reply for one endpoint.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: value.to_string(),
        }
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// Accept any request.
    Open,
    /// Accept only the most recently issued demo token.
    LatestIssued,
    /// Answer every prediction with 401.
    RejectAll,
}

#[derive(Debug, Clone)]
pub struct Behavior {
    pub predict: Reply,
    pub share: Reply,
    /// `None` issues `demo-<n>` tokens.
    pub login: Option<Reply>,
    pub token_check: TokenCheck,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            predict: Reply::json(json!({
                "probability": 0.68,
                "narrative": "Solid odds given your savings rate.",
                "domain": "finance"
            })),
            share: Reply::json(json!({
                "sharing_data": { "sharing_text": { "medium": "68% to buy a house!" } }
            })),
            login: None,
            token_check: TokenCheck::Open,
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestLog {
    pub predict_bodies: Vec<Value>,
    pub predict_auth: Vec<Option<String>>,
    pub login_bodies: Vec<Value>,
    pub share_bodies: Vec<Value>,
    pub issued: Vec<String>,
}

struct MockState {
    behavior: Behavior,
    log: Mutex<RequestLog>,
}

/// Prediction service stand-in listening on an ephemeral local port.
pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn(behavior: Behavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            log: Mutex::new(RequestLog::default()),
        });
        let app = Router::new()
            .route("/predict", post(predict))
            .route("/auth/demo-login", post(demo_login))
            .route("/shareable-odds", post(shareable_odds))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock backend runs");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url.clone())
    }

    pub fn log(&self) -> MutexGuard<'_, RequestLog> {
        self.state.log.lock().expect("request log lock")
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn predict(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let token = bearer(&headers);
    let mut log = state.log.lock().expect("request log lock");
    log.predict_bodies.push(body);
    log.predict_auth.push(token.clone());

    let authorized = match state.behavior.token_check {
        TokenCheck::Open => true,
        TokenCheck::LatestIssued => token.is_some() && token.as_ref() == log.issued.last(),
        TokenCheck::RejectAll => false,
    };
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "Not authenticated" }).to_string(),
        );
    }

    let reply = &state.behavior.predict;
    (reply.status, reply.body.clone())
}

async fn demo_login(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let mut log = state.log.lock().expect("request log lock");
    log.login_bodies.push(body);
    if let Some(reply) = &state.behavior.login {
        return (reply.status, reply.body.clone());
    }

    let token = format!("demo-{}", log.login_bodies.len());
    log.issued.push(token.clone());
    (StatusCode::OK, json!({ "access_token": token }).to_string())
}

async fn shareable_odds(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state
        .log
        .lock()
        .expect("request log lock")
        .share_bodies
        .push(body);
    let reply = &state.behavior.share;
    (reply.status, reply.body.clone())
}
