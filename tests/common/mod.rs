#![allow(dead_code)]

use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::net::TcpListener;
use url::Url;

pub const FIXTURE: &str = include_str!("../fixtures/service_account.json");

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// How the stub answers a token request.
#[derive(Clone)]
enum Reply {
    Accept,
    Reject,
    /// 200 with this raw JSON body.
    Ok(String),
}

#[derive(Clone)]
struct StubState {
    reply: Reply,
    hits: Arc<AtomicUsize>,
}

/// Local stand-in for Google's OAuth token endpoint.
pub struct StubTokenEndpoint {
    pub token_uri: Url,
    hits: Arc<AtomicUsize>,
}

impl StubTokenEndpoint {
    pub async fn accepting() -> Self {
        Self::spawn(Reply::Accept).await
    }

    pub async fn rejecting() -> Self {
        Self::spawn(Reply::Reject).await
    }

    /// Answers every request with status 200 and `body` as JSON content.
    pub async fn responding_with(body: impl Into<String>) -> Self {
        Self::spawn(Reply::Ok(body.into())).await
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Service-account payload whose `token_uri` points at this stub.
    pub fn credential_payload(&self) -> Value {
        let mut payload: Value = serde_json::from_str(FIXTURE).expect("fixture is valid JSON");
        payload["token_uri"] = json!(self.token_uri.as_str());
        payload
    }

    async fn spawn(reply: Reply) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = StubState {
            reply,
            hits: hits.clone(),
        };
        let app = Router::new()
            .route("/token", post(token))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind stub listener");
        let addr = listener.local_addr().expect("stub listener has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server failed");
        });

        let token_uri = Url::parse(&format!("http://{addr}/token")).expect("valid stub URL");
        Self { token_uri, hits }
    }
}

async fn token(
    State(state): State<StubState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let well_formed = form.get("grant_type").map(String::as_str) == Some(JWT_BEARER_GRANT)
        && form
            .get("assertion")
            .is_some_and(|a| a.split('.').count() == 3);

    match state.reply {
        Reply::Accept if well_formed => (
            StatusCode::OK,
            Json(json!({
                "access_token": "ya29.stub-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })),
        )
            .into_response(),
        Reply::Ok(body) => (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid JWT Signature."
            })),
        )
            .into_response(),
    }
}

/// A `token_uri` on a port with nothing listening.
pub async fn closed_token_uri() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind probe listener");
    let addr = listener.local_addr().expect("probe listener has no address");
    drop(listener);
    Url::parse(&format!("http://{addr}/token")).expect("valid URL")
}
