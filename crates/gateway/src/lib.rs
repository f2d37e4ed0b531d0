//! HTTP API gateway for Homie.
//!
//! Exposes the chat endpoint consumed by the embeddable widget plus the
//! administrative knowledge endpoints. Built on Axum; CORS is open to any
//! origin so the widget can be embedded anywhere.

pub mod api;
pub mod error;

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use homie_core::error::Error;
use homie_core::persona::Persona;
use homie_core::provider::Provider;
use homie_drive::{DriveClient, HttpDriveClient};
use homie_knowledge::{FragmentSet, KnowledgeStore};

/// Shared application state for the gateway.
///
/// Owned by the composition root; the knowledge store is the only mutable
/// piece and handles its own copy-on-write discipline.
pub struct GatewayState {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub persona: Persona,
    pub store: KnowledgeStore,
    pub drive: Option<Arc<dyn DriveClient>>,
    /// Whether a provider credential was configured at startup. Checked
    /// before every completion call so the failure is a clean 500 rather
    /// than an upstream auth rejection.
    pub provider_configured: bool,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// CORS allows any origin, the methods the widget uses, and any headers;
/// the layer also answers OPTIONS preflights with 200 and no body.
/// Requests with a known path but wrong method get 405 from the router.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(api::chat_handler))
        .route("/api/knowledge", post(api::upload_knowledge_handler))
        .route("/api/knowledge/file", post(api::upload_file_handler))
        .route("/api/sync", post(api::sync_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn serve(config: homie_config::AppConfig) -> homie_core::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = build_state(&config)?;
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind {addr}: {e}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    Ok(())
}

/// Build the shared state from configuration.
pub fn build_state(config: &homie_config::AppConfig) -> homie_core::Result<SharedState> {
    let router = homie_providers::build_from_config(config);
    let provider = router.default().ok_or_else(|| Error::Config {
        message: format!("No provider registered for {:?}", config.provider),
    })?;

    let store = if config.knowledge.persist {
        KnowledgeStore::open(config.knowledge_path())?
    } else {
        KnowledgeStore::in_memory(FragmentSet::default())
    };

    let persona = match &config.persona_override {
        Some(instructions) => Persona::custom(instructions.clone()),
        None => Persona::homie(),
    };

    let drive: Option<Arc<dyn DriveClient>> = config
        .drive
        .access_token
        .as_ref()
        .map(|token| Arc::new(HttpDriveClient::new(token.clone())) as Arc<dyn DriveClient>);

    Ok(Arc::new(GatewayState {
        provider,
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        persona,
        store,
        drive,
        provider_configured: config.has_api_key(),
    }))
}

// --- Health ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    provider_configured: bool,
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<SharedState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            service: "homie",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
            provider_configured: state.provider_configured,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use homie_core::error::{DriveError, ProviderError};
    use homie_core::message::{Message, Role};
    use homie_core::provider::{ProviderRequest, ProviderResponse};
    use homie_drive::DriveFile;
    use homie_knowledge::Category;
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Test double for the completion provider. Records the last request
    /// and replies with a canned message or a canned error.
    struct StubProvider {
        reply: Result<String, ProviderError>,
        last_request: Mutex<Option<ProviderRequest>>,
    }

    impl StubProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.into()),
                last_request: Mutex::new(None),
            }
        }

        fn failing(err: ProviderError) -> Self {
            Self {
                reply: Err(err),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            *self.last_request.lock().unwrap() = Some(request);
            match &self.reply {
                Ok(text) => Ok(ProviderResponse {
                    message: Message::assistant(text.clone()),
                    usage: None,
                    model: "stub-model".into(),
                }),
                Err(e) => Err(e.clone()),
            }
        }
    }

    struct StubDrive;

    #[async_trait]
    impl DriveClient for StubDrive {
        async fn list_folder(&self, _folder_id: &str) -> Result<Vec<DriveFile>, DriveError> {
            let json = r#"[{"id":"1","name":"price sheet","mimeType":"text/plain"}]"#;
            Ok(serde_json::from_str(json).unwrap())
        }

        async fn fetch_text(&self, file: &DriveFile) -> Result<Option<String>, DriveError> {
            Ok(Some(format!("synced {}", file.name)))
        }
    }

    fn seeded_store() -> KnowledgeStore {
        KnowledgeStore::in_memory(
            FragmentSet::default()
                .with(Category::Policy, "POLICY-TEXT")
                .with(Category::Procedure, "PROCEDURE-TEXT")
                .with(Category::RepairCost, "REPAIR-COST-TEXT")
                .with(Category::Eligibility, "ELIGIBILITY-TEXT"),
        )
    }

    fn test_state(provider: Arc<StubProvider>) -> SharedState {
        Arc::new(GatewayState {
            provider: provider.clone(),
            model: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: 1000,
            persona: Persona::homie(),
            store: seeded_store(),
            drive: Some(Arc::new(StubDrive)),
            provider_configured: true,
        })
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider_configured"], true);
    }

    #[tokio::test]
    async fn chat_requires_a_message() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));
        let response = app.oneshot(post_json("/api/chat", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn malformed_json_gets_the_error_envelope() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));
        let response = app
            .oneshot(post_json("/api/chat", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn missing_content_type_gets_the_error_envelope() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/chat")
            .body(Body::from(r#"{"message":"hi"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn chat_relays_the_provider_reply() {
        let provider = Arc::new(StubProvider::replying("Here is your estimate."));
        let app = build_router(test_state(provider.clone()));

        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["response"], "Here is your estimate.");
    }

    #[tokio::test]
    async fn chat_sends_matched_knowledge_in_the_system_channel() {
        let provider = Arc::new(StubProvider::replying("ok"));
        let app = build_router(test_state(provider.clone()));

        let query = "What does a kitchen floor plan cost to estimate?";
        let request_body = serde_json::json!({ "message": query }).to_string();
        let response = app.oneshot(post_json("/api/chat", &request_body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = provider.last_request.lock().unwrap().take().unwrap();
        assert_eq!(sent.model, "gpt-4");
        assert_eq!(sent.max_tokens, Some(1000));
        assert_eq!(sent.messages.len(), 2);

        // System channel: persona + R2 then R3 fragments, in rule order.
        let system = &sent.messages[0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.contains("## RELEVANT DATA:"));
        assert!(!system.content.contains("POLICY-TEXT"));
        let procedure_at = system.content.find("PROCEDURE-TEXT").unwrap();
        let repair_at = system.content.find("REPAIR-COST-TEXT").unwrap();
        assert!(procedure_at < repair_at);

        // User channel: the raw query, untouched.
        let user = &sent.messages[1];
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, query);
    }

    #[tokio::test]
    async fn chat_without_matching_knowledge_omits_the_header() {
        let provider = Arc::new(StubProvider::replying("ok"));
        let app = build_router(test_state(provider.clone()));

        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"hello there"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = provider.last_request.lock().unwrap().take().unwrap();
        assert_eq!(sent.messages[0].content, Persona::homie().instructions);
    }

    #[tokio::test]
    async fn chat_surfaces_capacity_exhaustion_as_503() {
        let provider = Arc::new(StubProvider::failing(ProviderError::CapacityExhausted {
            retry_after_secs: 5,
        }));
        let app = build_router(test_state(provider));

        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("try again later"));
    }

    #[tokio::test]
    async fn chat_without_credentials_is_a_generic_500() {
        let mut state = test_state(Arc::new(StubProvider::replying("hi")));
        Arc::get_mut(&mut state).unwrap().provider_configured = false;
        let app = build_router(state);

        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("contact support"));
        assert!(!message.to_lowercase().contains("key"));
    }

    #[tokio::test]
    async fn knowledge_update_rejects_unknown_type() {
        let state = test_state(Arc::new(StubProvider::replying("hi")));
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/api/knowledge",
                r#"{"content":"new text","type":"bogus"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("bogus"));

        // No section was altered.
        let snap = state.store.snapshot().await;
        assert_eq!(snap.get(Category::Policy), "POLICY-TEXT");
        assert_eq!(snap.get(Category::RepairCost), "REPAIR-COST-TEXT");
    }

    #[tokio::test]
    async fn knowledge_update_replaces_a_section() {
        let state = test_state(Arc::new(StubProvider::replying("hi")));
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/api/knowledge",
                r#"{"content":"fresh cost data","type":"repairCosts"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["type"], "repairCosts");
        assert_eq!(body["section"], "repairCosts");
        assert_eq!(body["contentLength"], 15);

        let snap = state.store.snapshot().await;
        assert_eq!(snap.get(Category::RepairCost), "fresh cost data");
    }

    #[tokio::test]
    async fn knowledge_update_requires_content_and_type() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));
        let response = app
            .oneshot(post_json("/api/knowledge", r#"{"content":"x"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn file_upload_stores_plain_text() {
        let state = test_state(Arc::new(StubProvider::replying("hi")));
        let app = build_router(state.clone());

        // "eligibility rules v2" base64-encoded
        let body = serde_json::json!({
            "fileData": "ZWxpZ2liaWxpdHkgcnVsZXMgdjI=",
            "fileName": "rules.txt",
            "fileType": "text/plain",
            "contentType": "eligibility",
        })
        .to_string();

        let response = app.oneshot(post_json("/api/knowledge/file", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["fileName"], "rules.txt");

        let snap = state.store.snapshot().await;
        assert_eq!(snap.get(Category::Eligibility), "eligibility rules v2");
    }

    #[tokio::test]
    async fn file_upload_redirects_unsupported_types() {
        let state = test_state(Arc::new(StubProvider::replying("hi")));
        let app = build_router(state.clone());

        let body = serde_json::json!({
            "fileData": "JVBERi0=",
            "fileName": "slides.pdf",
            "fileType": "application/pdf",
            "contentType": "policies",
        })
        .to_string();

        let response = app.oneshot(post_json("/api/knowledge/file", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["suggestion"].as_str().unwrap().contains("text upload"));

        // Nothing stored.
        assert_eq!(state.store.snapshot().await.get(Category::Policy), "POLICY-TEXT");
    }

    #[tokio::test]
    async fn sync_requires_a_folder_id() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));
        let response = app.oneshot(post_json("/api/sync", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sync_without_drive_credentials_is_a_500() {
        let mut state = test_state(Arc::new(StubProvider::replying("hi")));
        Arc::get_mut(&mut state).unwrap().drive = None;
        let app = build_router(state);

        let response = app
            .oneshot(post_json("/api/sync", r#"{"folderId":"f1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn sync_pulls_files_into_the_store() {
        let state = test_state(Arc::new(StubProvider::replying("hi")));
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json("/api/sync", r#"{"folderId":"folder-1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["processedFiles"], 1);
        assert_eq!(body["totalFiles"], 1);
        assert_eq!(body["folderId"], "folder-1");

        let snap = state.store.snapshot().await;
        assert_eq!(snap.get(Category::RepairCost), "synced price sheet");
    }

    #[tokio::test]
    async fn preflight_gets_an_open_cors_answer() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/chat")
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn wrong_method_is_a_405() {
        let app = build_router(test_state(Arc::new(StubProvider::replying("hi"))));
        let response = app
            .oneshot(Request::builder().uri("/api/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
