//! Axum-based gateway for the healthcare assistant. Config-driven via CoreConfig.

mod handlers;
mod sessions;

use axum::extract::State;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use handlers::chat::{chat, clear_history, get_history};
use medassist_core::{initialize_service, CoreConfig, KnowledgeBase, Orchestrator};
use medassist_models::ModelLoader;
use sessions::SessionStore;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) knowledge: Arc<KnowledgeBase>,
    pub(crate) orchestrator: Arc<Orchestrator>,
    /// Per-session chat transcripts, capped at `max_sessions`. In memory only; lost on restart.
    pub(crate) sessions: Arc<SessionStore>,
    /// Serializes question resolution so only one question is in flight.
    pub(crate) turn_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// Builds the knowledge base and inference service. Fails if either cannot be produced.
    fn bootstrap(config: CoreConfig) -> Result<Self, BoxError> {
        let knowledge = Arc::new(KnowledgeBase::load(config.knowledge_path.as_deref())?);
        let service = initialize_service(&ModelLoader::from_config(&config))?;
        let orchestrator = Orchestrator::new(knowledge.clone(), service);
        Ok(Self::new(config, knowledge, orchestrator))
    }

    fn new(config: CoreConfig, knowledge: Arc<KnowledgeBase>, orchestrator: Orchestrator) -> Self {
        let sessions = Arc::new(SessionStore::new(config.max_sessions));
        Self {
            config: Arc::new(config),
            knowledge,
            orchestrator: Arc::new(orchestrator),
            sessions,
            turn_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

/// Pre-flight check: config, topic table, inference service, and port.
fn run_verify() -> Result<(), String> {
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking knowledge base... ");
    let kb = KnowledgeBase::load(config.knowledge_path.as_deref())
        .map_err(|e| format!("Knowledge base invalid: {}", e))?;
    println!("OK ({} topics)", kb.len());

    print!("Checking inference service ({})... ", config.llm_mode);
    let service = initialize_service(&ModelLoader::from_config(&config))
        .map_err(|e| format!("Inference service unavailable: {}", e))?;
    println!("OK ({})", service.name());

    let port = config.port;
    print!("Checking port {}... ", port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("Port {} BLOCKED: {}", port, e));
        }
    }

    println!("\nSUCCESS: Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[medassist-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Gateway startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let config = CoreConfig::load()?;
    let state = AppState::bootstrap(config)?;

    let port = state.config.port;
    let app_name = state.config.app_name.clone();
    let app = build_app(state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("{} listening on {}", app_name, addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(state: AppState) -> Router {
    // CORS: allow Backend/API (8001-8099) and Frontend/UI (3001-3099) port ranges.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &axum::http::HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            let port = s
                .rsplit(':')
                .next()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(0);
            (3001..=3099).contains(&port) || (8001..=8099).contains(&port)
        }))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/v1/status", get(status))
        .route("/api/v1/health", get(health))
        .route("/api/v1/chat", post(chat))
        .route(
            "/api/v1/history/:session_id",
            get(get_history).delete(clear_history),
        )
        .with_state(state)
        .layer(cors)
}

/// GET /api/v1/health – liveness check for UI and scripts.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/status – app identity, backend, topic table, and live session count.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "app_name": state.config.app_name,
        "port": state.config.port,
        "llm_mode": state.config.llm_mode,
        "model": state.config.model,
        "backend": state.orchestrator.responder().service_name(),
        "topics": state.knowledge.keywords().collect::<Vec<_>>(),
        "sessions": state.sessions.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use medassist_core::{InferenceError, InferenceRequest, InferenceService, APOLOGY_MESSAGE};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct CountingService {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl InferenceService for CountingService {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, _request: &InferenceRequest) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(InferenceError::Unavailable("model offline".to_string()))
            } else {
                Ok("Answer: Stay hydrated and rest.".to_string())
            }
        }
    }

    /// Replies after a delay with text naming the question it was asked.
    struct SlowEchoService {
        delay: std::time::Duration,
    }

    #[async_trait::async_trait]
    impl InferenceService for SlowEchoService {
        fn name(&self) -> &str {
            "slow-echo"
        }

        async fn generate(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
            tokio::time::sleep(self.delay).await;
            let question = request
                .prompt
                .lines()
                .find_map(|l| l.strip_prefix("Question: "))
                .unwrap_or_default();
            Ok(format!("Answer: about {}", question))
        }
    }

    fn slow_state(delay_ms: u64, max_sessions: usize) -> AppState {
        let service = Arc::new(SlowEchoService {
            delay: std::time::Duration::from_millis(delay_ms),
        });
        let knowledge = Arc::new(KnowledgeBase::builtin());
        let orchestrator = Orchestrator::new(knowledge.clone(), service);
        let config = CoreConfig {
            max_sessions,
            ..CoreConfig::default()
        };
        AppState::new(config, knowledge, orchestrator)
    }

    fn test_state(fail: bool) -> (AppState, Arc<CountingService>) {
        let service = Arc::new(CountingService {
            fail,
            calls: AtomicUsize::new(0),
        });
        let knowledge = Arc::new(KnowledgeBase::builtin());
        let orchestrator = Orchestrator::new(knowledge.clone(), service.clone());
        let config = CoreConfig {
            app_name: "Test Assistant".to_string(),
            port: 4000,
            ..CoreConfig::default()
        };
        (AppState::new(config, knowledge, orchestrator), service)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_status_returns_identity_and_topics() {
        let (state, _) = test_state(false);
        let (status, json) = send(build_app(state), get_request("/v1/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["app_name"], "Test Assistant");
        assert_eq!(json["port"], 4000);
        assert_eq!(json["llm_mode"], "mock");
        assert_eq!(json["backend"], "counting");
        assert_eq!(json["topics"], serde_json::json!(["flu", "fever"]));
        assert_eq!(json["sessions"], 0);
    }

    #[tokio::test]
    async fn test_chat_knowledge_hit_skips_inference() {
        let (state, service) = test_state(false);
        let (status, json) = send(
            build_app(state),
            chat_request(serde_json::json!({ "question": "I have a Fever today" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "knowledge");
        assert!(json["response"]
            .as_str()
            .unwrap()
            .starts_with("Common fever symptoms include:"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_generation_and_fallback() {
        let (state, service) = test_state(false);
        let (_, json) = send(
            build_app(state),
            chat_request(serde_json::json!({ "question": "what is tinnitus?" })),
        )
        .await;
        assert_eq!(json["source"], "generated");
        assert_eq!(json["response"], "Stay hydrated and rest.");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        let (state, _) = test_state(true);
        let (status, json) = send(
            build_app(state),
            chat_request(serde_json::json!({ "question": "what is tinnitus?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["response"], APOLOGY_MESSAGE);
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_question() {
        let (state, service) = test_state(false);
        let (status, json) = send(
            build_app(state),
            chat_request(serde_json::json!({ "question": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_history_records_turns_and_clears() {
        let (state, _) = test_state(false);
        let app = build_app(state);

        let (_, json) = send(
            app.clone(),
            chat_request(serde_json::json!({ "question": "Flu?", "session_id": "s1" })),
        )
        .await;
        assert_eq!(json["session_id"], "s1");

        let (_, json) = send(app.clone(), get_request("/api/v1/history/s1")).await;
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Flu?");
        assert_eq!(messages[1]["role"], "assistant");

        let delete = Request::builder()
            .method("DELETE")
            .uri("/api/v1/history/s1")
            .body(Body::empty())
            .unwrap();
        let (_, json) = send(app.clone(), delete).await;
        assert_eq!(json["cleared"], 2);

        let (_, json) = send(app, get_request("/api/v1/history/s1")).await;
        assert_eq!(json["messages"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_chat_assigns_session_id_when_missing() {
        let (state, _) = test_state(false);
        let (_, json) = send(
            build_app(state),
            chat_request(serde_json::json!({ "question": "flu" })),
        )
        .await;
        let session_id = json["session_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(session_id).is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_turns_on_one_session_stay_paired() {
        let app = build_app(slow_state(100, 10));

        let (first, second) = tokio::join!(
            send(
                app.clone(),
                chat_request(serde_json::json!({ "question": "what is tinnitus?", "session_id": "s1" })),
            ),
            send(
                app.clone(),
                chat_request(serde_json::json!({ "question": "what is vertigo?", "session_id": "s1" })),
            ),
        );
        assert_eq!(first.1["response"], "about what is tinnitus?");
        assert_eq!(second.1["response"], "about what is vertigo?");

        let (_, json) = send(app, get_request("/api/v1/history/s1")).await;
        let messages = json["messages"].as_array().unwrap();
        let roles: Vec<_> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, ["user", "assistant", "user", "assistant"]);
        for pair in messages.chunks(2) {
            let question = pair[0]["content"].as_str().unwrap().to_lowercase();
            assert_eq!(pair[1]["content"], format!("about {}", question));
        }
    }

    #[tokio::test]
    async fn test_dropped_chat_request_records_nothing() {
        let app = build_app(slow_state(200, 10));

        let pending = send(
            app.clone(),
            chat_request(serde_json::json!({ "question": "what is tinnitus?", "session_id": "s1" })),
        );
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(outcome.is_err());

        let (_, json) = send(app, get_request("/api/v1/history/s1")).await;
        assert_eq!(json["messages"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_session_cap_drops_least_recently_active() {
        let app = build_app(slow_state(0, 2));

        for session_id in ["a", "b", "c"] {
            let (status, _) = send(
                app.clone(),
                chat_request(serde_json::json!({ "question": "flu", "session_id": session_id })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, json) = send(app.clone(), get_request("/api/v1/history/a")).await;
        assert_eq!(json["messages"], serde_json::json!([]));
        for session_id in ["b", "c"] {
            let (_, json) = send(app.clone(), get_request(&format!("/api/v1/history/{}", session_id))).await;
            assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        }
    }
}
