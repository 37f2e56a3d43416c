//! clientdesk-api - HTTP API server for clientdesk.

mod auth;
mod error;
mod handlers;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use clientdesk_db::Database;

use auth::MockMicrosoftAuth;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful
/// for log correlation and debugging.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<MockMicrosoftAuth>,
}

/// Server configuration, loaded from the environment.
#[derive(Debug, Clone)]
struct Config {
    database_url: String,
    bind_addr: String,
    folder_base: String,
    cors_origins: Vec<String>,
    session_token: String,
    upstream_token: String,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        Ok(Self {
            database_url,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8001".to_string()),
            folder_base: std::env::var("SHAREPOINT_SITE_URL")
                .unwrap_or_else(|_| clientdesk_core::DEFAULT_FOLDER_BASE.to_string()),
            cors_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| {
                    "http://localhost:3000,http://127.0.0.1:3000".to_string()
                })
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            session_token: std::env::var("SESSION_TOKEN")
                .unwrap_or_else(|_| "mock-token".to_string()),
            upstream_token: std::env::var("MICROSOFT_UPSTREAM_TOKEN")
                .unwrap_or_else(|_| "mock-microsoft-token".to_string()),
        })
    }
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/auth/microsoft", post(handlers::auth::microsoft_auth))
        .route(
            "/api/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/clients/:id",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route("/api/clients/:id/notes", post(handlers::clients::add_note))
        .route(
            "/api/clients/:id/tracking",
            post(handlers::clients::add_tracking),
        )
        .route(
            "/api/clients/:id/sharepoint-url",
            get(handlers::clients::get_sharepoint_url),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "clientdesk_api=info,clientdesk_db=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url)
        .await?
        .with_folder_base(&config.folder_base);
    db.migrate().await?;

    let state = AppState {
        db,
        auth: Arc::new(MockMicrosoftAuth::new(
            config.session_token.clone(),
            config.upstream_token.clone(),
        )),
    };

    let request_id = MakeRequestUuidV7;
    let app = router(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(request_id))
        .layer(build_cors(&config.cors_origins));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        subsystem = "api",
        op = "startup",
        addr = %config.bind_addr,
        "clientdesk API listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_origin_parsing_skips_blanks() {
        let layer = build_cors(&[
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ]);
        // Construction must not panic with valid origins.
        let _ = layer;
    }

    #[test]
    fn test_request_id_is_v7() {
        let mut maker = MakeRequestUuidV7;
        let req = axum::http::Request::new(());
        let id = maker.make_request_id(&req).expect("id");
        let parsed: Uuid = id.header_value().to_str().unwrap().parse().unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
