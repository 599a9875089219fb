mod handlers;

use crate::config::Config;
use crate::follow::FollowService;
use crate::gateway::VisibilityGateway;
use crate::media::{MediaPipeline, MediaSender, SignedUrlIssuer};
use crate::store::Store;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state: the store plus the services layered on it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub follows: Arc<FollowService>,
    pub gateway: Arc<VisibilityGateway>,
    pub media: Arc<MediaPipeline>,
}

impl AppState {
    pub fn new(store: Arc<Store>, media_events: MediaSender) -> Self {
        let issuer = Arc::new(SignedUrlIssuer::from_config());
        Self {
            follows: Arc::new(FollowService::new(store.clone())),
            gateway: Arc::new(VisibilityGateway::new(store.clone())),
            media: Arc::new(MediaPipeline::new(store.clone(), issuer, media_events)),
            store,
        }
    }
}

/// Start the API server
pub async fn start_api_server(state: AppState) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Create router with all routes
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        // User routes
        .route("/api/users", post(handlers::users::register_user))
        .route("/api/users/self", get(handlers::users::get_self))
        .route(
            "/api/users/self/privacy-status",
            post(handlers::users::set_privacy_status),
        )
        .route(
            "/api/users/self/follow-counts-hidden",
            post(handlers::users::set_follow_counts_hidden),
        )
        .route(
            "/api/users/self/followers/:id/accept",
            post(handlers::follows::accept_follower),
        )
        .route(
            "/api/users/self/followers/:id/deny",
            post(handlers::follows::deny_follower),
        )
        .route("/api/users/:id", get(handlers::users::get_user))
        .route("/api/users/:id/follow", post(handlers::follows::follow_user))
        .route(
            "/api/users/:id/unfollow",
            post(handlers::follows::unfollow_user),
        )
        .route(
            "/api/users/:id/followers",
            get(handlers::follows::follower_users),
        )
        .route(
            "/api/users/:id/followed",
            get(handlers::follows::followed_users),
        )
        // Post and media routes
        .route(
            "/api/posts",
            post(handlers::posts::add_post).get(handlers::posts::get_posts),
        )
        .route("/api/posts/:id", get(handlers::posts::get_post))
        .route(
            "/api/posts/:id/viewed-by",
            get(handlers::posts::get_post_viewed_by),
        )
        .route("/api/media", get(handlers::posts::get_media_objects))
        .route(
            "/api/media/:id/upload-complete",
            post(handlers::posts::upload_complete),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.server.host, config.server.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
