use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::auth::{password::Hasher, SessionIssuer};
use crate::config::AppConfig;
use crate::database::models::{Bookmark, Note};
use crate::database::Repository;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{CredentialStore, DisabledTitleResolver, HttpTitleResolver, TitleResolver};

/// Everything the handlers share. Cloning is cheap; each store sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub sessions: Arc<SessionIssuer>,
    pub notes: Arc<Repository<Note>>,
    pub bookmarks: Arc<Repository<Bookmark>>,
}

impl AppState {
    pub fn new(
        credentials: CredentialStore,
        sessions: SessionIssuer,
        titles: Arc<dyn TitleResolver>,
    ) -> Self {
        Self {
            credentials: Arc::new(credentials),
            sessions: Arc::new(sessions),
            notes: Arc::new(Repository::new(titles.clone())),
            bookmarks: Arc::new(Repository::new(titles)),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let hasher = Hasher::from_config(&config.security)?;
        let credentials = CredentialStore::new(hasher)?;
        let sessions = SessionIssuer::new(&config.security.jwt_secret)?;

        let titles: Arc<dyn TitleResolver> = if config.titles.fetch_enabled {
            Arc::new(HttpTitleResolver::new(&config.titles)?)
        } else {
            tracing::info!("Bookmark title fetching disabled");
            Arc::new(DisabledTitleResolver)
        };

        Ok(Self::new(credentials, sessions, titles))
    }
}

impl FromRef<AppState> for Arc<CredentialStore> {
    fn from_ref(state: &AppState) -> Self {
        state.credentials.clone()
    }
}

impl FromRef<AppState> for Arc<SessionIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<Repository<Note>> {
    fn from_ref(state: &AppState) -> Self {
        state.notes.clone()
    }
}

impl FromRef<AppState> for Arc<Repository<Bookmark>> {
    fn from_ref(state: &AppState) -> Self {
        state.bookmarks.clone()
    }
}

/// Build the full router. `main` serves it; integration tests serve it on an
/// ephemeral port.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes())
        .merge(note_routes())
        .merge(bookmark_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes)
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(CorsLayer::permissive());

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/register", post(auth::register_post))
        .route("/api/login", post(auth::login_post))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::whoami_get))
}

fn note_routes() -> Router<AppState> {
    use protected::resource;

    Router::new()
        .route(
            "/api/notes",
            get(resource::list::<Note>).post(resource::create::<Note>),
        )
        .route(
            "/api/notes/:id",
            get(resource::get::<Note>)
                .put(resource::update::<Note>)
                .delete(resource::delete::<Note>),
        )
        .route(
            "/api/notes/:id/favorite",
            patch(resource::toggle_favorite::<Note>),
        )
}

fn bookmark_routes() -> Router<AppState> {
    use protected::resource;

    Router::new()
        .route(
            "/api/bookmarks",
            get(resource::list::<Bookmark>).post(resource::create::<Bookmark>),
        )
        .route(
            "/api/bookmarks/:id",
            get(resource::get::<Bookmark>)
                .put(resource::update::<Bookmark>)
                .delete(resource::delete::<Bookmark>),
        )
        .route(
            "/api/bookmarks/:id/favorite",
            patch(resource::toggle_favorite::<Bookmark>),
        )
}

async fn root() -> &'static str {
    concat!("Pinbox API v", env!("CARGO_PKG_VERSION"), " is running.")
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}
