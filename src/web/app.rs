use super::handlers::{
    create_film, delete_film, health, list_films, login, read_film, register, update_film,
};
use super::middleware::require_bearer;
use crate::auth::{AccountStore, TokenIssuer};
use crate::storage::FilmStore;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Router, middleware};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub films: Arc<FilmStore>,
    pub accounts: Arc<AccountStore>,
    pub tokens: Arc<TokenIssuer>,
    /// Gate the film routes behind a bearer token.
    pub require_auth: bool,
}

impl AppState {
    pub fn new(films: Arc<FilmStore>, accounts: Arc<AccountStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            films,
            accounts,
            tokens,
            require_auth: true,
        }
    }

    pub fn require_auth(mut self, require: bool) -> Self {
        self.require_auth = require;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let films = Router::new()
        .route("/api/films/readall", get(list_films))
        .route("/api/films/read/:id", get(read_film))
        .route("/api/films/create", post(create_film))
        .route("/api/films/update/:id", post(update_film))
        .route("/api/films/delete/:id", post(delete_film));

    let films = if state.require_auth {
        films.route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
    } else {
        films
    };

    Router::new()
        .merge(films)
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
