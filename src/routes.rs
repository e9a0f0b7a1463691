use axum::{
    Router,
    http::Method,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handler::{self, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(handler::ping))
        .route("/db-info", get(handler::db_info))
        .route("/books", post(handler::add_book))
        .route("/user-books", post(handler::add_user_book))
        .route("/user-books", get(handler::list_user_books))
        .route("/user-books/:id/rating", put(handler::update_rating))
        .route("/user-books/:id", delete(handler::remove_user_book))
}

/// The full service: routes, request tracing, panic recovery and CORS.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    routes().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::new())
            .layer(cors),
    )
}
