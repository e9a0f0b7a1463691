use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::api::{
    BookCreated, MessageResponse, NewBook, NewUserBook, PingResponse, RatingUpdate, RatingUpdated,
    UserBookCreated, UserBooksQuery, UserBooksResponse,
};
use crate::db::Database;
use crate::error::HandlerError;
use crate::library::Library;
use crate::validate::{self, NEW_BOOK, NEW_USER_BOOK, RATING_UPDATE};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

type HandlerResult = Result<Response, HandlerError>;

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

fn user_book_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, HandlerError> {
    path.map(|Path(id)| id)
        .map_err(|_| HandlerError::Validation("Invalid user book id".to_string()))
}

pub async fn ping(State(state): State<AppState>) -> Response {
    match state.db.ping().await {
        Ok(()) => success(PingResponse {
            message: "pong",
            db_status: "connected",
            error: None,
        }),
        Err(e) => {
            tracing::error!(error = %crate::unpack_error(&e), "database ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PingResponse {
                    message: "pong",
                    db_status: "disconnected",
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

pub async fn db_info(State(state): State<AppState>) -> Response {
    success(Library::new(&state.db).info().await)
}

pub async fn add_book(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> HandlerResult {
    let book: NewBook = validate::bind(payload, NEW_BOOK)?;

    let id = Library::new(&state.db)
        .add_book(&book)
        .await
        .map_err(HandlerError::persistence("Failed to add book"))?;

    tracing::info!(book_id = id, "book added");
    Ok(created(BookCreated {
        message: "Book added successfully",
        book: book.into_book(id),
    }))
}

pub async fn add_user_book(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> HandlerResult {
    let entry: NewUserBook = validate::bind(payload, NEW_USER_BOOK)?;

    let id = Library::new(&state.db)
        .add_user_book(&entry)
        .await
        .map_err(HandlerError::persistence("Failed to add book to user collection"))?;

    tracing::info!(user_book_id = id, user_id = entry.user_id, book_id = entry.book_id, "book added to collection");
    Ok(created(UserBookCreated {
        message: "Book added to collection successfully",
        user_book: entry.into_user_book(id),
    }))
}

pub async fn update_rating(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> HandlerResult {
    let id = user_book_id(path)?;
    let update: RatingUpdate = validate::bind(payload, RATING_UPDATE)?;

    let affected = Library::new(&state.db)
        .update_rating(id, &update)
        .await
        .map_err(HandlerError::persistence("Failed to update rating"))?;

    if affected == 0 {
        return Err(HandlerError::NotFound("User book not found"));
    }

    Ok(success(RatingUpdated {
        message: "Rating updated successfully",
        rating: update.rating,
        review: update.review,
    }))
}

pub async fn remove_user_book(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult {
    let id = user_book_id(path)?;

    let affected = Library::new(&state.db)
        .remove_user_book(id)
        .await
        .map_err(HandlerError::persistence("Failed to remove book"))?;

    if affected == 0 {
        return Err(HandlerError::NotFound("User book not found"));
    }

    Ok(success(MessageResponse {
        message: "Book removed from collection successfully",
    }))
}

pub async fn list_user_books(
    State(state): State<AppState>,
    query: Result<Query<UserBooksQuery>, QueryRejection>,
) -> HandlerResult {
    let Query(params) = query.map_err(|rejection| HandlerError::Validation(rejection.body_text()))?;
    let raw = params.user_id.unwrap_or_default();
    if raw.is_empty() {
        return Err(HandlerError::Validation(
            "user_id query parameter is required".to_string(),
        ));
    }
    let user_id: i64 = raw
        .parse()
        .map_err(|_| HandlerError::Validation("Invalid user_id".to_string()))?;

    let books = Library::new(&state.db)
        .list_user_books(user_id)
        .await
        .map_err(HandlerError::persistence("Failed to retrieve books"))?;

    Ok(success(UserBooksResponse {
        user_id,
        count: books.len(),
        books,
    }))
}
