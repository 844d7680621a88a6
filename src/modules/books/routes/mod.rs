//! HTTP handlers for `/api/books`.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use bookshelf_http::{ApiResult, Path, ValidJson};

use super::models::{Book, BookRequest};
use super::service::{BookError, BookService};

pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/ids", get(list_ids_and_titles))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

async fn list_books(State(service): State<BookService>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(service.find_all().await?))
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Book>> {
    let book = service
        .find_by_id(id)
        .await?
        .ok_or(BookError::NotFound(id))?;
    Ok(Json(book))
}

async fn create_book(
    State(service): State<BookService>,
    ValidJson(request): ValidJson<BookRequest>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = service.create(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<i64>,
    ValidJson(request): ValidJson<BookRequest>,
) -> ApiResult<Json<Book>> {
    Ok(Json(service.update(id, request).await?))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Book>> {
    Ok(Json(service.delete_by_id(id).await?))
}

async fn list_ids_and_titles(
    State(service): State<BookService>,
) -> ApiResult<Json<BTreeMap<i64, String>>> {
    Ok(Json(service.find_all_ids_and_titles().await?))
}
