use std::collections::BTreeMap;
use std::sync::Arc;

use bookshelf_http::AppError;

use super::models::{Book, BookRequest};
use super::repository::{BookRepository, Result};

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("Book {0} not found")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::Storage(_) => AppError::Internal(err.into()),
        }
    }
}

/// Book operations on top of a [`BookRepository`].
///
/// Requests are expected to be validated already.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, request: BookRequest) -> Result<Book> {
        let book = self.repository.save(Book::from_request(request)).await?;
        tracing::debug!(id = ?book.id, "book created");
        Ok(book)
    }

    /// Full replace of an existing book's fields
    pub async fn update(&self, id: i64, request: BookRequest) -> Result<Book> {
        let mut book = self.require(id).await?;
        book.apply(request);
        let book = self.repository.save(book).await?;
        tracing::debug!(id, "book updated");
        Ok(book)
    }

    pub async fn find_all(&self) -> Result<Vec<Book>> {
        self.repository.find_all().await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Book>> {
        self.repository.find_by_id(id).await
    }

    /// Delete and hand back the record as it was before deletion
    pub async fn delete_by_id(&self, id: i64) -> Result<Book> {
        let book = self.require(id).await?;
        self.repository.delete_by_id(id).await?;
        tracing::debug!(id, "book deleted");
        Ok(book)
    }

    pub async fn find_all_ids_and_titles(&self) -> Result<BTreeMap<i64, String>> {
        let books = self.repository.find_all().await?;
        Ok(books
            .into_iter()
            .filter_map(|book| book.id.map(|id| (id, book.title)))
            .collect())
    }

    async fn require(&self, id: i64) -> Result<Book> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id))
    }
}
