use async_trait::async_trait;
use bookshelf_db::Pool;

use super::models::Book;
use super::service::BookError;

pub type Result<T, E = BookError> = std::result::Result<T, E>;

/// Persistence of [`Book`] records by id
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert when `book.id` is unset, otherwise replace the stored record with that id
    async fn save(&self, book: Book) -> Result<Book>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Book>>;

    /// All books in insertion order
    async fn find_all(&self) -> Result<Vec<Book>>;

    /// Callers check existence first; deleting a missing id does nothing
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

pub struct SqliteBookRepository {
    pool: Pool,
}

impl SqliteBookRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn save(&self, book: Book) -> Result<Book> {
        let saved = match book.id {
            None => {
                sqlx::query_as::<_, Book>(
                    "INSERT INTO book (title, author, year_published) VALUES (?, ?, ?) \
                     RETURNING id, title, author, year_published",
                )
                .bind(&book.title)
                .bind(&book.author)
                .bind(book.year_published)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query_as::<_, Book>(
                    "INSERT INTO book (id, title, author, year_published) VALUES (?, ?, ?, ?) \
                     ON CONFLICT(id) DO UPDATE SET title = excluded.title, \
                     author = excluded.author, year_published = excluded.year_published \
                     RETURNING id, title, author, year_published",
                )
                .bind(id)
                .bind(&book.title)
                .bind(&book.author)
                .bind(book.year_published)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Book>> {
        let record = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, year_published FROM book WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        let records = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, year_published FROM book ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
