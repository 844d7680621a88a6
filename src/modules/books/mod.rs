pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::Pool;
use bookshelf_kernel::{InitCtx, Migration, Module};

use repository::SqliteBookRepository;
use service::BookService;

/// Book catalog module: CRUD over `/api/books`
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM book")
            .fetch_one(ctx.db)
            .await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = count,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_request_body(),
                        "responses": {
                            "201": book_response("Created book"),
                            "400": error_response("Invalid request")
                        }
                    }
                },
                "/ids": {
                    "get": {
                        "summary": "Map of book id to title",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Titles keyed by id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "additionalProperties": { "type": "string" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "integer", "format": "int64" }
                    }],
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": book_response("The book"),
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book's fields",
                        "tags": ["Books"],
                        "requestBody": book_request_body(),
                        "responses": {
                            "200": book_response("Updated book"),
                            "400": error_response("Invalid request"),
                            "404": error_response("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": book_response("The book as it was before deletion"),
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "yearPublished": { "type": "integer", "format": "int32" }
                        },
                        "required": ["id", "title", "author", "yearPublished"]
                    },
                    "BookRequest": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "author": { "type": "string", "minLength": 1 },
                            "yearPublished": {
                                "type": "integer",
                                "format": "int32",
                                "minimum": models::MIN_YEAR_PUBLISHED,
                                "maximum": models::MAX_YEAR_PUBLISHED
                            }
                        },
                        "required": ["title", "author", "yearPublished"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE book (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    title          TEXT    NOT NULL,
                    author         TEXT    NOT NULL,
                    year_published INTEGER NOT NULL
                );
                "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn book_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn book_request_body() -> serde_json::Value {
    serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookRequest" }
            }
        }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

/// Create the books module backed by the given pool
pub fn create_module(pool: Pool) -> Arc<dyn Module> {
    let repository = Arc::new(SqliteBookRepository::new(pool));
    Arc::new(BooksModule::new(BookService::new(repository)))
}

#[cfg(test)]
pub(crate) async fn test_pool() -> Pool {
    let pool = bookshelf_db::connect("sqlite::memory:", 1).await.unwrap();
    let module = create_module(pool.clone());
    let migrations: Vec<(String, Migration)> = module
        .migrations()
        .into_iter()
        .map(|migration| (module.name().to_string(), migration))
        .collect();
    bookshelf_db::migrate(&pool, &migrations).await.unwrap();
    pool
}
