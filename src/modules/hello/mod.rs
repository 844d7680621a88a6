use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_kernel::Module;

pub const GREETING: &str = "Hello, World!";

/// Diagnostic greeting served at `/api/v1/hello`
pub struct HelloModule;

#[async_trait]
impl Module for HelloModule {
    fn name(&self) -> &'static str {
        "hello"
    }

    fn mount_path(&self) -> &'static str {
        "v1"
    }

    fn routes(&self) -> Router {
        Router::new().route("/hello", get(hello))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/hello": {
                    "get": {
                        "summary": "Returns a test greeting",
                        "tags": ["Diagnostics"],
                        "responses": {
                            "200": {
                                "description": "The greeting",
                                "content": {
                                    "text/plain": { "schema": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            }
        }))
    }
}

async fn hello() -> &'static str {
    GREETING
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(HelloModule)
}
