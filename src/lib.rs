//! Bookshelf application library
//!
//! Wires the application modules into the kernel registry and drives their lifecycle around
//! the HTTP server.

pub mod modules;

use anyhow::Context;
use axum::Router;
use bookshelf_db::Pool;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// A configured application: settings, database pool and registered modules.
pub struct Application {
    settings: Settings,
    pool: Pool,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect to the database and register every module.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let pool = bookshelf_db::connect(&settings.database.url, settings.database.max_connections)
            .await
            .with_context(|| format!("failed to connect to {}", settings.database.url))?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &pool);

        Ok(Self {
            settings,
            pool,
            registry,
        })
    }

    /// Apply pending migrations, returning how many ran
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        self.registry.migrate(&self.pool).await
    }

    /// Migrate and initialize every module, then assemble the HTTP router.
    pub async fn prepare(&self) -> anyhow::Result<Router> {
        self.migrate().await?;
        self.registry.init_modules(&self.init_ctx()).await?;
        Ok(bookshelf_http::build_router(&self.registry, &self.settings))
    }

    /// Serve until Ctrl-C, then stop modules in reverse order.
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.prepare().await?;
        self.registry.start_modules(&self.init_ctx()).await?;

        tracing::info!("bookshelf bootstrap complete");
        let served = bookshelf_http::start_server(router, &self.settings).await;

        self.registry.stop_modules().await?;
        self.pool.close().await;
        served
    }

    fn init_ctx(&self) -> InitCtx<'_> {
        InitCtx {
            settings: &self.settings,
            db: &self.pool,
        }
    }
}
