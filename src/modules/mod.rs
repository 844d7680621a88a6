pub mod books;
pub mod hello;

use bookshelf_db::Pool;
use bookshelf_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, pool: &Pool) {
    registry.register(books::create_module(pool.clone()));
    registry.register(hello::create_module());
}
