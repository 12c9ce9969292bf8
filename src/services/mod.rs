pub mod admin_directory;
pub mod event_catalog;

pub use admin_directory::AdminDirectory;
pub use event_catalog::EventCatalog;

use sqlx::SqlitePool;

/// Shared by every handler; cloning only clones the pool handle.
#[derive(Clone)]
pub struct AppState {
    pub directory: AdminDirectory,
    pub catalog: EventCatalog,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            directory: AdminDirectory::new(pool.clone()),
            catalog: EventCatalog::new(pool),
        }
    }
}
