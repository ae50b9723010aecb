//! Store selection and shared application state.

use std::sync::Arc;

use crate::store::{MemoryOrderStore, OrderStore};

/// Shared per-process services handed to every handler. Each request works
/// against the store independently; there is no other shared mutable state.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn OrderStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryOrderStore::new()))
    }

    pub fn store(&self) -> &dyn OrderStore {
        self.store.as_ref()
    }
}

/// Select the store implementation from the environment.
///
/// With the `postgres` feature and `DATABASE_URL` set, orders persist in
/// Postgres; otherwise everything lives in memory for the process lifetime.
pub async fn build_services() -> AppServices {
    #[cfg(feature = "postgres")]
    if let Ok(url) = std::env::var("DATABASE_URL") {
        match crate::store::PgOrderStore::connect(&url).await {
            Ok(store) => {
                tracing::info!("using postgres order store");
                return AppServices::new(Arc::new(store));
            }
            Err(e) => {
                tracing::error!("failed to connect to postgres, falling back to memory: {e}");
            }
        }
    }

    tracing::info!("using in-memory order store");
    AppServices::in_memory()
}
