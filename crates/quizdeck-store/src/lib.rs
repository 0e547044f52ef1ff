//! quizdeck-store: Storage backends.
//!
//! Implements the `quizdeck-core` store traits over SQLite (via `sqlx`) and
//! over a process-local in-memory map.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use anyhow::Result;

use quizdeck_core::traits::Store;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Open a store from a database URL.
///
/// `memory:` selects the in-memory store; anything else is handed to SQLite
/// (`sqlite://quiz_app.db`, `sqlite::memory:`, ...).
pub async fn open_store(database_url: &str) -> Result<Arc<dyn Store>> {
    let url = database_url.trim();
    if url == "memory:" {
        tracing::debug!("using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    if !url.starts_with("sqlite:") {
        anyhow::bail!("unsupported database URL: {url} (expected sqlite:... or memory:)");
    }
    let store = SqliteStore::connect(url).await?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_memory_and_sqlite() {
        let memory = open_store("memory:").await.unwrap();
        assert!(memory.list_quizzes(true).await.unwrap().is_empty());

        let sqlite = open_store("sqlite::memory:").await.unwrap();
        assert!(sqlite.list_quizzes(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_scheme() {
        let err = open_store("postgres://localhost/quiz").await.err().unwrap();
        assert!(err.to_string().contains("unsupported database URL"));
    }
}
