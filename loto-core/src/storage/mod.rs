pub mod draw_store;
pub mod proposal_store;

pub use draw_store::DrawStore;
pub use proposal_store::{ProposalRecord, ProposalStore};

use crate::error::{LotoError, Result};
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LotoError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        // Draws table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS draws (
                lottery_id TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                drawn_on TEXT,
                numbers TEXT NOT NULL,
                special INTEGER,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (lottery_id, sequence)
            )",
            [],
        )?;

        // Proposals table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS proposals (
                lottery_id TEXT NOT NULL,
                batch_id TEXT NOT NULL,
                numbers TEXT NOT NULL,
                special INTEGER,
                is_star INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_proposals_lottery ON proposals (lottery_id)",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
