use crate::error::Result;
use crate::storage::Storage;
use crate::types::Combination;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A combination handed out by a generation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRecord {
    pub batch_id: String,
    pub combination: Combination,
    pub is_star: bool,
    pub created_at: DateTime<Utc>,
}

pub struct ProposalStore<'a> {
    storage: &'a Storage,
}

impl<'a> ProposalStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a batch of proposals. `stars` holds the positions of star
    /// combinations within `combinations`.
    pub async fn record(
        &self,
        lottery_id: &str,
        batch_id: &str,
        combinations: &[Combination],
        stars: &HashSet<usize>,
    ) -> Result<()> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;
        let now = Utc::now().timestamp();

        for (i, combination) in combinations.iter().enumerate() {
            tx.execute(
                "INSERT INTO proposals (lottery_id, batch_id, numbers, special, is_star, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    lottery_id,
                    batch_id,
                    serde_json::to_string(combination.numbers())?,
                    combination.special(),
                    stars.contains(&i),
                    now,
                ],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            "Recorded {} proposals for '{}' in batch {}",
            combinations.len(),
            lottery_id,
            batch_id
        );
        Ok(())
    }

    pub async fn load(&self, lottery_id: &str) -> Result<Vec<ProposalRecord>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT batch_id, numbers, special, is_star, created_at
             FROM proposals WHERE lottery_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(params![lottery_id], |row| {
            let batch_id: String = row.get(0)?;
            let numbers: String = row.get(1)?;
            let special: Option<u8> = row.get(2)?;
            let is_star: bool = row.get(3)?;
            let created_at: i64 = row.get(4)?;
            Ok((batch_id, numbers, special, is_star, created_at))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (batch_id, numbers, special, is_star, created_at) = row?;
            let numbers: Vec<u8> = serde_json::from_str(&numbers)?;

            records.push(ProposalRecord {
                batch_id,
                combination: Combination::new(numbers, special),
                is_star,
                created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_default(),
            });
        }

        Ok(records)
    }

    /// Every combination ever proposed for a lottery.
    pub async fn load_set(&self, lottery_id: &str) -> Result<HashSet<Combination>> {
        Ok(self
            .load(lottery_id)
            .await?
            .into_iter()
            .map(|record| record.combination)
            .collect())
    }
}
