use crate::error::Result;
use crate::storage::Storage;
use crate::types::{Combination, Draw};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};

pub struct DrawStore<'a> {
    storage: &'a Storage,
}

impl<'a> DrawStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Persist one draw. Fails on a sequence already stored for the lottery.
    pub async fn append(&self, lottery_id: &str, draw: &Draw) -> Result<()> {
        let conn = self.storage.get_connection().await;
        insert_draw(&conn, lottery_id, draw)?;

        tracing::info!(
            "Stored draw #{} for '{}': {}",
            draw.sequence,
            lottery_id,
            draw.combination
        );
        Ok(())
    }

    /// Persist a run of draws atomically: either every row lands or none does.
    pub async fn append_all(&self, lottery_id: &str, draws: &[Draw]) -> Result<()> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        for draw in draws {
            insert_draw(&tx, lottery_id, draw)?;
        }
        tx.commit()?;

        tracing::info!("Appended {} draws to '{}'", draws.len(), lottery_id);
        Ok(())
    }

    /// Load every draw of a lottery, oldest first.
    pub async fn load(&self, lottery_id: &str) -> Result<Vec<Draw>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT sequence, drawn_on, numbers, special
             FROM draws WHERE lottery_id = ?1 ORDER BY sequence ASC",
        )?;

        let rows = stmt.query_map(params![lottery_id], |row| {
            let sequence: i64 = row.get(0)?;
            let drawn_on: Option<String> = row.get(1)?;
            let numbers: String = row.get(2)?;
            let special: Option<u8> = row.get(3)?;
            Ok((sequence, drawn_on, numbers, special))
        })?;

        let mut draws = Vec::new();
        for row in rows {
            let (sequence, drawn_on, numbers, special) = row?;
            let numbers: Vec<u8> = serde_json::from_str(&numbers)?;
            let drawn_on = drawn_on.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

            draws.push(Draw {
                sequence: sequence as u64,
                drawn_on,
                combination: Combination::new(numbers, special),
            });
        }

        Ok(draws)
    }

    /// Replace the whole history of a lottery in one transaction.
    pub async fn replace_all(&self, lottery_id: &str, draws: &[Draw]) -> Result<()> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM draws WHERE lottery_id = ?1", params![lottery_id])?;
        for draw in draws {
            insert_draw(&tx, lottery_id, draw)?;
        }
        tx.commit()?;

        tracing::info!("Replaced history of '{}' with {} draws", lottery_id, draws.len());
        Ok(())
    }
}

fn insert_draw(conn: &Connection, lottery_id: &str, draw: &Draw) -> Result<()> {
    let numbers = serde_json::to_string(draw.combination.numbers())?;

    conn.execute(
        "INSERT INTO draws (lottery_id, sequence, drawn_on, numbers, special, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            lottery_id,
            draw.sequence as i64,
            draw.drawn_on.map(|d| d.format("%Y-%m-%d").to_string()),
            numbers,
            draw.combination.special(),
            Utc::now().timestamp(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LotoError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_append_and_load() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("loto.db")).await.unwrap();
        let store = DrawStore::new(&storage);

        let first = Draw::new(1, Combination::from_numbers([1, 2, 3, 4, 5, 6]))
            .on(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        let second = Draw::new(2, Combination::new(vec![7, 8, 9, 10, 11], Some(3)));

        store.append("649", &second).await.unwrap();
        store.append("649", &first).await.unwrap();
        store.append("other", &first).await.unwrap();

        let draws = store.load("649").await.unwrap();
        assert_eq!(draws, vec![first.clone(), second]);
        assert_eq!(store.load("other").await.unwrap().len(), 1);

        let err = store.append("649", &first).await.unwrap_err();
        assert!(matches!(err, LotoError::Storage(_)));
    }

    #[tokio::test]
    async fn test_replace_all() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("loto.db")).await.unwrap();
        let store = DrawStore::new(&storage);

        store
            .append("649", &Draw::new(1, Combination::from_numbers([1, 2, 3, 4, 5, 6])))
            .await
            .unwrap();

        let replacement = vec![
            Draw::new(1, Combination::from_numbers([10, 11, 12, 13, 14, 15])),
            Draw::new(2, Combination::from_numbers([20, 21, 22, 23, 24, 25])),
        ];
        store.replace_all("649", &replacement).await.unwrap();

        assert_eq!(store.load("649").await.unwrap(), replacement);
        assert!(store.load("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_all_is_atomic() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("loto.db")).await.unwrap();
        let store = DrawStore::new(&storage);

        store
            .append("649", &Draw::new(2, Combination::from_numbers([1, 2, 3, 4, 5, 6])))
            .await
            .unwrap();

        let batch = vec![
            Draw::new(1, Combination::from_numbers([10, 11, 12, 13, 14, 15])),
            Draw::new(2, Combination::from_numbers([20, 21, 22, 23, 24, 25])),
        ];
        let err = store.append_all("649", &batch).await.unwrap_err();
        assert!(matches!(err, LotoError::Storage(_)));

        let stored: Vec<u64> = store.load("649").await.unwrap().iter().map(|d| d.sequence).collect();
        assert_eq!(stored, vec![2]);

        store.append_all("649", &batch[..1]).await.unwrap();
        assert_eq!(store.load("649").await.unwrap().len(), 2);
    }
}
