use crate::config::EngineConfig;
use crate::error::{LotoError, Result};
use crate::generator::{self, GeneratedBlock, GenerationOptions};
use crate::history::{parse_history, History};
use crate::rules::{LotteryRule, RuleCatalog};
use crate::storage::{DrawStore, ProposalRecord, ProposalStore, Storage};
use crate::types::{Combination, Draw};
use crate::verifier::{self, BlockEntry, CoverageSummary, VerificationReport};
use chrono::NaiveDate;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Switches for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    pub avoid_history: bool,
    pub apply_criteria: bool,
    /// Skip combinations proposed by earlier batches.
    pub avoid_proposals: bool,
    /// Add the batch to the proposal ledger.
    pub record: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            avoid_history: true,
            apply_criteria: false,
            avoid_proposals: true,
            record: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBatch {
    pub batch_id: String,
    pub lottery_id: String,
    pub combinations: Vec<Combination>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBatch {
    pub batch_id: String,
    pub lottery_id: String,
    pub blocks: Vec<GeneratedBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportMode {
    /// Drop the stored history and number the imported draws from 1.
    Replace,
    /// Add draws not already known after the last stored one.
    Append,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub lottery_id: String,
    pub imported: usize,
    pub duplicates: usize,
    /// Combinations already in the stored history (append only).
    pub already_known: usize,
    pub skipped_lines: Vec<usize>,
    pub total_draws: usize,
}

/// Entry point shared by the HTTP service and the CLI.
///
/// Histories are cached as immutable snapshots. Readers clone the `Arc`
/// under a short read lock; writers serialize on `write_lock`, persist the
/// change and swap in a new snapshot.
pub struct LotoEngine {
    config: EngineConfig,
    catalog: Arc<RuleCatalog>,
    storage: Arc<Storage>,
    histories: Arc<RwLock<HashMap<String, Arc<History>>>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl LotoEngine {
    pub async fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let catalog = config.load_catalog()?;
        Self::with_catalog(config, catalog).await
    }

    pub async fn with_catalog(config: EngineConfig, catalog: RuleCatalog) -> Result<Self> {
        let storage = Arc::new(Storage::new(&config.db_path()).await?);

        tracing::info!(
            "Engine ready with {} lotteries, data in {}",
            catalog.len(),
            config.data_dir.display()
        );

        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            storage,
            histories: Arc::new(RwLock::new(HashMap::new())),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn rule(&self, lottery_id: &str) -> Result<&LotteryRule> {
        self.catalog.get_rule(lottery_id)
    }

    pub fn rules(&self) -> Vec<&LotteryRule> {
        self.catalog.rules().collect()
    }

    /// Current history snapshot, loaded from storage on first use.
    pub async fn history(&self, lottery_id: &str) -> Result<Arc<History>> {
        self.rule(lottery_id)?;

        if let Some(history) = self.histories.read().get(lottery_id).cloned() {
            return Ok(history);
        }

        let draws = DrawStore::new(&self.storage).load(lottery_id).await?;
        let loaded = Arc::new(History::from_draws(draws)?);
        tracing::debug!("Loaded {} draws for '{}'", loaded.len(), lottery_id);

        let mut histories = self.histories.write();
        let history = histories
            .entry(lottery_id.to_string())
            .or_insert(loaded)
            .clone();
        Ok(history)
    }

    /// Append one draw. The sequence defaults to the next free one.
    pub async fn record_draw(
        &self,
        lottery_id: &str,
        combination: Combination,
        sequence: Option<u64>,
        drawn_on: Option<NaiveDate>,
    ) -> Result<Draw> {
        let rule = self.rule(lottery_id)?;
        rule.validate(&combination)?;

        let _writer = self.write_lock.lock().await;
        let current = self.history(lottery_id).await?;

        let mut draw = Draw::new(sequence.unwrap_or_else(|| current.next_sequence()), combination);
        draw.drawn_on = drawn_on;

        let mut next = History::clone(&current);
        next.append(draw.clone())?;
        if let Err(err) = DrawStore::new(&self.storage).append(lottery_id, &draw).await {
            self.histories.write().remove(lottery_id);
            return Err(err);
        }

        self.histories
            .write()
            .insert(lottery_id.to_string(), Arc::new(next));
        Ok(draw)
    }

    /// Import a plain-text history, one draw per line.
    pub async fn import_history(
        &self,
        lottery_id: &str,
        text: &str,
        mode: ImportMode,
    ) -> Result<ImportSummary> {
        let rule = self.rule(lottery_id)?;
        let parsed = parse_history(text, rule);

        let _writer = self.write_lock.lock().await;
        let store = DrawStore::new(&self.storage);

        let (history, imported, already_known) = match mode {
            ImportMode::Replace => {
                let draws: Vec<Draw> = parsed
                    .draws
                    .iter()
                    .zip(1u64..)
                    .map(|(entry, sequence)| to_draw(sequence, entry.drawn_on, &entry.combination))
                    .collect();
                store.replace_all(lottery_id, &draws).await?;
                let imported = draws.len();
                (History::from_draws(draws)?, imported, 0)
            }
            ImportMode::Append => {
                let current = self.history(lottery_id).await?;
                let mut next = History::clone(&current);
                let mut already_known = 0;
                let mut added = Vec::new();

                for entry in &parsed.draws {
                    if next.contains(&entry.combination) {
                        already_known += 1;
                        continue;
                    }
                    let draw = to_draw(next.next_sequence(), entry.drawn_on, &entry.combination);
                    next.append(draw.clone())?;
                    added.push(draw);
                }

                if let Err(err) = store.append_all(lottery_id, &added).await {
                    // storage may have been written by another process
                    self.histories.write().remove(lottery_id);
                    return Err(err);
                }
                (next, added.len(), already_known)
            }
        };

        let total_draws = history.len();
        self.histories
            .write()
            .insert(lottery_id.to_string(), Arc::new(history));

        tracing::info!(
            "Imported {} draws into '{}' ({} skipped lines, {} duplicates)",
            imported,
            lottery_id,
            parsed.skipped.len(),
            parsed.duplicates.len()
        );

        Ok(ImportSummary {
            lottery_id: lottery_id.to_string(),
            imported,
            duplicates: parsed.duplicates.len(),
            already_known,
            skipped_lines: parsed.skipped,
            total_draws,
        })
    }

    pub async fn generate(
        &self,
        lottery_id: &str,
        count: usize,
        options: GenerateOptions,
    ) -> Result<GenerationBatch> {
        let rule = self.rule(lottery_id)?;
        if count == 0 || count > self.config.max_batch {
            return Err(LotoError::invalid_request(format!(
                "count must be between 1 and {}",
                self.config.max_batch
            )));
        }

        let history = self.history(lottery_id).await?;
        let proposals = self.excluded_proposals(lottery_id, options).await?;

        let combinations = {
            let gen_options = self.generation_options(rule, &history, &proposals, options);
            let mut rng = StdRng::from_entropy();
            generator::generate_with(rule, count, &gen_options, &mut rng)?
        };

        let batch_id = Uuid::new_v4().to_string();
        if options.record {
            ProposalStore::new(&self.storage)
                .record(lottery_id, &batch_id, &combinations, &HashSet::new())
                .await?;
        }

        tracing::info!(
            "Generated {} combinations for '{}' (batch {})",
            combinations.len(),
            lottery_id,
            batch_id
        );

        Ok(GenerationBatch {
            batch_id,
            lottery_id: lottery_id.to_string(),
            combinations,
        })
    }

    pub async fn generate_blocks(
        &self,
        lottery_id: &str,
        blocks: usize,
        options: GenerateOptions,
    ) -> Result<BlockBatch> {
        let rule = self.rule(lottery_id)?;
        let block_len = rule.blocks.map_or(1, |layout| layout.block_len());
        if blocks == 0 || blocks * block_len > self.config.max_batch {
            return Err(LotoError::invalid_request(format!(
                "blocks must be between 1 and {}",
                (self.config.max_batch / block_len).max(1)
            )));
        }

        let history = self.history(lottery_id).await?;
        let proposals = self.excluded_proposals(lottery_id, options).await?;

        let generated = {
            let gen_options = self.generation_options(rule, &history, &proposals, options);
            let mut rng = StdRng::from_entropy();
            generator::generate_blocks(rule, blocks, &gen_options, &mut rng)?
        };

        let batch_id = Uuid::new_v4().to_string();
        if options.record {
            let mut combinations = Vec::new();
            let mut stars = HashSet::new();
            for block in &generated {
                combinations.extend(block.base.iter().cloned());
                stars.insert(combinations.len());
                combinations.push(block.star.clone());
            }
            ProposalStore::new(&self.storage)
                .record(lottery_id, &batch_id, &combinations, &stars)
                .await?;
        }

        tracing::info!(
            "Generated {} blocks for '{}' (batch {})",
            generated.len(),
            lottery_id,
            batch_id
        );

        Ok(BlockBatch {
            batch_id,
            lottery_id: lottery_id.to_string(),
            blocks: generated,
        })
    }

    pub async fn verify(&self, lottery_id: &str, combination: &Combination) -> Result<VerificationReport> {
        let rule = self.rule(lottery_id)?;
        let history = self.history(lottery_id).await?;
        verifier::verify(rule, combination, &history)
    }

    pub async fn verify_block(&self, lottery_id: &str, block: &[Combination]) -> Result<Vec<BlockEntry>> {
        let rule = self.rule(lottery_id)?;
        let history = self.history(lottery_id).await?;
        Ok(verifier::verify_block(rule, block, &history))
    }

    pub async fn coverage(
        &self,
        lottery_id: &str,
        block: &[Combination],
        star_index: Option<usize>,
    ) -> Result<CoverageSummary> {
        let rule = self.rule(lottery_id)?;
        let history = self.history(lottery_id).await?;
        verifier::analyze_coverage(rule, block, star_index, &history)
    }

    pub async fn proposals(&self, lottery_id: &str) -> Result<Vec<ProposalRecord>> {
        self.rule(lottery_id)?;
        ProposalStore::new(&self.storage).load(lottery_id).await
    }

    pub async fn is_proposed(&self, lottery_id: &str, combination: &Combination) -> Result<bool> {
        Ok(self
            .proposals(lottery_id)
            .await?
            .iter()
            .any(|record| &record.combination == combination))
    }

    async fn excluded_proposals(
        &self,
        lottery_id: &str,
        options: GenerateOptions,
    ) -> Result<HashSet<Combination>> {
        if !options.avoid_proposals {
            return Ok(HashSet::new());
        }
        ProposalStore::new(&self.storage).load_set(lottery_id).await
    }

    fn generation_options<'a>(
        &self,
        rule: &'a LotteryRule,
        history: &'a History,
        proposals: &'a HashSet<Combination>,
        options: GenerateOptions,
    ) -> GenerationOptions<'a> {
        let criteria = if options.apply_criteria {
            rule.criteria
                .as_ref()
                .map(|c| c.with_median(history.median(rule.range)))
        } else {
            None
        };

        GenerationOptions {
            avoid_history: options.avoid_history.then_some(history),
            exclude: (!proposals.is_empty()).then_some(proposals),
            criteria,
            max_attempts: self.config.max_attempts,
        }
    }
}

fn to_draw(sequence: u64, drawn_on: Option<NaiveDate>, combination: &Combination) -> Draw {
    let mut draw = Draw::new(sequence, combination.clone());
    draw.drawn_on = drawn_on;
    draw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::NumberRange;
    use crate::verifier::EntryOutcome;
    use tempfile::tempdir;

    async fn engine(dir: &std::path::Path) -> LotoEngine {
        LotoEngine::new(EngineConfig::new(dir)).await.unwrap()
    }

    #[tokio::test]
    async fn test_record_and_verify() {
        let temp_dir = tempdir().unwrap();
        let engine = engine(temp_dir.path()).await;

        let draw = engine
            .record_draw("649", Combination::from_numbers([1, 2, 3, 4, 5, 6]), None, None)
            .await
            .unwrap();
        assert_eq!(draw.sequence, 1);

        let report = engine
            .verify("649", &Combination::from_numbers([1, 2, 3, 7, 8, 9]))
            .await
            .unwrap();
        assert_eq!(report.matched_count, 3);
        assert_eq!(report.prize_tier.as_deref(), Some("3/6"));

        let err = engine
            .record_draw("649", Combination::from_numbers([7, 8, 9, 10, 11, 12]), Some(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LotoError::Conflict(_)));

        let err = engine
            .verify("keno", &Combination::from_numbers([1, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, LotoError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_history_survives_restart() {
        let temp_dir = tempdir().unwrap();
        {
            let engine = engine(temp_dir.path()).await;
            engine
                .record_draw("grande-vie", Combination::from_numbers([5, 12, 23, 34, 45]), None, None)
                .await
                .unwrap();
        }

        let engine = engine(temp_dir.path()).await;
        let history = engine.history("grande-vie").await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history.contains(&Combination::from_numbers([5, 12, 23, 34, 45])));
    }

    #[tokio::test]
    async fn test_snapshot_is_not_affected_by_append() {
        let temp_dir = tempdir().unwrap();
        let engine = engine(temp_dir.path()).await;

        let before = engine.history("649").await.unwrap();
        engine
            .record_draw("649", Combination::from_numbers([1, 2, 3, 4, 5, 6]), None, None)
            .await
            .unwrap();

        assert!(before.is_empty());
        assert_eq!(engine.history("649").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_replace_and_append() {
        let temp_dir = tempdir().unwrap();
        let engine = engine(temp_dir.path()).await;

        let summary = engine
            .import_history(
                "649",
                "2024-01-06 1 2 3 4 5 6 (7)\n10 11 12 13 14 15\n1 2 3 4 5 6\nbad line\n",
                ImportMode::Replace,
            )
            .await
            .unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.skipped_lines, vec![4]);
        assert_eq!(summary.total_draws, 2);

        let summary = engine
            .import_history("649", "10 11 12 13 14 15\n20 21 22 23 24 25\n", ImportMode::Append)
            .await
            .unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.already_known, 1);

        let history = engine.history("649").await.unwrap();
        let sequences: Vec<u64> = history.draws().iter().map(|d| d.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(
            history.draws()[0].drawn_on,
            NaiveDate::from_ymd_opt(2024, 1, 6)
        );
    }

    #[tokio::test]
    async fn test_failed_append_import_leaves_storage_untouched() {
        let temp_dir = tempdir().unwrap();
        let first = engine(temp_dir.path()).await;
        let second = engine(temp_dir.path()).await;

        assert!(first.history("649").await.unwrap().is_empty());
        second
            .record_draw("649", Combination::from_numbers([40, 41, 42, 43, 44, 45]), Some(2), None)
            .await
            .unwrap();

        let text = "1 2 3 4 5 6\n10 11 12 13 14 15\n";
        let err = first
            .import_history("649", text, ImportMode::Append)
            .await
            .unwrap_err();
        assert!(matches!(err, LotoError::Storage(_)));

        let stored = DrawStore::new(&first.storage).load("649").await.unwrap();
        let sequences: Vec<u64> = stored.iter().map(|d| d.sequence).collect();
        assert_eq!(sequences, vec![2]);

        // the stale snapshot is dropped, so a retry builds on the stored rows
        let summary = first
            .import_history("649", text, ImportMode::Append)
            .await
            .unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.total_draws, 3);
        let history = first.history("649").await.unwrap();
        let sequences: Vec<u64> = history.draws().iter().map(|d| d.sequence).collect();
        assert_eq!(sequences, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_generate_avoids_history_and_proposals() {
        let temp_dir = tempdir().unwrap();
        let catalog =
            RuleCatalog::new(vec![LotteryRule::new("tiny", "Tiny", NumberRange::new(1, 5), 3)]).unwrap();
        let engine = LotoEngine::with_catalog(EngineConfig::new(temp_dir.path()), catalog)
            .await
            .unwrap();

        engine
            .record_draw("tiny", Combination::from_numbers([1, 2, 3]), None, None)
            .await
            .unwrap();

        let first = engine.generate("tiny", 5, GenerateOptions::default()).await.unwrap();
        assert_eq!(first.combinations.len(), 5);
        assert!(!first.combinations.contains(&Combination::from_numbers([1, 2, 3])));
        assert!(engine.is_proposed("tiny", &first.combinations[0]).await.unwrap());

        let second = engine.generate("tiny", 4, GenerateOptions::default()).await.unwrap();
        assert!(second.combinations.iter().all(|c| !first.combinations.contains(c)));

        let err = engine.generate("tiny", 1, GenerateOptions::default()).await.unwrap_err();
        assert!(matches!(err, LotoError::GenerationExhausted { .. }));

        let unrecorded = GenerateOptions {
            avoid_proposals: false,
            record: false,
            ..GenerateOptions::default()
        };
        let third = engine.generate("tiny", 9, unrecorded).await.unwrap();
        assert_eq!(third.combinations.len(), 9);
        assert_eq!(engine.proposals("tiny").await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_generate_limits() {
        let temp_dir = tempdir().unwrap();
        let engine = engine(temp_dir.path()).await;

        for count in [0, 1_001] {
            let err = engine.generate("649", count, GenerateOptions::default()).await.unwrap_err();
            assert!(matches!(err, LotoError::InvalidRequest(_)));
        }
    }

    #[tokio::test]
    async fn test_generate_blocks_records_stars() {
        let temp_dir = tempdir().unwrap();
        let engine = engine(temp_dir.path()).await;

        let options = GenerateOptions {
            apply_criteria: true,
            ..GenerateOptions::default()
        };
        let batch = engine.generate_blocks("grande-vie", 2, options).await.unwrap();
        assert_eq!(batch.blocks.len(), 2);

        let proposals = engine.proposals("grande-vie").await.unwrap();
        assert_eq!(proposals.len(), 20);
        assert_eq!(proposals.iter().filter(|p| p.is_star).count(), 2);
        assert!(proposals[9].is_star);
        assert_eq!(proposals[9].combination, batch.blocks[0].star);

        let block: Vec<Combination> = batch.blocks[0].combinations().cloned().collect();
        let coverage = engine.coverage("grande-vie", &block, None).await.unwrap();
        assert!(coverage.audits.iter().all(|a| a.passes()));
        assert!(coverage.conforming);
    }

    #[tokio::test]
    async fn test_verify_block_through_engine() {
        let temp_dir = tempdir().unwrap();
        let engine = engine(temp_dir.path()).await;
        engine
            .record_draw("649", Combination::from_numbers([1, 2, 3, 4, 5, 6]), None, None)
            .await
            .unwrap();

        let block = vec![
            Combination::from_numbers([1, 2, 3, 4, 5, 6]),
            Combination::from_numbers([1, 2, 3, 4, 5, 6]),
            Combination::from_numbers([1, 2, 3, 4, 5, 60]),
        ];
        let entries = engine.verify_block("649", &block).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0].outcome, EntryOutcome::Duplicate { .. }));
        assert!(matches!(entries[1].outcome, EntryOutcome::Duplicate { .. }));
        assert!(matches!(entries[2].outcome, EntryOutcome::Invalid { .. }));
    }
}
