//! Loto core - lottery combination generation and verification
//!
//! This library resolves lottery rules from an explicit catalog, generates
//! valid combinations, and verifies combinations and whole blocks against
//! a persisted draw history.

pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod generator;
pub mod history;
pub mod rules;
pub mod storage;
pub mod types;
pub mod verifier;

pub use config::EngineConfig;
pub use criteria::{Criteria, CriteriaAudit};
pub use engine::{BlockBatch, GenerateOptions, GenerationBatch, ImportMode, ImportSummary, LotoEngine};
pub use error::{ErrorKind, ErrorPayload, LotoError, Result};
pub use generator::{generate, GeneratedBlock};
pub use history::History;
pub use rules::{LotteryRule, NumberRange, RuleCatalog};
pub use types::{Combination, Draw};
pub use verifier::{verify, verify_block, BlockEntry, CoverageSummary, EntryOutcome, VerificationReport};
