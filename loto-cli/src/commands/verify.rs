use super::read_combinations;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use loto_core::{BlockEntry, Combination, EntryOutcome, LotoEngine, Result, VerificationReport};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum VerifyCommands {
    /// Verify one combination, e.g. "3 14 15 22 35 41" or "5 12 23 34 45 + 3"
    Combination {
        /// Lottery id
        lottery: String,
        /// Numbers separated by spaces or commas
        numbers: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify a block read from a file, one combination per line
    Block {
        /// Lottery id
        lottery: String,
        /// File holding the block
        file: PathBuf,
        /// Also analyse coverage, the star being this 0-based entry
        #[arg(long)]
        coverage: bool,
        /// Star position for the coverage analysis (defaults to the last entry)
        #[arg(long)]
        star: Option<usize>,
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_verify_command(cmd: VerifyCommands, engine: &LotoEngine) -> Result<()> {
    match cmd {
        VerifyCommands::Combination {
            lottery,
            numbers,
            json,
        } => {
            let combination: Combination = numbers.parse()?;
            let report = engine.verify(&lottery, &combination).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            print_report(&report);
            if engine.is_proposed(&lottery, &report.combination).await? {
                println!("  Already proposed by an earlier batch");
            }
        }

        VerifyCommands::Block {
            lottery,
            file,
            coverage,
            star,
            json,
        } => {
            let block = read_combinations(&file)?;
            let entries = engine.verify_block(&lottery, &block).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{}", entries_table(&entries));
            }

            if coverage || star.is_some() {
                let summary = engine.coverage(&lottery, &block, star).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    println!("Coverage (star is entry {}):", summary.star_index);
                    println!("  Repeated in base: {}", join(&summary.repeated_numbers));
                    println!("  Star reused: {}", join(&summary.star_reused));
                    println!("  Star fresh: {}", join(&summary.star_fresh));
                    println!("  Uncovered: {}", join(&summary.uncovered));
                    let failing: Vec<usize> = summary
                        .audits
                        .iter()
                        .enumerate()
                        .filter(|(_, audit)| !audit.passes())
                        .map(|(i, _)| i)
                        .collect();
                    if !summary.audits.is_empty() {
                        println!("  Failing criteria: {}", join(&failing));
                    }
                    if let Some(len) = summary.expected_len {
                        println!("  Expected block size: {}", len);
                    }
                    println!(
                        "  Conforming: {}",
                        if summary.conforming { "yes" } else { "no" }
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &VerificationReport) {
    println!("Combination: {}", report.combination);
    println!("  Draws checked: {}", report.draws_checked);
    match &report.matched_draw {
        Some(draw) => {
            println!(
                "  Best match: {} numbers with draw #{} ({})",
                report.matched_count, draw.sequence, draw.combination
            );
            if let Some(date) = draw.drawn_on {
                println!("  Drawn on: {}", date);
            }
        }
        None => println!("  No number in common with any draw"),
    }
    if report.special_matched {
        println!("  Special ball matched");
    }
    if report.exact_match {
        println!("  This exact combination has already been drawn");
    }
    if let Some(tier) = &report.prize_tier {
        println!("  Prize tier: {}", tier);
    }
    if let Some(audit) = &report.criteria {
        let failures = audit.failures();
        if failures.is_empty() {
            println!("  Criteria: all passed");
        } else {
            println!("  Criteria failed: {}", failures.join(", "));
        }
    }
}

fn entries_table(entries: &[BlockEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Combination", "Status", "Matched", "Tier"]);

    for entry in entries {
        let (status, matched, tier) = match &entry.outcome {
            EntryOutcome::Verified { report } => (
                "ok".to_string(),
                report.matched_count.to_string(),
                report.prize_tier.clone().unwrap_or_default(),
            ),
            EntryOutcome::Invalid { error } => (error.message.clone(), String::new(), String::new()),
            EntryOutcome::Duplicate { positions, .. } => (
                format!("duplicate of {}", join(positions)),
                String::new(),
                String::new(),
            ),
        };
        table.add_row(vec![
            entry.index.to_string(),
            entry.combination.to_string(),
            status,
            matched,
            tier,
        ]);
    }

    table
}

fn join<T: ToString>(values: &[T]) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
