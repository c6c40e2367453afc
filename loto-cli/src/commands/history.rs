use super::dialog_error;
use chrono::NaiveDate;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use loto_core::{Combination, ImportMode, LotoEngine, Result};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Show the most recent draws
    Show {
        /// Lottery id
        lottery: String,
        /// Number of draws to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Record a new draw
    Add {
        /// Lottery id
        lottery: String,
        /// Drawn numbers, e.g. "3 14 15 22 35 41"
        numbers: String,
        /// Draw date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Explicit sequence id (defaults to the next one)
        #[arg(long)]
        sequence: Option<u64>,
    },
    /// Import draws from a text file, one draw per line
    Import {
        /// Lottery id
        lottery: String,
        /// History file
        file: PathBuf,
        /// Append to the stored history instead of replacing it
        #[arg(short, long)]
        append: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// List combinations proposed by earlier batches
    Proposals {
        /// Lottery id
        lottery: String,
    },
}

pub async fn handle_history_command(cmd: HistoryCommands, engine: &LotoEngine) -> Result<()> {
    match cmd {
        HistoryCommands::Show { lottery, limit } => {
            let history = engine.history(&lottery).await?;

            if history.is_empty() {
                println!("No draws recorded for '{}'.", lottery);
                println!("Import some with: loto history import {} <file>", lottery);
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Sequence", "Date", "Combination"]);
            for draw in history.draws().iter().rev().take(limit) {
                table.add_row(vec![
                    draw.sequence.to_string(),
                    draw.drawn_on.map(|d| d.to_string()).unwrap_or_default(),
                    draw.combination.to_string(),
                ]);
            }

            println!("{}", table);
            println!(
                "{} draws in total, median number {}",
                history.len(),
                history.median(engine.rule(&lottery)?.range)
            );
        }

        HistoryCommands::Add {
            lottery,
            numbers,
            date,
            sequence,
        } => {
            let combination: Combination = numbers.parse()?;
            let draw = engine.record_draw(&lottery, combination, sequence, date).await?;
            println!("Recorded draw #{}: {}", draw.sequence, draw.combination);
        }

        HistoryCommands::Import {
            lottery,
            file,
            append,
            force,
        } => {
            let rule = engine.rule(&lottery)?;
            let text = tokio::fs::read_to_string(&file).await?;
            let mode = if append {
                ImportMode::Append
            } else {
                ImportMode::Replace
            };

            if mode == ImportMode::Replace && !force {
                let existing = engine.history(&lottery).await?.len();
                if existing > 0 {
                    let confirm = Confirm::new()
                        .with_prompt(format!(
                            "Replace the {} stored draws of {}? This action cannot be undone.",
                            existing, rule.name
                        ))
                        .default(false)
                        .interact()
                        .map_err(dialog_error)?;

                    if !confirm {
                        println!("Import cancelled.");
                        return Ok(());
                    }
                }
            }

            let summary = engine.import_history(&lottery, &text, mode).await?;
            println!("Imported {} draws into {}.", summary.imported, rule.name);
            if summary.duplicates > 0 {
                println!("  Repeated lines ignored: {}", summary.duplicates);
            }
            if summary.already_known > 0 {
                println!("  Already in history: {}", summary.already_known);
            }
            if !summary.skipped_lines.is_empty() {
                let lines: Vec<String> = summary.skipped_lines.iter().map(|l| l.to_string()).collect();
                println!("  Unreadable lines: {}", lines.join(", "));
            }
            println!("  Total draws: {}", summary.total_draws);
        }

        HistoryCommands::Proposals { lottery } => {
            let proposals = engine.proposals(&lottery).await?;

            if proposals.is_empty() {
                println!("No proposals recorded for '{}'.", lottery);
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Date", "Batch", "Combination", "Star"]);
            for record in &proposals {
                table.add_row(vec![
                    record.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    record.batch_id.chars().take(8).collect(),
                    record.combination.to_string(),
                    if record.is_star { "*".to_string() } else { String::new() },
                ]);
            }

            println!("{}", table);
        }
    }

    Ok(())
}
