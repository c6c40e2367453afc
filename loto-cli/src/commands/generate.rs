use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use loto_core::{GenerateOptions, LotoEngine, Result};

#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Generate independent combinations
    Combinations {
        /// Lottery id
        lottery: String,
        /// Number of combinations
        #[arg(short, long, default_value_t = 5)]
        count: usize,
        /// Keep only combinations passing the statistical criteria
        #[arg(long)]
        criteria: bool,
        /// Allow combinations that were already drawn
        #[arg(long)]
        allow_drawn: bool,
        /// Do not add the batch to the proposal ledger
        #[arg(long)]
        no_record: bool,
        /// Print the batch as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate covering blocks
    Blocks {
        /// Lottery id
        lottery: String,
        /// Number of blocks
        #[arg(short, long, default_value_t = 1)]
        blocks: usize,
        /// Keep only combinations passing the statistical criteria
        #[arg(long)]
        criteria: bool,
        /// Do not add the blocks to the proposal ledger
        #[arg(long)]
        no_record: bool,
        /// Print the blocks as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_generate_command(cmd: GenerateCommands, engine: &LotoEngine) -> Result<()> {
    match cmd {
        GenerateCommands::Combinations {
            lottery,
            count,
            criteria,
            allow_drawn,
            no_record,
            json,
        } => {
            let options = GenerateOptions {
                avoid_history: !allow_drawn,
                apply_criteria: criteria,
                record: !no_record,
                ..GenerateOptions::default()
            };
            let batch = engine.generate(&lottery, count, options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["#", "Combination", "Sum"]);
            for (i, combination) in batch.combinations.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    combination.to_string(),
                    combination.sum().to_string(),
                ]);
            }

            println!("{}", table);
            println!("Batch: {}", batch.batch_id);
        }

        GenerateCommands::Blocks {
            lottery,
            blocks,
            criteria,
            no_record,
            json,
        } => {
            let options = GenerateOptions {
                apply_criteria: criteria,
                record: !no_record,
                ..GenerateOptions::default()
            };
            let batch = engine.generate_blocks(&lottery, blocks, options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
                return Ok(());
            }

            for block in &batch.blocks {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![format!("Block {}", block.index), "Combination".to_string()]);
                for (i, combination) in block.base.iter().enumerate() {
                    table.add_row(vec![(i + 1).to_string(), combination.to_string()]);
                }
                table.add_row(vec!["star".to_string(), block.star.to_string()]);
                println!("{}", table);
            }
            println!("Batch: {}", batch.batch_id);
        }
    }

    Ok(())
}
