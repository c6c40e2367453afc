use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use loto_core::{LotoEngine, LotteryRule, Result};

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List available lotteries
    List,
    /// Show the full rule of one lottery
    Show {
        /// Lottery id
        lottery: String,
    },
}

pub async fn handle_rules_command(cmd: RulesCommands, engine: &LotoEngine) -> Result<()> {
    match cmd {
        RulesCommands::List => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Id", "Name", "Range", "Picks", "Special", "Blocks"]);

            for rule in engine.rules() {
                table.add_row(vec![
                    rule.id.clone(),
                    rule.name.clone(),
                    format!("{}-{}", rule.range.min, rule.range.max),
                    rule.picks.to_string(),
                    rule.special
                        .map(|s| format!("{}-{}", s.min, s.max))
                        .unwrap_or_else(|| "-".to_string()),
                    rule.blocks
                        .map(|b| format!("{} + star", b.base_per_block))
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }

            println!("{}", table);
        }

        RulesCommands::Show { lottery } => {
            let rule = engine.rule(&lottery)?;
            print_rule(rule);
        }
    }

    Ok(())
}

fn print_rule(rule: &LotteryRule) {
    println!("{} ({})", rule.name, rule.id);
    println!("  Numbers: {} from {} to {}", rule.picks, rule.range.min, rule.range.max);
    if let Some(special) = rule.special {
        println!("  Special ball: {} to {}", special.min, special.max);
    }
    println!("  Distinct numbers: {}", rule.distinct);
    println!("  Possible combinations: {}", rule.space_size());

    if let Some(criteria) = &rule.criteria {
        println!();
        println!("Criteria:");
        println!("  Parity splits (even, odd): {:?}", criteria.parity_splits);
        println!("  Size splits (small, large): {:?}", criteria.size_splits);
        println!("  Sum: {} to {}", criteria.sum_min, criteria.sum_max);
        println!("  Max per decade: {}", criteria.max_per_decade);
        println!(
            "  Endings: at most {} alike, at least {} distinct",
            criteria.max_same_ending, criteria.min_distinct_endings
        );
        println!("  Max multiples of 2..9: {}", criteria.max_per_multiple);
        println!(
            "  Consecutive runs: at most {}, none longer than {}",
            criteria.max_runs, criteria.max_run_len
        );
    }

    if let Some(blocks) = rule.blocks {
        println!();
        println!(
            "Blocks: {} base combinations + 1 star reusing at least {} numbers",
            blocks.base_per_block, blocks.star_reuse
        );
    }

    if !rule.prize_tiers.is_empty() {
        let tiers: Vec<&str> = rule.prize_tiers.iter().map(|t| t.label.as_str()).collect();
        println!();
        println!("Prize tiers: {}", tiers.join(", "));
    }
}
