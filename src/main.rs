use std::path::PathBuf;

use beam_match::allocator::Allocator;
use beam_match::config::MatchConfig;
use beam_match::matcher::Matcher;
use beam_match::report::{self, MatchRow, PlanRow};
use beam_match::{Demand, EfficiencySummary, Inventory, MatchResult, ProfileCatalog};
use clap::Parser;
use serde::Serialize;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "beam_match",
    about = "Match salvaged and new steel beams against cutting demand"
)]
struct Cli {
    /// Inventory JSON file ({"items": [...]})
    #[arg(long, conflicts_with = "sample", required_unless_present = "sample")]
    supply: Option<PathBuf>,

    /// Use the built-in demo inventory
    #[arg(long)]
    sample: bool,

    /// Demand as PROFILE:LENGTH[:QTY] (e.g. "HEA 200:5500:2")
    #[arg(long = "demand", num_args = 1.., required = true)]
    demands: Vec<String>,

    /// Saw blade kerf in mm
    #[arg(long, default_value_t = beam_match::config::DEFAULT_KERF_MM)]
    kerf: f64,

    /// Offcuts shorter than this (mm) count as scrap when scoring
    #[arg(long, default_value_t = beam_match::config::DEFAULT_MIN_OFFCUT_MM)]
    min_offcut: f64,

    /// Let batch allocation fall back to substitute profiles
    #[arg(long)]
    honor_substitutes: bool,

    /// Do not favour salvaged stock when scoring
    #[arg(long)]
    no_prefer_salvaged: bool,

    /// Resolve each demand line on its own (best score) instead of batch allocation
    #[arg(long)]
    single: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Draw each cutting plan
    #[arg(long)]
    layout: bool,

    /// Log matching decisions to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parse_demand(s: &str, line: usize) -> Result<Demand, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid demand '{}', expected PROFILE:LENGTH[:QTY]", s));
    }
    if parts[0].is_empty() {
        return Err(format!("missing profile in '{}'", s));
    }
    let length = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let qty = match parts.get(2) {
        Some(q) => q
            .parse::<i64>()
            .map_err(|_| format!("invalid quantity in '{}'", s))?,
        None => 1,
    };
    Ok(Demand::new(format!("D{}", line + 1), parts[0], length, qty))
}

#[derive(Serialize)]
struct JsonReport {
    results: Vec<MatchRow>,
    plans: Vec<PlanRow>,
    summary: EfficiencySummary,
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn print_result(r: &MatchResult) {
    match (&r.supply_id, &r.matched_profile) {
        (Some(supply), Some(profile)) => println!(
            "  {:<10} {} {}mm <- {} ({} {}mm) {:.1}% rest {}mm €{:.2} [{}]",
            r.demand_id,
            r.requested_profile,
            r.requested_length_mm,
            supply,
            profile,
            r.matched_length_mm,
            r.efficiency_pct,
            r.leftover_mm,
            r.estimated_cost,
            r.outcome,
        ),
        _ => println!(
            "  {:<10} {} {}mm -- no match",
            r.demand_id, r.requested_profile, r.requested_length_mm
        ),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_max_level(Level::DEBUG)
            .init();
    }

    let inventory = match &cli.supply {
        Some(path) => Inventory::load_json(path).unwrap_or_else(|e| fail(e)),
        None => Inventory::sample(),
    };

    let demands: Vec<Demand> = cli
        .demands
        .iter()
        .enumerate()
        .map(|(i, d)| parse_demand(d, i))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| fail(e));

    let mut config = MatchConfig {
        kerf_mm: cli.kerf,
        honor_substitutes: cli.honor_substitutes,
        ..MatchConfig::default()
    };
    config.weights.offcut_floor_mm = cli.min_offcut;
    config.weights.prefer_salvaged = !cli.no_prefer_salvaged;

    let (results, plans) = if cli.single {
        let matcher = Matcher::new(&inventory, &config);
        let results = demands
            .iter()
            .enumerate()
            .map(|(i, d)| matcher.best_match_line(d, i))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| fail(e));
        (results, vec![])
    } else {
        let allocation = Allocator::new(&inventory, &config)
            .allocate(&demands)
            .unwrap_or_else(|e| fail(e));
        (allocation.results, allocation.plans)
    };
    let summary = EfficiencySummary::from_results(&results);

    if cli.json {
        let catalog = ProfileCatalog::standard();
        let out = JsonReport {
            results: results
                .iter()
                .map(|r| MatchRow::from_result(r, &catalog))
                .collect(),
            plans: plans.iter().map(PlanRow::from_plan).collect(),
            summary: summary.rounded(),
        };
        match serde_json::to_string_pretty(&out) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
        return;
    }

    println!("Matches:");
    for r in &results {
        print_result(r);
    }

    if !plans.is_empty() {
        println!();
        println!("Cutting plans:");
        for plan in &plans {
            println!(
                "  {} {} {}mm, offcut {}mm",
                plan.supply_id, plan.profile, plan.stock_length_mm, plan.offcut_mm
            );
            if cli.layout {
                println!("    {}", report::render_plan(plan));
            }
        }
    }

    println!();
    println!(
        "Summary: {:.1}% matched, {:.1}% average efficiency, {:.0}mm offcut, €{:.2} total",
        summary.match_percentage,
        summary.average_efficiency,
        summary.total_offcut_mm,
        summary.total_cost,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_demand() {
        let d = parse_demand("HEA 200:5500:2", 0).unwrap();
        assert_eq!(d.profile, "HEA 200");
        assert_eq!(d.length_mm, 5500.0);
        assert_eq!(d.qty, 2);
        assert_eq!(d.id, "D1");

        let d = parse_demand("IPE 200:6000", 3).unwrap();
        assert_eq!(d.qty, 1);
        assert_eq!(d.id, "D4");
    }

    #[test]
    fn test_parse_demand_errors() {
        assert!(parse_demand("HEA 200", 0).is_err());
        assert!(parse_demand(":5500", 0).is_err());
        assert!(parse_demand("HEA 200:long", 0).is_err());
        assert!(parse_demand("HEA 200:5500:many", 0).is_err());
        assert!(parse_demand("a:1:2:3", 0).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
