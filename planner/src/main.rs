//! CLI entry point for the glidepath planner.

use std::path::PathBuf;
use std::process;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use glidepath::{GlidePathEntry, Symbol};
use glidepath_planner::audit::AuditLog;
use glidepath_planner::commands;
use glidepath_planner::config::Config;
use glidepath_planner::error::Result;
use glidepath_planner::market::CsvMarketData;
use glidepath_planner::report::{
    self, ConfigView, FundList, PerformanceTable, PlanTable, ScheduleTable,
};
use glidepath_planner::store::JsonFundStore;

#[derive(Parser)]
#[command(name = "glidepath")]
#[command(about = "Glide-path planner: target allocations, contributions, performance")]
#[command(version)]
struct Cli {
    /// Path to glidepath.toml (defaults to ./glidepath.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored funds
    Funds,

    /// Create a fund with the standard asset classes and an empty glide path
    Create {
        /// Display name; the fund id replaces spaces with '_'
        name: String,
    },

    /// Show a fund's configuration
    Show { fund_id: String },

    /// Validate a JSON configuration and save it under FUND_ID
    Import { fund_id: String, file: PathBuf },

    /// Target allocation for every age in the configured range
    GlidePath { fund_id: String },

    /// Split new cash across underweight funds
    Rebalance {
        fund_id: String,

        /// New cash to invest
        #[arg(long)]
        cash: f64,

        /// Current holding value, repeatable (e.g. --holding VTI=12000)
        #[arg(long = "holding", value_name = "SYMBOL=VALUE", value_parser = commands::parse_holding)]
        holdings: Vec<(Symbol, f64)>,

        /// Date that fixes the investor's age (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Per-fund and overall returns from local price files
    Performance {
        fund_id: String,

        /// Report date (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&config, cli.command, cli.json) {
        eprintln!("Error: {e}");
        process::exit(e.exit_code());
    }
}

fn run(config: &Config, command: Command, json: bool) -> Result<()> {
    let store = JsonFundStore::new(config.store_dir());
    let today = || Local::now().date_naive();

    match command {
        Command::Funds => {
            let funds = commands::list_funds(&store)?;
            report::print_one(json, funds.as_slice(), |f| FundList(f).to_string())
        }
        Command::Create { name } => {
            let mut audit = AuditLog::open(&config.audit_path())?;
            let id = commands::create_fund(&store, &mut audit, &name)?;
            report::print_one(json, &serde_json::json!({ "fund_id": id }), |_| {
                format!("Created fund {id} in {}\n", store.dir().display())
            })
        }
        Command::Show { fund_id } => {
            let fund = commands::show_fund(&store, &fund_id)?;
            report::print_one(json, &fund, |c| {
                ConfigView {
                    fund_id: &fund_id,
                    config: c,
                }
                .to_string()
            })
        }
        Command::Import { fund_id, file } => {
            let mut audit = AuditLog::open(&config.audit_path())?;
            let fund = commands::import_fund(&store, &mut audit, &fund_id, &file)?;
            report::print_one(json, &fund, |c| {
                format!(
                    "Saved {fund_id}: {} asset classes, {} glide path rows\n",
                    c.asset_classes.len(),
                    c.glide_path.len()
                )
            })
        }
        Command::GlidePath { fund_id } => {
            let rows = commands::glide_path_schedule(&store, &fund_id, config.ages())?;
            if json {
                let entries: Vec<GlidePathEntry> = rows
                    .into_iter()
                    .map(|(age, allocations)| GlidePathEntry { age, allocations })
                    .collect();
                report::print_one(true, entries.as_slice(), |_| String::new())
            } else {
                report::print_one(false, rows.as_slice(), |r| ScheduleTable(r).to_string())
            }
        }
        Command::Rebalance {
            fund_id,
            cash,
            holdings,
            as_of,
        } => {
            let holdings = commands::holdings_from(&holdings);
            let mut audit = AuditLog::open(&config.audit_path())?;
            let plan = commands::plan_contribution(
                &store,
                &mut audit,
                &fund_id,
                &holdings,
                cash,
                as_of.unwrap_or_else(today),
            )?;
            report::print_one(json, &plan, |p| PlanTable(p).to_string())
        }
        Command::Performance { fund_id, as_of } => {
            let market = CsvMarketData::new(config.prices_dir());
            let perf =
                commands::performance(&store, &market, &fund_id, as_of.unwrap_or_else(today))?;
            report::print_one(json, &perf, |p| PerformanceTable(p).to_string())
        }
    }
}
