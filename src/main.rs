use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jtbd_explorer::admin::{HierarchyFilter, StatusFilter};
use jtbd_explorer::analysis::{EvolutionQuery, EvolutionSort, RoundQuery, RoundSort};
use jtbd_explorer::config::{self, Config};
use jtbd_explorer::dataset::{self, ResearchRound};
use jtbd_explorer::output;
use jtbd_explorer::scoring::{self, OpportunityLevel};
use jtbd_explorer::storage;

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List research rounds
    Rounds,
    /// Score and classify one importance/satisfaction pair
    Score {
        #[arg(allow_negative_numbers = true)]
        importance: f64,
        #[arg(allow_negative_numbers = true)]
        satisfaction: f64,
    },
    /// Outcome table for one round (default: config default_round, else latest)
    Analyze {
        #[arg(long)]
        round: Option<String>,
        #[arg(long)]
        big_job: Option<String>,
        #[arg(long)]
        little_job: Option<String>,
        /// high, medium or low
        #[arg(long)]
        level: Option<OpportunityLevel>,
        /// opportunity, importance or satisfaction
        #[arg(long, default_value = "opportunity")]
        sort: RoundSort,
    },
    /// Outcome count and average opportunity per job for one round
    Jobs {
        #[arg(long)]
        round: Option<String>,
    },
    /// Outcome scores across rounds
    Evolution {
        /// Comma-separated round ids (default: all)
        #[arg(long, value_delimiter = ',')]
        rounds: Option<Vec<String>>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        big_job: Option<String>,
        #[arg(long)]
        little_job: Option<String>,
        #[arg(long)]
        level: Option<OpportunityLevel>,
        /// opportunity, change, importance or satisfaction
        #[arg(long, default_value = "change")]
        sort: EvolutionSort,
        /// Rows to show (default: config top)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Opportunity score of one outcome per round
    Sparkline { outcome_id: String },
    /// Show the admin hierarchy
    Hierarchy {
        /// Exported hierarchy to load instead of the research baseline
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        search: Option<String>,
        /// all, active or archived (default: config status_filter)
        #[arg(long)]
        status: Option<StatusFilter>,
    },
    /// Apply a YAML batch of admin operations and export the result
    Apply {
        script: PathBuf,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Where to write the edited hierarchy (default: config export_file)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the baseline hierarchy as JSON
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate an exported hierarchy and summarize it
    Import { file: PathBuf },
}

#[derive(Parser, Debug)]
#[command(name = "jtbd-explorer")]
#[command(about = "Explore JTBD outcome research and edit the job hierarchy", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/jtbd-explorer/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "warn,jtbd_explorer=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let use_colors = output::should_use_colors();
    let rounds = dataset::research_rounds();

    let result = match cli.command {
        Commands::Rounds => {
            println!("{}", output::format_rounds(rounds, use_colors));
            Ok(())
        }
        Commands::Score {
            importance,
            satisfaction,
        } => {
            let result = scoring::score(importance, satisfaction);
            println!("{}", output::format_score_result(&result, use_colors));
            Ok(())
        }
        Commands::Analyze {
            round,
            big_job,
            little_job,
            level,
            sort,
        } => select_round(round.as_deref(), &config).map(|round| {
            let query = RoundQuery {
                big_job_id: big_job,
                little_job_id: little_job,
                level,
                sort,
            };
            let rows = jtbd_explorer::analysis::round_outcomes(round, &query);
            println!("{} ({})", round.name, round.date);
            println!("{}", output::format_round_table(&rows, use_colors));
        }),
        Commands::Jobs { round } => select_round(round.as_deref(), &config).map(|round| {
            let summaries = jtbd_explorer::analysis::job_summaries(round);
            println!("{} ({})", round.name, round.date);
            println!("{}", output::format_job_summaries(&summaries, use_colors));
        }),
        Commands::Evolution {
            rounds: selected,
            search,
            big_job,
            little_job,
            level,
            sort,
            top,
        } => {
            let query = EvolutionQuery {
                rounds: selected,
                search,
                big_job_id: big_job,
                little_job_id: little_job,
                level,
                sort,
            };
            let evolutions = jtbd_explorer::analysis::evolution(rounds, &query);
            let top = top.unwrap_or_else(|| config.top());
            println!(
                "{}",
                output::format_evolution_table(&evolutions, top, use_colors)
            );
            Ok(())
        }
        Commands::Sparkline { outcome_id } => {
            let points = jtbd_explorer::analysis::sparkline(rounds, &outcome_id);
            if points.is_empty() {
                Err(Failure::Data(format!("No scores for outcome '{}'", outcome_id)))
            } else {
                println!("{}", output::format_sparkline(&points));
                Ok(())
            }
        }
        Commands::Hierarchy {
            file,
            search,
            status,
        } => storage::open_store(file.as_deref())
            .map_err(Failure::from)
            .map(|store| {
                let filter = HierarchyFilter::new(
                    status.unwrap_or_else(|| config.status_filter()),
                    search.unwrap_or_default(),
                );
                let view = store.filtered(&filter);
                println!("{}", output::format_hierarchy(&view, use_colors));
            }),
        Commands::Apply {
            script,
            file,
            output: target,
            dry_run,
        } => run_apply(&script, file.as_deref(), target, dry_run, &config, use_colors),
        Commands::Export { output: target } => {
            let path = target.unwrap_or_else(|| PathBuf::from(config.export_file()));
            storage::open_store(None)
                .and_then(|store| storage::save_export(&path, &store))
                .map(|()| println!("Wrote {}", path.display()))
                .map_err(Failure::from)
        }
        Commands::Import { file } => storage::open_store(Some(&file))
            .map_err(Failure::from)
            .map(|store| {
                let stats = store.hierarchy().stats();
                println!(
                    "{} is valid: {} big jobs, {} little jobs, {} outcomes ({} archived)",
                    file.display(),
                    stats.big_jobs,
                    stats.little_jobs,
                    stats.outcomes,
                    stats.archived
                );
            }),
    };

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(Failure::Data(message)) => {
            eprintln!("{}", message);
            std::process::exit(EXIT_DATA);
        }
    }
}

/// Command failure carrying the message shown to the user
enum Failure {
    Data(String),
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Data(format!("Error: {:#}", e))
    }
}

fn select_round(
    requested: Option<&str>,
    config: &Config,
) -> Result<&'static ResearchRound, Failure> {
    let id = requested.or(config.default_round.as_deref());
    match id {
        Some(id) => dataset::find_round(id)
            .ok_or_else(|| Failure::Data(format!("Unknown round '{}'", id))),
        None => dataset::latest_round()
            .ok_or_else(|| Failure::Data("No research rounds available".to_string())),
    }
}

fn run_apply(
    script: &std::path::Path,
    file: Option<&std::path::Path>,
    target: Option<PathBuf>,
    dry_run: bool,
    config: &Config,
    use_colors: bool,
) -> Result<(), Failure> {
    let operations = storage::load_script(script)?;
    let mut store = storage::open_store(file)?;

    let target = if dry_run {
        None
    } else {
        Some(target.unwrap_or_else(|| PathBuf::from(config.export_file())))
    };
    let (report, written) = storage::apply_and_save(&mut store, operations, target.as_deref())?;

    println!("{}", output::format_audit_log(store.audit_log(), use_colors));
    for (index, op, error) in &report.failures {
        eprintln!("  #{} {}: {}", index + 1, op, error);
    }
    println!(
        "Applied {} of {} operations",
        report.applied,
        report.applied + report.failures.len()
    );
    if let (true, Some(path)) = (written, &target) {
        println!("Wrote {}", path.display());
    }

    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(Failure::Data(format!(
            "{} operation(s) failed",
            report.failures.len()
        )))
    }
}
