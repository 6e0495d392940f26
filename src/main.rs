use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use allot::allocation::{validate_draft, AllocationError, ScoreAllocationEngine};
use allot::draft::{load_draft, save_draft, EvaluationDraft};
use allot::grading::{grade_attempt, AttemptAnswer};
use allot::preview::PreviewNotifier;

const EXIT_SUCCESS: i32 = 0;
const EXIT_VALIDATION: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the allocation table and run all submission checks
    Check {
        /// Path to the draft JSON file
        draft: PathBuf,
    },
    /// Proportionally rescale question points to the maximum score
    Normalize {
        draft: PathBuf,
        /// Save the rebalanced draft back to the file
        #[arg(long)]
        write: bool,
    },
    /// Split the maximum score as evenly as possible across questions
    Spread {
        draft: PathBuf,
        /// Save the rebalanced draft back to the file
        #[arg(long)]
        write: bool,
    },
    /// Validate the draft and print the submission payload as JSON
    Submit { draft: PathBuf },
    /// Grade an attempt file against the draft
    Grade {
        draft: PathBuf,
        /// JSON array of {question_index, response} entries
        answers: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "allot")]
#[command(about = "Evaluation score allocation and grading CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/allot/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match allot::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = allot::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let use_colors = allot::output::should_use_colors();

    match cli.command {
        Commands::Check { draft } => {
            let draft = load_draft_or_exit(&draft);
            let engine = ScoreAllocationEngine::new(draft);

            println!("{}", allot::output::format_allocation_table(engine.draft(), use_colors));
            println!();

            let mut failed = false;

            if let Err(errors) = validate_draft(engine.draft(), &config.limits) {
                eprintln!("Draft errors:");
                eprintln!("{}", allot::output::format_validation_errors(&errors, use_colors));
                failed = true;
            }

            match engine.validate_for_submission() {
                Ok(total_score) => {
                    if !failed {
                        println!("Ready to submit. Total score resolves to {}.", total_score);
                    }
                }
                Err(AllocationError::ScoreExceedsMaximum {
                    total_points,
                    max_score,
                }) => {
                    eprintln!(
                        "{}",
                        allot::output::format_exceeds_hint(total_points, max_score, use_colors)
                    );
                    failed = true;
                }
                Err(e) => {
                    eprintln!("{}", e);
                    failed = true;
                }
            }

            if failed {
                std::process::exit(EXIT_VALIDATION);
            }
        }
        Commands::Normalize { draft, write } => {
            rebalance(&draft, write, Rebalance::Normalize, &config, cli.verbose, use_colors).await;
        }
        Commands::Spread { draft, write } => {
            rebalance(&draft, write, Rebalance::Spread, &config, cli.verbose, use_colors).await;
        }
        Commands::Submit { draft } => {
            let draft = load_draft_or_exit(&draft);

            if let Err(errors) = validate_draft(&draft, &config.limits) {
                eprintln!("Draft errors:");
                eprintln!("{}", allot::output::format_validation_errors(&errors, use_colors));
                std::process::exit(EXIT_VALIDATION);
            }

            let engine = ScoreAllocationEngine::new(draft);
            let payload = match engine.submission_payload() {
                Ok(p) => p,
                Err(AllocationError::ScoreExceedsMaximum {
                    total_points,
                    max_score,
                }) => {
                    eprintln!(
                        "{}",
                        allot::output::format_exceeds_hint(total_points, max_score, use_colors)
                    );
                    std::process::exit(EXIT_VALIDATION);
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_VALIDATION);
                }
            };

            // The payload on stdout is the hand-off to whatever submits it
            match serde_json::to_string_pretty(&payload) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Failed to serialize payload: {}", e);
                    std::process::exit(EXIT_IO);
                }
            }
        }
        Commands::Grade { draft, answers } => {
            let draft = load_draft_or_exit(&draft);

            let answers_content = match std::fs::read_to_string(&answers) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Failed to read answers file {}: {}", answers.display(), e);
                    std::process::exit(EXIT_IO);
                }
            };
            let answers: Vec<AttemptAnswer> = match serde_json::from_str(&answers_content) {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Failed to parse answers file: {}", e);
                    std::process::exit(EXIT_IO);
                }
            };

            let report = grade_attempt(&draft, &answers);
            println!("{}", allot::output::format_attempt_report(&report, use_colors));
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

enum Rebalance {
    Normalize,
    Spread,
}

async fn rebalance(
    path: &PathBuf,
    write: bool,
    mode: Rebalance,
    config: &allot::config::Config,
    verbose: bool,
    use_colors: bool,
) {
    let draft = load_draft_or_exit(path);
    let before_total: i64 = draft.questions.iter().map(|q| q.points).sum();

    // Run the engine with a live preview channel so the debounced snapshot
    // is observable in verbose mode
    let (notifier, mut rx) =
        PreviewNotifier::new(Duration::from_millis(config.preview.debounce_ms));
    let mut engine = ScoreAllocationEngine::with_preview(draft, notifier);

    match mode {
        Rebalance::Normalize => engine.normalize_points(),
        Rebalance::Spread => engine.distribute_evenly(),
    }

    if verbose {
        // A no-op rebalance schedules nothing, so bound the wait
        let deadline = Duration::from_millis(config.preview.debounce_ms * 2 + 50);
        match tokio::time::timeout(deadline, rx.recv()).await {
            Ok(Some(snapshot)) => eprintln!(
                "Preview notified after {}ms: {} questions, {} pts",
                config.preview.debounce_ms,
                snapshot.questions.len(),
                snapshot.total_score
            ),
            _ => eprintln!("No preview notification (nothing changed)"),
        }
    }

    let after_total = engine.total_points();
    let draft = engine.into_draft();

    println!("{}", allot::output::format_allocation_table(&draft, use_colors));
    println!();
    println!("Rebalanced: {} pts -> {} pts", before_total, after_total);

    if write {
        if let Err(e) = save_draft(path, &draft) {
            eprintln!("Failed to save draft: {}", e);
            std::process::exit(EXIT_IO);
        }
        println!("Saved {}", path.display());
    } else {
        println!("Dry run; pass --write to save.");
    }
}

fn load_draft_or_exit(path: &PathBuf) -> EvaluationDraft {
    match load_draft(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Draft error: {}", e);
            std::process::exit(EXIT_IO);
        }
    }
}
