use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use postmood::analyzer::normalize;
use postmood::config::Config;
use postmood::report::{self, CollisionPolicy, ConflictMode};
use postmood::{
    Analyzer, ArchiveSource, Database, LexiconOracle, OpinionSummary, OracleFailurePolicy, PostRecord, PostSource,
    SentimentClass,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "postmood")]
#[command(author, version, about = "Score the sentiment of an account's recent posts and summarize the overall opinion")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Account whose posts to analyze (leading '@' optional)
    account: Option<String>,

    /// Number of recent posts to analyze [config default: 20]
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Timeline archive directory
    #[arg(long)]
    archive: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Post table destination (.csv, .json, .html)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chart destination (.svg, .html)
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Directory for the post table and chart
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Don't write the post table
    #[arg(long)]
    no_report: bool,

    /// Don't write the chart
    #[arg(long)]
    no_chart: bool,

    /// Don't open the chart when done
    #[arg(long)]
    no_open: bool,

    /// What to do if the table file already exists
    #[arg(long, value_enum)]
    on_conflict: Option<ConflictArg>,

    /// File name to use instead when the table file exists (implies --on-conflict rename)
    #[arg(long)]
    rename_to: Option<PathBuf>,

    /// What to do with a post the sentiment oracle can't score
    #[arg(long, value_enum)]
    on_oracle_error: Option<OracleErrorArg>,

    /// JSON word list merged over the built-in lexicon
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// SQLite database to store the run in
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Show cleaned text and debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "warn", value_parser = clap::value_parser!(Level))]
    log_level: Level,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stored runs
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Write a sample configuration file
    InitConfig {
        /// Where to write it
        #[arg(default_value = "postmood.toml")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// List stored runs
    Runs,

    /// Show a run's posts and its recomputed summary
    Show {
        /// Run ID
        id: i32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one run
    Delete {
        /// Run ID
        id: i32,
    },

    /// Delete every run
    Clear,

    /// Create a backup of the database
    Backup {
        /// Output path for backup (default: postmood_backup_<timestamp>.db)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConflictArg {
    Overwrite,
    Rename,
    Abort,
}

impl From<ConflictArg> for ConflictMode {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Overwrite => ConflictMode::Overwrite,
            ConflictArg::Rename => ConflictMode::Rename,
            ConflictArg::Abort => ConflictMode::Abort,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OracleErrorArg {
    Abort,
    Neutral,
}

impl From<OracleErrorArg> for OracleFailurePolicy {
    fn from(arg: OracleErrorArg) -> Self {
        match arg {
            OracleErrorArg::Abort => OracleFailurePolicy::Abort,
            OracleErrorArg::Neutral => OracleFailurePolicy::Neutral,
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { args.log_level };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    if let Err(e) = run(args) {
        eprintln!("\x1b[31mError:\x1b[0m {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);

    // Handle subcommands first
    match args.command {
        Some(Command::InitConfig { ref path, force }) => return init_config(path, force),
        Some(Command::Db { ref action }) => {
            let db_path = config.database.clone().unwrap_or_else(Database::db_path);
            return handle_db_action(action, &db_path);
        }
        None => {}
    }

    let Some(ref account) = args.account else {
        eprintln!("Usage: postmood <ACCOUNT>");
        eprintln!("Run 'postmood --help' for more options.");
        bail!("no account given");
    };

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global().ok();
    }

    let oracle = match config.analysis.lexicon {
        Some(ref path) => LexiconOracle::load(path)?,
        None => LexiconOracle::new(),
    };
    let analyzer = Analyzer::with_oracle(oracle).with_failure_policy(config.analysis.on_oracle_error);

    let count = config.source.count;
    if !args.quiet {
        eprintln!("\x1b[1mPostmood - Post Sentiment Summary\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Fetching up to {} post(s) from @{}\n", count, account.trim_start_matches('@'));
    }

    let source = ArchiveSource::new(&config.source.archive_dir);
    let posts = source
        .fetch_posts(account, count)
        .with_context(|| format!("fetching posts from {}", source.root().display()))?;
    debug!(posts = posts.len(), "fetched");

    // Set up progress bar
    let pb = if !args.quiet && posts.len() > 1 {
        let pb = ProgressBar::new(posts.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_message("scoring");
        Some(pb)
    } else {
        None
    };

    let result = analyzer.analyze_with_progress(&posts, |_| {
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    });

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let analysis = result.with_context(|| format!("analyzing posts from @{}", account.trim_start_matches('@')))?;

    if !args.quiet {
        for record in &analysis.records {
            print_record(record, args.verbose);
        }
    }
    print_summary(&analysis.summary);

    // Post table
    if !args.no_report {
        let destination = args.output.clone().unwrap_or_else(|| config.report.table_path());
        let policy = resolve_policy(config.report.on_conflict, args.rename_to.clone(), &destination);
        let written = report::emit_table(&analysis.records, &destination, &policy)?;
        if !args.quiet {
            eprintln!("\n\x1b[32mTable saved: {}\x1b[0m", written.display());
        }
    }

    // Chart
    if !args.no_chart {
        let destination = args.chart.clone().unwrap_or_else(|| config.report.chart_path());
        let written = report::emit_chart(&analysis.summary, &destination)?;
        if !args.quiet {
            eprintln!("\x1b[32mChart saved: {}\x1b[0m", written.display());
        }
        if config.report.open_chart {
            if let Err(e) = open::that(&written) {
                warn!(error = %e, "failed to open chart");
            }
        }
    }

    if let Some(ref db_path) = config.database {
        let db = Database::open_at(db_path).with_context(|| format!("opening database {}", db_path.display()))?;
        let run_id = db.insert_run(account, count, &analysis.records)?;
        if !args.quiet {
            eprintln!("\x1b[32mStored as run {} in {}\x1b[0m", run_id, db_path.display());
        }
    }

    if !args.quiet {
        eprintln!("\n\x1b[90mAnalysis complete.\x1b[0m");
    }
    Ok(())
}

/// Flags win over the config file.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(count) = args.count {
        config.source.count = count;
    }
    if let Some(ref dir) = args.archive {
        config.source.archive_dir = dir.clone();
    }
    if let Some(policy) = args.on_oracle_error {
        config.analysis.on_oracle_error = policy.into();
    }
    if let Some(ref lexicon) = args.lexicon {
        config.analysis.lexicon = Some(lexicon.clone());
    }
    if let Some(ref dir) = args.report_dir {
        config.report.report_dir = dir.clone();
    }
    match (args.on_conflict, &args.rename_to) {
        (Some(mode), _) => config.report.on_conflict = mode.into(),
        (None, Some(_)) => config.report.on_conflict = ConflictMode::Rename,
        (None, None) => {}
    }
    if args.no_open {
        config.report.open_chart = false;
    }
    if let Some(ref db) = args.db {
        config.database = Some(db.clone());
    }
}

/// `rename` without an explicit name gets a timestamped one.
fn resolve_policy(mode: ConflictMode, rename_to: Option<PathBuf>, destination: &Path) -> CollisionPolicy {
    match mode {
        ConflictMode::Overwrite => CollisionPolicy::Overwrite,
        ConflictMode::Abort => CollisionPolicy::Abort,
        ConflictMode::Rename => CollisionPolicy::Rename(
            rename_to.unwrap_or_else(|| report::timestamped_name(destination, Local::now().naive_local())),
        ),
    }
}

fn class_color(class: SentimentClass) -> &'static str {
    match class {
        SentimentClass::Positive => "\x1b[32m", // Green
        SentimentClass::Neutral => "\x1b[90m",  // Gray
        SentimentClass::Negative => "\x1b[31m", // Red
    }
}

fn print_record(r: &PostRecord, verbose: bool) {
    println!(
        "{}{:<10}{} {:>6} likes {:>6} retweets  {}",
        class_color(r.sentiment),
        format!("[{}]", r.sentiment),
        "\x1b[0m",
        r.like_count,
        r.retweet_count,
        truncate(&r.text.replace('\n', " "), 60)
    );
    if verbose {
        eprintln!("    cleaned: {}", normalize(&r.text));
    }
}

fn print_summary(summary: &OpinionSummary) {
    eprintln!("\n{}", "─".repeat(70));
    eprintln!("\x1b[1mSummary:\x1b[0m");
    eprintln!("  General opinion:     {}", summary.weighted_opinion_score);
    eprintln!("  Average star rating: {:.2}", summary.average_star_rating);
    eprintln!(
        "  \x1b[32m+ Positive:\x1b[0m {:>5}  ({:.1}%)",
        summary.positive_count,
        summary.percent(SentimentClass::Positive)
    );
    eprintln!(
        "  \x1b[90m= Neutral:\x1b[0m  {:>5}  ({:.1}%)",
        summary.neutral_count,
        summary.percent(SentimentClass::Neutral)
    );
    eprintln!(
        "  \x1b[31m- Negative:\x1b[0m {:>5}  ({:.1}%)",
        summary.negative_count,
        summary.percent(SentimentClass::Negative)
    );
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    Config::default().save_to_file(path)?;
    println!("Wrote sample config to {}", path.display());
    Ok(())
}

fn handle_db_action(action: &DbAction, db_path: &Path) -> Result<()> {
    if let DbAction::Backup { output } = action {
        if !db_path.exists() {
            bail!("no database found at {}", db_path.display());
        }

        let backup_path = output.clone().unwrap_or_else(|| {
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from(format!("postmood_backup_{}.db", timestamp))
        });

        let bytes = std::fs::copy(db_path, &backup_path)
            .with_context(|| format!("copying {} to {}", db_path.display(), backup_path.display()))?;
        println!("Backup created: {} ({} bytes)", backup_path.display(), bytes);
        return Ok(());
    }

    let db = Database::open_at(db_path).with_context(|| format!("opening database {}", db_path.display()))?;

    match action {
        DbAction::Runs => {
            let runs = db.get_runs()?;
            if runs.is_empty() {
                println!("No runs stored.");
            } else {
                println!("{:<5} {:<20} {:>6} {:>9}  {}", "ID", "ACCOUNT", "POSTS", "REQUESTED", "ANALYZED");
                println!("{}", "-".repeat(70));
                for r in runs {
                    println!(
                        "{:<5} {:<20} {:>6} {:>9}  {}",
                        r.id,
                        truncate(&r.account, 20),
                        r.post_count,
                        r.requested_count,
                        r.analyzed_at
                    );
                }
            }
        }

        DbAction::Show { id, json } => {
            let Some(run) = db.get_run(*id)? else {
                bail!("no run with id {}", id);
            };
            let records = db.get_run_records(*id)?;
            let summary = db.summarize_run(*id)?;

            if *json {
                let value = serde_json::json!({ "run": run, "summary": summary, "posts": records });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Run {} for @{} ({})", run.id, run.account, run.analyzed_at);
                for record in &records {
                    print_record(record, false);
                }
                print_summary(&summary);
            }
        }

        DbAction::Delete { id } => {
            if db.delete_run(*id)? {
                println!("Deleted run {}", id);
            } else {
                bail!("no run with id {}", id);
            }
        }

        DbAction::Clear => {
            let removed = db.clear()?;
            println!("Deleted {} run(s)", removed);
        }

        DbAction::Backup { .. } => {}
    }

    Ok(())
}
