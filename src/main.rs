use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mirror_migrate::config::{self, MigrationConfig};
use mirror_migrate::rewrite::{ALIAS_STEP, DIRECTIVE_STEP, IMPORT_STEP};
use mirror_migrate::{FileOutcome, Migration, MigrationReport, ProcessError, ProcessOptions};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mirror-migrate")]
#[command(about = "Migrate UNet (UnityEngine.Networking) C# scripts to Mirror", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every script under the project root
    Migrate {
        /// Directory to scan (defaults to ./Assets, else the current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Save each script as <name>.bak before touching it
        #[arg(short, long)]
        backup: bool,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,

        /// Migration config file (defaults to ./mirror-migrate.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the scripts a migration would consider
    Scan {
        /// Directory to scan (defaults to ./Assets, else the current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Migration config file (defaults to ./mirror-migrate.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the substitution rules in the order they are applied
    Rules {
        /// Migration config file (defaults to ./mirror-migrate.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Migrate {
            root,
            backup,
            dry_run,
            diff,
            json,
            config,
        } => cmd_migrate(root, config, ProcessOptions { backup, dry_run }, diff, json),

        Commands::Scan { root, config } => cmd_scan(root, config),

        Commands::Rules { config } => cmd_rules(config),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Helper: Load the migration config from an explicit path or the working
/// directory.
fn load_config(explicit: Option<&Path>) -> Result<MigrationConfig> {
    let cwd = env::current_dir().context("cannot determine current directory")?;
    Ok(config::discover(explicit, &cwd)?)
}

/// Resolve the directory to migrate
///
/// Priority order:
/// 1. Explicit --root flag
/// 2. `root` from the config file
/// 3. `./Assets` when it exists (running from a Unity project)
/// 4. The current directory
fn resolve_root(cli_root: Option<PathBuf>, config: &MigrationConfig) -> Result<PathBuf> {
    if let Some(path) = cli_root.or_else(|| config.root.clone()) {
        return path
            .canonicalize()
            .with_context(|| format!("cannot open root directory {}", path.display()));
    }

    let cwd = env::current_dir().context("cannot determine current directory")?;
    let assets = cwd.join("Assets");
    if assets.is_dir() {
        eprintln!(
            "{}",
            format!("Auto-detected Unity assets folder: {}", assets.display()).dimmed()
        );
        return Ok(assets);
    }

    Ok(cwd)
}

/// Helper: Show unified diff between original and migrated content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (migrated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_outcome(
    path: &Path,
    result: &Result<FileOutcome, ProcessError>,
    dry_run: bool,
    show_diff: bool,
) {
    match result {
        Ok(FileOutcome::Rewritten {
            applied,
            original,
            content,
            backup,
            ..
        }) => {
            let verb = if dry_run { "Would migrate" } else { "Migrated" };
            println!(
                "{} {} {} ({})",
                "✓".green(),
                verb,
                path.display(),
                applied.join(", ").dimmed()
            );
            if let Some(backup) = backup {
                println!("  {}", format!("backup: {}", backup.display()).dimmed());
            }
            if show_diff {
                display_diff(path, original, content);
            }
        }
        Ok(FileOutcome::Unchanged { backup, .. }) => {
            if let Some(backup) = backup {
                println!(
                    "{} {}: nothing to migrate (backup: {})",
                    "⊙".yellow(),
                    path.display(),
                    backup.display()
                );
            }
        }
        Err(e) => {
            eprintln!("{} {}: {}", "✗".red(), path.display(), e);
        }
    }
}

fn print_summary(report: &MigrationReport, dry_run: bool) {
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} found", format!("{}", report.files_found).cyan());
    println!("  {} attempted", report.files_attempted());
    println!("  {} processed", report.files_processed);
    let changed = if dry_run { "would change" } else { "changed" };
    println!("  {} {}", format!("{}", report.files_changed).green(), changed);
    println!("  {} failed", format!("{}", report.errors.len()).red());

    if report.has_errors() {
        println!();
        println!("{}", "Failed files:".bold());
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
}

fn cmd_migrate(
    root: Option<PathBuf>,
    config_path: Option<PathBuf>,
    options: ProcessOptions,
    show_diff: bool,
    json: bool,
) -> Result<()> {
    // 1. Config and rule table; a bad table stops us before any file is read
    let config = load_config(config_path.as_deref())?;
    let migration = Migration::from_config(&config, options)?;
    let options = migration.options();

    // 2. Resolve root
    let root = resolve_root(root, &config)?;

    if !json {
        println!("Root: {}", root.display());
        println!("Rules: {}", migration.rules().len());
        if options.dry_run {
            println!("{}", "[DRY RUN - nothing will be written]".cyan());
        } else if options.backup {
            println!("{}", "Backups: <file>.bak".dimmed());
        }
        println!();
    }

    // 3. Scan and process
    let mut report = MigrationReport::new();
    migration.run_with(&root, &mut report, |path, result| {
        if !json {
            print_outcome(path, result, options.dry_run, show_diff);
        }
    })?;

    // 4. Report
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, options.dry_run);
    }

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_scan(root: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let migration = Migration::from_config(&config, ProcessOptions::default())?;
    let root = resolve_root(root, &config)?;

    let files = migration.enumerate(&root)?;
    for file in &files {
        let shown = file.strip_prefix(&root).unwrap_or(file);
        println!("{}", shown.display());
    }

    let excluded = migration.scan_options().excluded_dirs.join(", ");
    println!();
    println!(
        "{} file(s) under {} {}",
        format!("{}", files.len()).bold(),
        root.display(),
        format!("(excluding: {})", excluded).dimmed()
    );
    Ok(())
}

fn cmd_rules(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let migration = Migration::from_config(&config, ProcessOptions::default())?;

    println!("{}", "Migration rules (applied in order):".bold());
    println!(
        "  {} {}, {}",
        "0.".dimmed(),
        ALIAS_STEP.cyan(),
        IMPORT_STEP.cyan()
    );
    for (idx, rule) in migration.rules().iter().enumerate() {
        println!(
            "  {} {}: {} {} {}",
            format!("{}.", idx + 1).dimmed(),
            rule.name().cyan(),
            rule.pattern(),
            "→".dimmed(),
            rule.replacement()
        );
    }
    println!(
        "  {} {}",
        format!("{}.", migration.rules().len() + 1).dimmed(),
        DIRECTIVE_STEP.cyan()
    );
    Ok(())
}
