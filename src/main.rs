//! maildash: Email engagement dashboard CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use maildash::charts::ChartJsBackend;
use maildash::config::{default_config_json, load_config, locate_config, CONFIG_FILENAME};
use maildash::controller::AppController;
use maildash::loader::load_dataset;
use maildash::matcher::find_match;
use maildash::render::{ConsoleSurface, HtmlSurface, JsonSurface, Surface};
use maildash::watcher::DatasetWatcher;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// maildash: Email engagement dashboard generator
#[derive(Parser, Debug)]
#[command(name = "maildash")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data file: JSON bundle or `window.NAME = ...;` script (omit when using a subcommand)
    #[arg(required = true)]
    data: Option<PathBuf>,

    /// Output HTML file
    #[arg(long, short, default_value = "dashboard.html")]
    output: PathBuf,

    #[command(flatten)]
    common: CommonArgs,

    /// Watch the data and config files and rebuild on change
    #[arg(long)]
    watch: bool,

    /// Verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct CommonArgs {
    /// Path to config file (default: search .maildashrc.json next to the data file and in parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Apply a search before rendering
    #[arg(long, short)]
    query: Option<String>,

    /// Select an email before rendering, as GROUP:ID
    #[arg(long, value_name = "GROUP:ID", value_parser = parse_selection)]
    select: Option<(String, u64)>,

    /// Override the dashboard title
    #[arg(long)]
    title: Option<String>,

    /// Do not embed charts
    #[arg(long)]
    no_charts: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the dashboard to the terminal
    Show {
        data: PathBuf,

        #[command(flatten)]
        common: CommonArgs,

        /// Output as JSON
        #[arg(long, short)]
        json: bool,

        /// List rows of collapsed groups too
        #[arg(long)]
        all: bool,

        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },

    /// Show which certificate an email matches
    Match {
        data: PathBuf,

        /// Group (institution) of the email
        #[arg(long, short)]
        group: String,

        /// Email id
        #[arg(long)]
        id: u64,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create .maildashrc.json with sensible defaults
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn parse_selection(s: &str) -> Result<(String, u64), String> {
    let (group, id) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected GROUP:ID, got `{}`", s))?;
    if group.is_empty() {
        return Err("group name is empty".to_string());
    }
    let id = id
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid email id `{}`", id))?;
    Ok((group.to_string(), id))
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("MAILDASH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,maildash=debug" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::Show {
                data,
                common,
                json,
                all,
                no_color,
            } => run_show(&data, &common, json, all, no_color),
            Commands::Match {
                data,
                group,
                id,
                config,
            } => run_match(&data, &group, id, config.as_deref()),
            Commands::Init { dir } => run_init(dir.as_deref()),
        };
    }

    let data = args
        .data
        .as_ref()
        .context("Data file required (or use a subcommand)")?;

    if args.watch {
        return run_watch(data, &args.output, &args.common);
    }
    run_build(data, &args.output, &args.common)
}

/// Directory searched for the config file
fn work_dir(data: &Path) -> &Path {
    match data.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Load config and dataset and set up a controller
fn prepare(data: &Path, common: &CommonArgs) -> Result<AppController> {
    let config = load_config(work_dir(data), common.config.as_deref())?
        .config
        .merge_with_cli(common.title.as_deref(), common.no_charts)
        .resolve()?;
    let dataset = load_dataset(data, &config.data_paths)?;
    Ok(AppController::new(dataset, config))
}

/// Apply `--query` and `--select` after the initial render
fn apply_interactions(controller: &mut AppController, surface: &mut dyn Surface, common: &CommonArgs) {
    if let Some(query) = &common.query {
        controller.input_search(query, Instant::now());
        controller.flush_search(surface);
    }
    if let Some((group, id)) = &common.select {
        if !controller.select_email(surface, group, *id) {
            eprintln!(
                "{}: no email {} in group \"{}\" (after search)",
                "Warning".yellow(),
                id,
                group
            );
        }
    }
}

fn build_page(data: &Path, common: &CommonArgs) -> Result<(String, AppController)> {
    let mut controller = prepare(data, common)?;
    let mut page = HtmlSurface::new(controller.config())
        .with_index(controller.full_listing())
        .with_details(controller.all_details());
    let mut backend = ChartJsBackend::new();
    controller.start(&mut page, Some(&mut backend));
    apply_interactions(&mut controller, &mut page, common);
    let page = page.with_charts(backend.into_charts());
    Ok((page.render(), controller))
}

fn run_build(data: &Path, output: &Path, common: &CommonArgs) -> Result<ExitCode> {
    let (html, controller) = build_page(data, common)?;
    std::fs::write(output, html)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let stats = controller.stats();
    eprintln!(
        "{} {} ({} emails, {} institutions)",
        "Done".green().bold(),
        output.display(),
        stats.total_emails,
        stats.group_count
    );
    Ok(ExitCode::SUCCESS)
}

fn run_show(
    data: &Path,
    common: &CommonArgs,
    json: bool,
    all: bool,
    no_color: bool,
) -> Result<ExitCode> {
    let mut controller = prepare(data, common)?;
    let mut backend = ChartJsBackend::new();

    if json {
        let mut surface = JsonSurface::new().pretty();
        controller.start(&mut surface, Some(&mut backend));
        apply_interactions(&mut controller, &mut surface, common);
        println!("{}", surface.render());
    } else {
        let mut surface = ConsoleSurface::new(controller.config());
        if no_color {
            surface = surface.without_colors();
        }
        if all {
            surface = surface.verbose();
        }
        controller.start(&mut surface, Some(&mut backend));
        apply_interactions(&mut controller, &mut surface, common);
        println!("{}", surface.render());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_match(data: &Path, group: &str, id: u64, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(work_dir(data), config_path)?.config.resolve()?;
    let dataset = load_dataset(data, &config.data_paths)?;
    let email = dataset
        .emails_in(group)
        .iter()
        .find(|e| e.id == id)
        .with_context(|| format!("No email {} in group \"{}\"", id, group))?;

    println!("{} {}", "Email".bold(), email.subject);
    println!("   {}", email.display_address());

    match find_match(email, &dataset.certificates) {
        Some(m) => {
            println!(
                "{} #{} \"{}\" ({})",
                "Certificate".green().bold(),
                m.index,
                m.certificate.subject,
                m.rule
            );
            for r in &m.certificate.delivered_to {
                println!("   delivered to {}", r.label());
            }
            if let Some(url) = m.certificate.pdf_url.as_deref().filter(|u| !u.is_empty()) {
                println!("   {}", url);
            }
            println!("   {} timeline events", m.certificate.timeline.len());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("{}", "No certificate matched".yellow());
            Ok(ExitCode::from(1))
        }
    }
}

fn run_init(dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    std::fs::write(&config_path, default_config_json())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    eprintln!("{} Created {}", "Done".green().bold(), config_path.display());
    Ok(ExitCode::SUCCESS)
}

fn run_watch(data: &Path, output: &Path, common: &CommonArgs) -> Result<ExitCode> {
    let config_file = locate_config(work_dir(data), common.config.as_deref())?;

    let mut files: Vec<&Path> = vec![data];
    if let Some(p) = &config_file {
        files.push(p.as_path());
    }

    run_build(data, output, common)?;

    let watcher = DatasetWatcher::watch(&files).context("Failed to create file watcher")?;
    eprintln!("{}: Watching for changes... (Ctrl+C to stop)", "Info".blue());

    loop {
        let paths = watcher.next_changes();
        if paths.is_empty() {
            return Ok(ExitCode::SUCCESS);
        }
        for path in &paths {
            eprintln!("{}: {} changed", "Info".blue(), path.display());
        }
        if let Err(e) = run_build(data, output, common) {
            eprintln!("{}: {}", "Error".red(), e);
        }
    }
}
