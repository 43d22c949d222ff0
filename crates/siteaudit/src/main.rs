use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use siteaudit_core::config::{Config, CONFIG_FILE};
use siteaudit_core::extractor::AssetExtractor;
use siteaudit_core::pipeline::AuditPipeline;

use siteaudit_css::CssExtractor;
use siteaudit_html::HtmlExtractor;
use siteaudit_js::JsExtractor;
use siteaudit_report::{json, markdown, text, write_reports, TextOptions};

#[derive(Parser)]
#[command(name = "siteaudit")]
#[command(about = "Audit a static site's assets for duplication and cross-file coupling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a site and print the consolidation report
    Analyze {
        /// Path to the site root
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Config file path (defaults to .siteaudit.toml in the site root)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Console output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Directory for report files (defaults to output.dir under the site root)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Entries shown per category
        #[arg(long)]
        top: Option<usize>,
        /// Print only; do not write report files
        #[arg(long)]
        no_write: bool,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Create a default .siteaudit.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

struct AnalyzeOptions {
    format: OutputFormat,
    out_dir: Option<PathBuf>,
    top: Option<usize>,
    write: bool,
    color: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let result = match cli.command {
        Commands::Analyze {
            path,
            config,
            format,
            out_dir,
            top,
            no_write,
            no_color,
        } => cmd_analyze(
            &path,
            config.as_deref(),
            AnalyzeOptions {
                format,
                out_dir,
                top,
                write: !no_write,
                color: !no_color,
            },
        ),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cmd_analyze(path: &Path, config_path: Option<&Path>, opts: AnalyzeOptions) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("project path '{}' does not exist", path.display());
    }
    if !opts.color {
        colored::control::set_override(false);
    }

    let config = load_config(path, config_path)?;
    let top_n = opts.top.unwrap_or(config.report.top_n);
    let pipeline = AuditPipeline::new(extractors(&config), config)
        .context("failed to build audit pipeline")?;
    let (run, findings) = pipeline.audit(path);

    let report = match opts.format {
        OutputFormat::Text => text::format_report(
            &findings,
            &TextOptions {
                color: opts.color,
                top_n,
            },
        ),
        OutputFormat::Markdown => markdown::format_report(&findings, top_n),
        OutputFormat::Json => json::format_findings(&findings, false)?,
    };
    print!("{report}");

    if opts.write {
        let output = &pipeline.config().output;
        let dir = opts.out_dir.unwrap_or_else(|| path.join(&output.dir));
        let written = write_reports(&findings, &run.metrics, output, &dir, top_n)?;
        eprintln!("Wrote {} report file(s) to {}", written.len(), dir.display());
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE} with default configuration.");
    Ok(())
}

fn load_config(project_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => Ok(Config::load_or_default(project_path)),
    }
}

fn extractors(config: &Config) -> Vec<Box<dyn AssetExtractor>> {
    vec![
        Box::new(HtmlExtractor::new(
            &config.html,
            config.thresholds.max_token_len,
        )),
        Box::new(CssExtractor::new(&config.thresholds)),
        Box::new(JsExtractor::new(&config.thresholds)),
    ]
}
