use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use sitepulse::{
    config::ScannerConfig,
    content::RestRepository,
    rest,
    scan::{HealthReport, Prober, Scanner},
    AppContext,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "sitepulse",
    about = "SitePulse — content-site health probe service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Base URL of the site to scan, e.g. https://www.example.org
    #[arg(long, env = "SITEPULSE_SITE_URL")]
    site_url: Option<String>,

    /// Health endpoint port
    #[arg(long, env = "SITEPULSE_PORT")]
    port: Option<u16>,

    /// Bind address for the health endpoint (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "SITEPULSE_BIND")]
    bind_address: Option<String>,

    /// Path to the TOML config file (default: ./sitepulse.toml)
    #[arg(long, env = "SITEPULSE_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SITEPULSE_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "SITEPULSE_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the health endpoint server (default when no subcommand given).
    ///
    /// Examples:
    ///   sitepulse serve --site-url https://www.example.org
    ///   sitepulse
    Serve,
    /// Run a single scan pass and print the per-URL results.
    ///
    /// Exit code mirrors the verdict: 0 when every probe is valid, 1
    /// otherwise — usable directly from cron or CI.
    ///
    /// Examples:
    ///   sitepulse scan --site-url https://www.example.org
    ///   sitepulse scan --full --json
    Scan {
        /// Probe every item and term instead of one representative per group.
        #[arg(long)]
        full: bool,
        /// Print the report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Init once — must happen before any tracing calls.
    let log_level = args.log.as_deref().unwrap_or("info").to_owned();
    let log_format =
        std::env::var("SITEPULSE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let _file_guard = setup_logging(&log_level, args.log_file.as_deref(), &log_format);

    let config = Arc::new(
        ScannerConfig::new(
            args.site_url,
            args.port,
            args.bind_address,
            args.log,
            args.config,
        )
        .context("invalid configuration")?,
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.probe_timeout_secs))
        .user_agent(concat!("sitepulse/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let repository = Arc::new(RestRepository::new(
        config.site_url.clone(),
        client.clone(),
        config.page_states.clone(),
    ));
    let prober = Prober::new(client, config.site_url.clone(), config.auth_token.clone());
    let scanner = Scanner::new(prober, config.probe_concurrency);
    let ctx = Arc::new(AppContext::new(config, repository, scanner));

    match args.command {
        Some(Command::Scan { full, json }) => run_scan(&ctx, full, json).await,
        Some(Command::Serve) | None => rest::start_server(ctx).await,
    }
}

async fn run_scan(ctx: &AppContext, full: bool, json: bool) -> Result<()> {
    let report = ctx
        .scanner
        .run(
            ctx.repository.as_ref(),
            &ctx.config.page_state_names(),
            full,
        )
        .await
        .context("scan failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&ctx.config.site_url, &report);
    }

    std::process::exit(if report.has_error { 1 } else { 0 });
}

// ─── CLI report table ─────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn print_report(site_url: &str, report: &HealthReport) {
    println!();
    println!("{BOLD}sitepulse — {site_url}{RESET}");
    println!("{}", "─".repeat(72));

    for result in &report.results {
        let (symbol, color) = if result.valid {
            ("✓", GREEN)
        } else {
            ("✗", RED)
        };
        let mut detail = format!("{:>4}  {:>6}ms", result.code, result.response_time);
        if !result.valid {
            if result.empty {
                detail.push_str("  (empty body)");
            } else if !result.body {
                detail.push_str("  (no closing body tag)");
            }
        }
        println!(
            "  {color}{symbol}{RESET}  {:<26}  {:<30}  {detail}",
            result.label, result.url
        );
    }

    println!("{}", "─".repeat(72));

    let invalid = report.results.iter().filter(|r| !r.valid).count();
    if invalid == 0 {
        println!("{GREEN}All {} URLs healthy.{RESET}", report.results.len());
    } else {
        println!(
            "{RED}{invalid} of {} URLs unhealthy. See above for details.{RESET}",
            report.results.len()
        );
    }
    println!();
}

// ─── Logging ──────────────────────────────────────────────────────────────────

fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("sitepulse.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
