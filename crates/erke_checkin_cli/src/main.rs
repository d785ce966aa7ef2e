//! erke-checkin CLI: run, check, sign.

use clap::{Parser, Subcommand};
use erke_checkin::config::{mask, DEFAULT_CONFIG_PATH};
use erke_checkin::sign::{DEFAULT_APPID, RANDOM_MAX};
use erke_checkin::{
    run_accounts, Config, DemogicSigner, GicClient, Notifier, RequestSigner, RunSummary,
    SignParams,
};
use erke_checkin_report::{account_line, notification, summary_text, write_summary_json};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

const EXIT_OK: i32 = 0;
const EXIT_ACCOUNT_FAILED: i32 = 1;
const EXIT_CONFIG: i32 = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    let code = match cli.command {
        Command::Run(args) => run_checkin(args)?,
        Command::Check(args) => run_check(args)?,
        Command::Sign(args) => run_sign(args)?,
    };
    if code != EXIT_OK {
        std::process::exit(code);
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "erke-checkin")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "Daily check-in and points ledger query for the Erke member mini-program")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Query points and sign in for every configured account.
    Run(RunArgs),
    /// Validate the config file without touching the network.
    Check(CheckArgs),
    /// Print the signature fields for the given parameters.
    Sign(SignArgs),
}

#[derive(Parser)]
struct RunArgs {
    #[arg(long, env = "ERKE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Skip the push notification even if one is configured.
    #[arg(long)]
    no_notify: bool,
    /// Also write the run summary as JSON to this path.
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    #[arg(long, env = "ERKE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Parser)]
struct SignArgs {
    #[arg(long)]
    member_id: String,
    #[arg(long, default_value = DEFAULT_APPID)]
    appid: String,
    /// GMT+8 `YYYY-MM-DD HH:MM:SS`; defaults to now.
    #[arg(long)]
    timestamp: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(RANDOM_MAX)))]
    random: Option<u32>,
}

/// Load config, or report the failure and hand back the config exit code.
fn load_config(path: &Path) -> Result<Config, i32> {
    match Config::load(path) {
        Ok(config) => {
            info!(path = %path.display(), accounts = config.accounts.len(), "config loaded");
            Ok(config)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "config error");
            eprintln!("配置错误: {}", e);
            Err(EXIT_CONFIG)
        }
    }
}

fn exit_code(summary: &RunSummary) -> i32 {
    if summary.all_succeeded() {
        EXIT_OK
    } else {
        EXIT_ACCOUNT_FAILED
    }
}

fn run_checkin(args: RunArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Nothing touches the network until the config is valid.
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(code) => return Ok(code),
    };
    let client = GicClient::new(&config)?;
    let notifier = if args.no_notify {
        None
    } else {
        Some(Notifier::new(
            config.notify.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)
    };
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let total = config.accounts.len();
    let summary = rt.block_on(run_accounts(
        &config.accounts,
        config.page_size,
        |account| client.session(account),
        |outcome| println!("{}", account_line(outcome, total)),
    ));
    println!("{}", summary_text(&summary));

    if let Some(path) = &args.summary_json {
        match write_summary_json(&summary, path) {
            Ok(()) => info!(path = %path.display(), "summary written"),
            Err(e) => warn!(path = %path.display(), error = %e, "summary not written"),
        }
    }
    if let Some(notifier) = &notifier {
        rt.block_on(notifier.dispatch(&notification(&summary)));
    }
    Ok(exit_code(&summary))
}

fn run_check(args: CheckArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(code) => return Ok(code),
    };
    for (i, account) in config.accounts.iter().enumerate() {
        println!(
            "{}\t{}\t{}",
            i + 1,
            account.account_name,
            mask(&account.member_id)
        );
    }
    println!("OK\tnotify={}", config.notify.kind());
    Ok(EXIT_OK)
}

fn run_sign(args: SignArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let fresh = SignParams::fresh(&args.appid, &args.member_id)?;
    let params = SignParams::new(
        args.appid,
        args.member_id,
        args.timestamp.unwrap_or(fresh.timestamp),
        args.random.unwrap_or(fresh.random),
    );
    let signed = DemogicSigner.sign(&params);
    println!("{}", serde_json::to_string_pretty(&signed)?);
    Ok(EXIT_OK)
}
