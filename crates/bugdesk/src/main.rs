mod output;
mod telemetry;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bugdesk_core::config::Config;
use bugdesk_core::repository::ReportRepository;
use bugdesk_intake::Intake;
use bugdesk_intake::notify::ConfiguredNotifier;
use bugdesk_store::Store;
use clap::{Parser, Subcommand};

use crate::output::{print_report_human, print_reports_human, print_summary_human};
use crate::telemetry::{
    LogFormat, TelemetryConfig, init_cli_tracing, init_run_tracing, shutdown_tracing,
};

#[derive(Parser, Debug)]
#[command(name = "bugdesk")]
#[command(about = "Bug report intake with log-based deduplication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[arg(long, global = true)]
    table: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the intake server")]
    Run {
        #[arg(long)]
        listen_addr: Option<String>,
        #[arg(long, help = "none, smtp or webhook")]
        notify_mode: Option<String>,
    },
    #[command(about = "Print a single report")]
    Show { id: i64 },
    #[command(about = "List recently touched reports")]
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    #[command(about = "Set the triage status of a report (4 = resolved)")]
    SetStatus {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        status: i32,
    },
    #[command(about = "Show database totals")]
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load().context("load config")?;
    if let Some(v) = cli.db_path {
        cfg.db_path = v;
    }
    if let Some(v) = cli.table {
        cfg.table_name = v;
    }

    match cli.command {
        Commands::Run {
            listen_addr,
            notify_mode,
        } => {
            if let Some(v) = listen_addr {
                cfg.listen_addr = v;
            }
            if let Some(v) = notify_mode {
                cfg.notify_mode = bugdesk_core::config::NotifyMode::parse(&v)?;
            }
            cfg.validate()?;
            run_server(
                cfg,
                TelemetryConfig {
                    format: LogFormat::from_env(),
                },
            )
            .await
        }
        Commands::Show { id } => {
            init_cli_tracing();
            let store = open_store(&cfg)?;
            let Some(report) = store.get_report(id)? else {
                anyhow::bail!("no bug report with id {id}");
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report_human(&report);
            }
            Ok(())
        }
        Commands::List { limit } => {
            init_cli_tracing();
            let store = open_store(&cfg)?;
            let reports = store.recent_reports(limit)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                print_reports_human(&reports);
            }
            Ok(())
        }
        Commands::SetStatus { id, status } => {
            init_cli_tracing();
            let store = open_store(&cfg)?;
            if !store.set_status(id, status)? {
                anyhow::bail!("no bug report with id {id}");
            }
            tracing::info!(id, status, "status updated");
            Ok(())
        }
        Commands::Status => {
            init_cli_tracing();
            let store = open_store(&cfg)?;
            let summary = store.summary()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary_human(&summary);
            }
            Ok(())
        }
    }
}

fn open_store(cfg: &Config) -> anyhow::Result<Store> {
    Store::open(&cfg.db_path, &cfg.table_name)
        .with_context(|| format!("open store at {}", cfg.db_path.display()))
}

async fn run_server(cfg: Config, telemetry_cfg: TelemetryConfig) -> anyhow::Result<()> {
    init_run_tracing(telemetry_cfg);

    let store = open_store(&cfg)?;
    let notifier = ConfiguredNotifier::from_config(&cfg).context("build notifier")?;
    let addr: SocketAddr = cfg
        .listen_addr
        .parse()
        .with_context(|| format!("parse listen addr {}", cfg.listen_addr))?;

    eprintln!("bugdesk run");
    eprintln!("  db: {} (table {})", cfg.db_path.display(), cfg.table_name);
    eprintln!("  listen: http://{addr}/submit");
    eprintln!("  notify: {}", notifier.describe());

    let intake = Arc::new(Intake::new(store, notifier, cfg));
    let server_task = tokio::spawn(bugdesk_intake::server::run_intake_server(intake, addr));

    tokio::select! {
        res = server_task => {
            res??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    shutdown_tracing();
    Ok(())
}
