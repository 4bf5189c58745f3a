//! Custody operator CLI.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use custody_ledger::{init_logging, CustodyConfig, LedgerService, LogFormat};
use custody_store::UsedDepositAddressStore;
use custody_store_sqlite::SqliteLedgerStore;

#[derive(Parser)]
#[command(name = "custody", about = "Bridge custody ledger operator tool")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, env = "CUSTODY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the config file value.
    #[arg(long, env = "CUSTODY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Override the primary store path from the config file.
    #[arg(long, env = "CUSTODY_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Open both stores, resolve the node identity and report row counts.
    Check,

    /// Print withdrawals still awaiting approval as JSON.
    Unapproved,

    /// Write an SQL dump of the primary store.
    Dump {
        /// Output file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the primary store with the contents of an SQL script.
    Reset {
        #[arg(long)]
        sql: PathBuf,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<CustodyConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            CustodyConfig::from_toml_file(&path)
                .with_context(|| format!("failed to load config from {path}"))?
        }
        None => CustodyConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(db) = &cli.db {
        config.primary.path = db.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(LogFormat::parse(&config.log_format), &config.log_level);

    match cli.command {
        Command::Check => {
            let service = LedgerService::<SqliteLedgerStore>::open(&config).await?;
            let identity = service.mirror().identity().await;
            let connected = service.mirror().is_connected().await;
            let used = service.store().used_deposit_address_count()?;
            let bindings = service.get_mint_deposit_addresses(None)?.len();
            let withdrawals = service.get_withdrawals()?.len();
            let unapproved = service.get_unapproved_withdrawals()?.len();

            match &identity {
                Some(identity) => tracing::info!(
                    node_id = %identity.node_id,
                    network = %identity.network,
                    "node identity resolved"
                ),
                None => tracing::warn!(
                    cert_path = %config.identity.cert_path,
                    "node identity unresolved, audit entries go to the fallback log"
                ),
            }
            if !connected {
                tracing::warn!(
                    fallback = %config.audit.fallback_log.display(),
                    "audit store unreachable"
                );
            }

            let report = serde_json::json!({
                "primary": config.primary.path.display().to_string(),
                "auditConnected": connected,
                "identity": identity,
                "usedDepositAddresses": used,
                "mintDepositAddresses": bindings,
                "withdrawals": withdrawals,
                "unapprovedWithdrawals": unapproved,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            service.close().await;
        }
        Command::Unapproved => {
            let service = LedgerService::<SqliteLedgerStore>::open(&config).await?;
            let unapproved = service.get_unapproved_withdrawals()?;
            println!("{}", serde_json::to_string_pretty(&unapproved)?);
            service.close().await;
        }
        Command::Dump { output } => {
            let sql = custody_store_sqlite::dump(&config.primary.path)
                .with_context(|| format!("failed to dump {}", config.primary.path.display()))?;
            match output {
                Some(path) => {
                    std::fs::write(&path, sql)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(output = %path.display(), "primary store dumped");
                }
                None => print!("{sql}"),
            }
        }
        Command::Reset { sql } => {
            let script = std::fs::read_to_string(&sql)
                .with_context(|| format!("failed to read {}", sql.display()))?;
            custody_store_sqlite::reset(&config.primary.path, &script)
                .with_context(|| format!("failed to reset {}", config.primary.path.display()))?;
            tracing::info!(
                path = %config.primary.path.display(),
                script = %sql.display(),
                "primary store reset"
            );
        }
    }

    Ok(())
}
