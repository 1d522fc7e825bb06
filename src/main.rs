use clap::Parser;
use miette::{IntoDiagnostic, Result};
use order_payments::domain::ports::SharedPaymentStore;
use order_payments::infrastructure::in_memory::InMemoryPaymentStore;
#[cfg(feature = "storage-rocksdb")]
use order_payments::infrastructure::rocksdb::RocksDBPaymentStore;
use order_payments::interfaces::api::{PaymentController, STATUS_OK};
use order_payments::interfaces::csv::request_reader::PaymentRequestReader;
use order_payments::interfaces::seed::SeedData;
use order_payments::telemetry;
use serde_json::json;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payment requests CSV file (`order, user` columns)
    input: PathBuf,

    /// JSON file with users and orders to load before processing.
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, env = "ORDER_PAYMENTS_LOG_JSON")]
    log_json: bool,
}

fn open_store(db_path: Option<PathBuf>) -> Result<SharedPaymentStore> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBPaymentStore::open(path)?;
            info!("using RocksDB storage");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryPaymentStore::new()))
        }
        None => Ok(Arc::new(InMemoryPaymentStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    let store = open_store(cli.db_path)?;

    if let Some(seed_path) = cli.seed {
        let file = File::open(seed_path).into_diagnostic()?;
        SeedData::from_reader(file)?.load_into(store.as_ref()).await?;
    }

    let controller = PaymentController::new(store);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = PaymentRequestReader::new(file);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let (mut paid, mut rejected) = (0usize, 0usize);

    for request in reader.requests() {
        match request {
            Ok(record) => {
                let response = controller.pay(record.order, &record.body()).await;
                if response.status == STATUS_OK {
                    paid += 1;
                } else {
                    rejected += 1;
                }
                let line = json!({
                    "order_id": record.order,
                    "status": response.status,
                    "body": response.body,
                });
                serde_json::to_writer(&mut out, &line).into_diagnostic()?;
                writeln!(out).into_diagnostic()?;
            }
            Err(e) => {
                error!(error = %e, "Error reading payment request");
            }
        }
    }

    info!(paid, rejected, "batch finished");
    Ok(())
}
