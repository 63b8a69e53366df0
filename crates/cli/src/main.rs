//! Binary entry point: run the reconciliation once, exit 0 on success.

use tracing::{error, info};

use ordertally_cli::run::{self, RunConfig};

#[tokio::main]
async fn main() {
    ordertally_observability::init();

    let config = RunConfig::from_env();
    info!(
        data_dir = %config.data_dir.display(),
        db = %config.db_path.display(),
        report = %config.report_path.display(),
        "starting reconciliation run"
    );

    match run::execute(&config).await {
        Ok(outcome) => {
            info!(
                orders = outcome.orders,
                rows = outcome.rows_written,
                "run complete"
            );
        }
        Err(err) => {
            error!("run failed: {err:#}");
            std::process::exit(1);
        }
    }
}
