//! Default command: record charging telemetry until interrupted.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chargelog_core::{ConnectConnector, Poller};

use crate::cli::{GlobalOpts, RunOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(global: &GlobalOpts, run: &RunOpts) -> Result<(), CliError> {
    let (mut cfg, path) = config::load(global)?;
    debug!(path = %path.display(), exists = path.is_file(), "config resolved");
    config::apply_overrides(&mut cfg, run);

    let poller_config = config::build_poller_config(&cfg, run)?;

    if !global.quiet {
        output::print_startup(&cfg, output::should_color(&global.color));
    }
    if let Some(ref csv) = poller_config.csv {
        std::fs::create_dir_all(&csv.folder)?;
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, stopping after the current step");
                on_interrupt.cancel();
            }
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    let connector = ConnectConnector::new(poller_config.connect.clone());
    let poller = Poller::new(poller_config, connector, cancel)?;
    let summary = poller.run().await?;

    info!(
        epochs = summary.epochs,
        ticks = summary.ticks,
        records = summary.records,
        "stopped"
    );
    Ok(())
}
