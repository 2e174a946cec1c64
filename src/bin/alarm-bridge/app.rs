use std::path::{Path, PathBuf};

use alarm_bridge::Result;
use alarm_bridge::bridge::{AlarmBridge, RunReport};
use alarm_bridge::config::Config;
use alarm_bridge::event::AlarmEvent;
use alarm_bridge::swis::SwisClient;
use alarm_bridge::telemetry::init_tracing;
use tracing::{error, info};

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "alarm-bridge.toml";

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let log_file = startup_log_file(&cli, &config_path);
    let _guard = init_tracing(
        cli.log_filter.as_deref(),
        cli.json_logs,
        log_file.as_deref(),
    )?;

    info!(config = %config_path.display(), "alarm bridge start");
    let mut config = Config::from_env_and_file(&config_path).inspect_err(|err| {
        error!(error = %err, config = %config_path.display(), "invalid configuration");
    })?;
    apply_cli_overrides(&mut config, &cli);

    let event = AlarmEvent::from_env();

    match handle_alarm(&config, &event).await {
        Ok(report) => {
            info!(
                uri = %report.node_uri,
                actions = ?report.actions,
                suppressed = report.after.is_suppressed(),
                "alarm bridge finished"
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, target = %event.target_name, "alarm bridge failed");
            Err(err)
        }
    }
}

/// `--log-file` first, then the environment and the config file. Resolved
/// before validation so configuration errors land in the log file too.
fn startup_log_file(cli: &Cli, config_path: &Path) -> Option<PathBuf> {
    cli.log_file
        .clone()
        .or_else(|| Config::log_file_from_env_and_file(config_path))
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
    if cli.accept_invalid_certs {
        config.http.accept_invalid_certs = true;
    }
    if cli.dry_run {
        config.dry_run = true;
    }
}

pub(super) async fn handle_alarm(config: &Config, event: &AlarmEvent) -> Result<RunReport> {
    let client = SwisClient::new(
        config.base_url.clone(),
        config.credentials.clone(),
        &config.http,
    )?;
    AlarmBridge::new(client)
        .with_dry_run(config.dry_run)
        .run(event)
        .await
}
