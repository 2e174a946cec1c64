use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Mute or resume SolarWinds alerts for a host on vCenter DRS standby alarms",
    long_about = "Reads VMWARE_ALARM_NAME, VMWARE_ALARM_TARGET_NAME and \
                  VMWARE_ALARM_EVENTDESCRIPTION from the environment, looks the \
                  target up in Orion and suppresses or resumes its alerts."
)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append log lines to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Skip TLS certificate validation for the SWIS endpoint.
    #[arg(long, action = ArgAction::SetTrue)]
    pub accept_invalid_certs: bool,

    /// Classify and log only; never suppress or resume.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Emit JSON log lines (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "alarm_bridge=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn parses_flags() {
        let cli = match Cli::try_parse_from([
            "alarm-bridge",
            "--config",
            "/etc/alarm-bridge.toml",
            "--dry-run",
            "--accept-invalid-certs",
            "--log-file",
            "/var/log/alarm-bridge.log",
        ]) {
            Ok(cli) => cli,
            Err(err) => panic!("parse failed: {err}"),
        };
        assert!(cli.dry_run);
        assert!(cli.accept_invalid_certs);
        assert!(!cli.json_logs);
        assert_eq!(
            cli.log_file.as_deref(),
            Some(std::path::Path::new("/var/log/alarm-bridge.log"))
        );
    }
}
