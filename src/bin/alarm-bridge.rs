#[path = "alarm-bridge/app.rs"]
mod app;
#[path = "alarm-bridge/cli.rs"]
mod cli;

use std::error::Error as StdError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = cli::Cli::parse_args();
    match app::run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            std::process::ExitCode::from(1)
        }
    }
}

fn report_error(err: &alarm_bridge::error::Error) {
    eprintln!("Error: {err}");
    let mut source: Option<&dyn StdError> = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
