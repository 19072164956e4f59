use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use relay_adapter::logging::init_tracing;
use relay_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    let outcome = match cli.read_request() {
        Ok(input) => cli.run(&input).await,
        Err(err) => Err(err),
    };

    let mut stdout = std::io::stdout().lock();
    let code = match outcome {
        Ok(report) => {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            ExitCode::SUCCESS
        }
        Err(err) => {
            let response = err.to_response();
            tracing::warn!(status = response.status, error = %err, "Truncation failed");
            serde_json::to_writer_pretty(&mut stdout, &response)?;
            ExitCode::FAILURE
        }
    };
    writeln!(stdout)?;

    Ok(code)
}
