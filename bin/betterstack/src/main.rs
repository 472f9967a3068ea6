//! Entrypoint.

use std::{
    ffi::OsString,
    io::{self, Write},
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, error::ErrorKind};
use config::Opts;
use dotenvy::dotenv;
use incident::{Client, FetchError, IncidentQuery, RetryPolicy, write_incidents};
use tracing::debug;
use tracing_subscriber::filter::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        if let Err(e) = dotenvy::from_filename(&custom_env_file) {
            eprintln!("Error: failed to load {custom_env_file}: {e}");
            return ExitCode::FAILURE;
        }
    } else {
        // Try the default .env file, and ignore if it doesn't exist.
        dotenv().ok();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    ExitCode::from(execute(std::env::args_os(), io::stdout()).await)
}

/// Parse `args`, export incidents to `out` and return the process exit code.
async fn execute<I, T, W>(args: I, out: W) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let opts = match Opts::try_parse_from(args) {
        Ok(opts) => opts,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            // Help and version go to stdout.
            return if e.print().is_ok() { 0 } else { 1 };
        }
        Err(e) => return report(&FetchError::InvalidArgument(clap_message(&e)).into()),
    };

    match run(opts, out).await {
        Ok(()) => 0,
        Err(e) => report(&e),
    }
}

/// Fetch every incident and write them to `out` as one JSON array.
async fn run<W: Write>(opts: Opts, out: W) -> eyre::Result<()> {
    let query = IncidentQuery::new(opts.filter.from_date)
        .to(opts.filter.to_date)
        .monitor_id(opts.filter.monitor_id)
        .heartbeat_id(opts.filter.heartbeat_id)
        .per_page(opts.filter.per_page);
    // Argument errors take precedence over a missing API key.
    query.validate()?;

    let api_key = opts.betterstack.api_key.unwrap_or_default();
    let retry =
        RetryPolicy::new(opts.retry.max_retries, Duration::from_millis(opts.retry.retry_backoff_ms));
    let client = Client::with_timeout(
        api_key,
        opts.betterstack.base_url,
        Duration::from_secs(opts.betterstack.timeout_secs),
    )?
    .with_retry(retry);

    debug!(?query, ?retry, "fetching incidents");
    let incidents = client.incidents(&query).await?;
    write_incidents(out, &incidents)?;
    Ok(())
}

/// Clap's rendered error without its own `error: ` prefix.
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered.trim_start_matches("error: ").trim_end().to_owned()
}

/// Print the failure to stderr and pick the exit code for its kind.
fn report(err: &eyre::Report) -> u8 {
    let code = err.downcast_ref::<FetchError>().map_or(1, FetchError::exit_code);
    eprintln!("Error: {err:#}");
    code
}
