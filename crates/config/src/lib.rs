//! Betterstack exporter configuration
use chrono::NaiveDate;
use clap::Parser;
use url::Url;

/// Default Betterstack Uptime API origin.
pub const DEFAULT_BASE_URL: &str = "https://uptime.betterstack.com";

/// Calendar date format accepted by the date filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| format!("expected a YYYY-MM-DD date, got {value:?} ({e})"))
}

/// Betterstack API connection options
#[derive(Debug, Clone, Parser)]
pub struct BetterstackOpts {
    /// Betterstack API key
    #[clap(long, env = "BETTERSTACK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Betterstack API base URL
    #[clap(long, env = "BETTERSTACK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,
    /// Per-request timeout in seconds
    #[clap(long, env = "BETTERSTACK_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,
}

/// Incident filter options
#[derive(Debug, Clone, Parser)]
pub struct FilterOpts {
    /// Fetch incidents starting from this date (YYYY-MM-DD)
    #[clap(long, value_parser = parse_date)]
    pub from_date: NaiveDate,
    /// Fetch incidents until this date (YYYY-MM-DD)
    #[clap(long, value_parser = parse_date)]
    pub to_date: Option<NaiveDate>,
    /// Filter by monitor ID
    #[clap(long)]
    pub monitor_id: Option<u64>,
    /// Filter by heartbeat ID
    #[clap(long)]
    pub heartbeat_id: Option<u64>,
    /// Number of incidents per page
    #[clap(long, default_value = "50", value_parser = clap::value_parser!(u32).range(1..))]
    pub per_page: u32,
}

/// Retry options for transient remote failures
#[derive(Debug, Clone, Parser)]
pub struct RetryOpts {
    /// Maximum number of retries for transient failures (0 disables retrying)
    #[clap(long, env = "BETTERSTACK_MAX_RETRIES", default_value = "0")]
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds, doubled on every attempt
    #[clap(long, env = "BETTERSTACK_RETRY_BACKOFF_MS", default_value = "500")]
    pub retry_backoff_ms: u64,
}

/// CLI options for the Betterstack incident exporter
#[derive(Debug, Clone, Parser)]
#[clap(
    name = "betterstack",
    version,
    about = "Fetch all incidents from Betterstack's Incidents API, output as JSON array."
)]
pub struct Opts {
    /// Betterstack API connection
    #[clap(flatten)]
    pub betterstack: BetterstackOpts,

    /// Incident filters
    #[clap(flatten)]
    pub filter: FilterOpts,

    /// Retry configuration
    #[clap(flatten)]
    pub retry: RetryOpts,
}
