//! Incident listing filters.
use chrono::NaiveDate;
use url::Url;

use crate::error::FetchError;

/// Default number of incidents requested per page.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Path of the incidents listing, relative to the API origin.
pub const INCIDENTS_PATH: &str = "api/v2/incidents";

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter for the incidents listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentQuery {
    from: NaiveDate,
    to: Option<NaiveDate>,
    monitor_id: Option<u64>,
    heartbeat_id: Option<u64>,
    per_page: u32,
}

impl IncidentQuery {
    /// Incidents starting on or after `from`.
    pub const fn new(from: NaiveDate) -> Self {
        Self { from, to: None, monitor_id: None, heartbeat_id: None, per_page: DEFAULT_PER_PAGE }
    }

    /// Only include incidents up to `to`.
    pub const fn to(mut self, to: Option<NaiveDate>) -> Self {
        self.to = to;
        self
    }

    /// Only include incidents of this monitor.
    pub const fn monitor_id(mut self, id: Option<u64>) -> Self {
        self.monitor_id = id;
        self
    }

    /// Only include incidents of this heartbeat.
    pub const fn heartbeat_id(mut self, id: Option<u64>) -> Self {
        self.heartbeat_id = id;
        self
    }

    /// Page size requested from the service.
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Lower date bound.
    pub const fn from_date(&self) -> NaiveDate {
        self.from
    }

    /// Check the filter before any request is made.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.per_page == 0 {
            return Err(FetchError::InvalidArgument("per_page must be at least 1".to_owned()));
        }
        if let Some(to) = self.to {
            if to < self.from {
                return Err(FetchError::InvalidArgument(format!(
                    "to date {to} is before from date {}",
                    self.from
                )));
            }
        }
        Ok(())
    }

    /// URL of the first page for this filter under `base`.
    pub fn first_page_url(&self, base: &Url) -> Result<Url, FetchError> {
        let mut url = incidents_endpoint(base)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", "1");
            pairs.append_pair("per_page", &self.per_page.to_string());
            pairs.append_pair("from", &self.from.format(QUERY_DATE_FORMAT).to_string());
            if let Some(to) = self.to {
                pairs.append_pair("to", &to.format(QUERY_DATE_FORMAT).to_string());
            }
            if let Some(id) = self.monitor_id {
                pairs.append_pair("monitor_id", &id.to_string());
            }
            if let Some(id) = self.heartbeat_id {
                pairs.append_pair("heartbeat_id", &id.to_string());
            }
        }
        Ok(url)
    }
}

/// Resolve the incidents endpoint under `base`, keeping any path prefix it carries.
fn incidents_endpoint(base: &Url) -> Result<Url, FetchError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(INCIDENTS_PATH)
        .map_err(|e| FetchError::InvalidArgument(format!("invalid base URL {base}: {e}")))
}
