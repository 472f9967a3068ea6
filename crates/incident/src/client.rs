use std::{collections::HashSet, time::Duration};

use reqwest::{Client as HttpClient, StatusCode, header::ACCEPT};
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{FetchError, RemoteError},
    model::{Incident, IncidentPage},
    query::IncidentQuery,
    retry::{RetryPolicy, retry_op},
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Betterstack Uptime incidents API.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    api_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl Client {
    /// Create a new Betterstack API client.
    pub fn new(api_key: String, base_url: Url) -> Result<Self, FetchError> {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new client whose requests time out after `timeout`.
    pub fn with_timeout(
        api_key: String,
        base_url: Url,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        if api_key.trim().is_empty() {
            return Err(FetchError::Authentication {
                status: None,
                message: "no API key provided (use --api-key or set BETTERSTACK_API_KEY)"
                    .to_owned(),
            });
        }
        let http = HttpClient::builder().timeout(timeout).build().map_err(RemoteError::Client)?;
        Ok(Self { http, api_key, base_url, retry: RetryPolicy::default() })
    }

    /// Retry transient failures under `policy`.
    pub const fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Authenticate the request.
    fn auth(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        rb.bearer_auth(&self.api_key)
    }

    /// Fetch a single page from an absolute URL.
    pub async fn fetch_page(&self, url: &Url) -> Result<IncidentPage, FetchError> {
        retry_op(self.retry, || self.get_page(url)).await
    }

    async fn get_page(&self, url: &Url) -> Result<IncidentPage, FetchError> {
        let transport = |source| RemoteError::Transport { url: url.clone(), source };

        let resp = self
            .auth(self.http.get(url.clone()))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Authentication {
                status: Some(status),
                message: format!("{url} responded with {status}"),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status { url: url.clone(), status, body }.into());
        }

        let bytes = resp.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes)
            .map_err(|source| RemoteError::Decode { url: url.clone(), source }.into())
    }

    /// Fetch every incident matching `query`, following pagination links until exhausted.
    ///
    /// Records are returned in the order the service sent them. Nothing is returned
    /// unless every page was fetched.
    pub async fn incidents(&self, query: &IncidentQuery) -> Result<Vec<Incident>, FetchError> {
        query.validate()?;

        let mut next = Some(query.first_page_url(&self.base_url)?);
        let mut visited = HashSet::new();
        let mut incidents = Vec::new();

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(RemoteError::PaginationLoop(url).into());
            }

            let page = self.fetch_page(&url).await?;
            debug!(
                page = visited.len(),
                url = %url,
                count = page.data.len(),
                "fetched incidents page"
            );

            next = page
                .next_link()
                .map(|link| {
                    Url::parse(link).map_err(|source| RemoteError::InvalidLink {
                        link: link.to_owned(),
                        source,
                    })
                })
                .transpose()?;
            incidents.extend(page.data);
        }

        let unresolved = incidents.iter().filter(|i| !i.is_resolved()).count();
        let acknowledged = incidents.iter().filter(|i| i.acknowledged_at().is_some()).count();
        let earliest = incidents.iter().filter_map(Incident::started_at).min();
        info!(
            from = %query.from_date(),
            pages = visited.len(),
            incidents = incidents.len(),
            unresolved,
            acknowledged,
            earliest_start = ?earliest,
            "fetched incidents"
        );
        Ok(incidents)
    }
}
