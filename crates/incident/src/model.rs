//! Incident records as served by the Betterstack Uptime API.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of an incident.
///
/// Unknown states are kept verbatim so they are emitted unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncidentStatus {
    /// Incident is ongoing and unacknowledged.
    Started,
    /// A responder acknowledged the incident.
    Acknowledged,
    /// Incident is resolved.
    Resolved,
    /// Any state this crate does not model.
    Other(String),
}

impl IncidentStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "Started",
            Self::Acknowledged => "Acknowledged",
            Self::Resolved => "Resolved",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for IncidentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Started" => Self::Started,
            "Acknowledged" => Self::Acknowledged,
            "Resolved" => Self::Resolved,
            _ => Self::Other(s),
        }
    }
}

impl From<IncidentStatus> for String {
    fn from(status: IncidentStatus) -> Self {
        match status {
            IncidentStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

/// Attributes of an incident.
///
/// Only `status` is typed strictly; the other modelled attributes accept any JSON
/// value so an unexpected shape is passed through instead of failing the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentAttributes {
    /// Incident title
    #[serde(default)]
    pub name: Option<Value>,
    /// Current lifecycle state
    pub status: IncidentStatus,
    /// When the incident began
    #[serde(default)]
    pub started_at: Option<Value>,
    /// When the incident was acknowledged
    #[serde(default)]
    pub acknowledged_at: Option<Value>,
    /// Who acknowledged the incident
    #[serde(default)]
    pub acknowledged_by: Option<Value>,
    /// Remaining attributes, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single incident resource.
///
/// `id`, `type`, `relationships` and any other top-level member are kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Incident attributes
    pub attributes: IncidentAttributes,
    /// Remaining top-level members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Incident {
    /// Parsed start time, if present and RFC 3339.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.attributes.started_at.as_ref())
    }

    /// Parsed acknowledgment time, if present and RFC 3339.
    pub fn acknowledged_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.attributes.acknowledged_at.as_ref())
    }

    /// Whether the incident has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.attributes.status == IncidentStatus::Resolved
    }
}

fn parse_timestamp(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    raw.and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Links returned alongside each page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// First page
    #[serde(default)]
    pub first: Option<String>,
    /// Last page
    #[serde(default)]
    pub last: Option<String>,
    /// Previous page
    #[serde(default)]
    pub prev: Option<String>,
    /// Next page, absent on the last page
    #[serde(default)]
    pub next: Option<String>,
}

/// One page of the incidents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct IncidentPage {
    /// Incidents on this page
    #[serde(default)]
    pub data: Vec<Incident>,
    /// Pagination links
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl IncidentPage {
    /// Link to the next page, ignoring empty strings.
    pub fn next_link(&self) -> Option<&str> {
        self.pagination.as_ref().and_then(|p| p.next.as_deref()).filter(|l| !l.is_empty())
    }
}
