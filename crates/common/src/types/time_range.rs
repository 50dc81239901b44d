use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional `[since, until]` window forwarded to the observability backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Parse RFC 3339 bounds as supplied in tool arguments.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self, String> {
        let since = since
            .map(|s| parse_rfc3339(s).map_err(|e| format!("Invalid since: {}", e)))
            .transpose()?;
        let until = until
            .map(|s| parse_rfc3339(s).map_err(|e| format!("Invalid until: {}", e)))
            .transpose()?;

        if let (Some(since), Some(until)) = (since, until) {
            if since > until {
                return Err("since must not be after until".into());
            }
        }

        Ok(Self { since, until })
    }
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
