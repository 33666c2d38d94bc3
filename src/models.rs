use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of a single target. `Unknown` until its first probe completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unknown,
    Up,
    Down,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unknown => "unknown",
            Status::Up => "up",
            Status::Down => "down",
        };
        f.write_str(s)
    }
}

/// Result of one probe against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Up,
    Down(String),
}

impl ProbeOutcome {
    pub fn status(&self) -> Status {
        match self {
            ProbeOutcome::Up => Status::Up,
            ProbeOutcome::Down(_) => Status::Down,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub url: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedStatusResponse {
    pub total_pages: usize,
    pub current_page: u64,
    pub data: Vec<StatusEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let entry = StatusEntry { url: "a.com".into(), status: Status::Unknown };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"url":"a.com","status":"unknown"}"#
        );
    }

    #[test]
    fn envelope_uses_camel_case_keys() {
        let resp = PaginatedStatusResponse { total_pages: 0, current_page: 1, data: vec![] };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"totalPages":0,"currentPage":1,"data":[]}"#
        );
    }
}
