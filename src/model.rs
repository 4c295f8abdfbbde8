use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// One fetch-and-process unit targeting a specific upstream endpoint.
/// The priority field is carried for future scheduling but never reorders
/// the queue; iteration order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub endpoint: &'static str,
    pub priority: u8,
}

/// Record kind an upstream response maps to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecordKind {
    Competition,
    Standing,
    Match,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Competition => "competition",
            RecordKind::Standing => "standing",
            RecordKind::Match => "match",
        }
    }
}

/// Competition info payload as served by the upstream API.
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitionPayload {
    pub name: String,
    pub area: Area,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    pub name: String,
}

/// Standings payload. A missing `standings` path is an empty list, not an
/// error.
#[derive(Debug, Clone, Deserialize)]
pub struct StandingsPayload {
    #[serde(default)]
    pub standings: Vec<StandingTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingTable {
    #[serde(default)]
    pub table: Vec<TableRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub position: i64,
    pub team: TeamRef,
    pub points: i64,
    pub played_games: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchesPayload {
    #[serde(default)]
    pub matches: Vec<MatchRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub id: i64,
    pub status: String,
    pub utc_date: DateTime<Utc>,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    #[serde(default)]
    pub score: Score,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    #[serde(default)]
    pub full_time: FullTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FullTime {
    pub home: Option<i64>,
    pub away: Option<i64>,
}

/// Competition document. Created once per code, never updated.
#[derive(Debug, Clone, Serialize)]
pub struct CompetitionRecord {
    pub code: String,
    pub name: String,
    pub area_name: String,
}

/// Standing document. Appended on every run; no natural key.
#[derive(Debug, Clone, Serialize)]
pub struct StandingRecord {
    pub competition_code: String,
    pub position: i64,
    pub team_name: String,
    pub points: i64,
    pub played_games: i64,
}

/// Match document. `doc_id` repeats the store document id inside the body.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub doc_id: String,
    pub match_id: i64,
    pub competition_code: String,
    pub home_team_name: String,
    pub away_team_name: String,
    pub score_home: Option<i64>,
    pub score_away: Option<i64>,
    pub status: String,
    pub utc_date: DateTime<Utc>,
}

/// Outcome of a single task, collected into the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed {
        endpoint: &'static str,
        records_written: usize,
    },
    Failed {
        endpoint: &'static str,
        error: String,
    },
}

/// Log sink for one invocation. Lines go to the tracing subscriber and are
/// accumulated so the run summary can carry them.
#[derive(Debug, Default)]
pub struct RunLog {
    entries: Vec<String>,
}

impl RunLog {
    pub fn info(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        info!("{msg}");
        self.entries.push(msg);
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        error!("{msg}");
        self.entries.push(format!("ERROR: {msg}"));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// JSON-serializable result of one invocation.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunSummary {
    Success {
        logs: Vec<String>,
        requests_made: u32,
    },
    Error {
        message: String,
        logs: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_summary_shape() {
        let summary = RunSummary::Success {
            logs: vec!["a".into(), "b".into()],
            requests_made: 4,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({ "status": "success", "logs": ["a", "b"], "requests_made": 4 })
        );
    }

    #[test]
    fn error_summary_shape() {
        let summary = RunSummary::Error {
            message: "boom".into(),
            logs: vec![],
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({ "status": "error", "message": "boom", "logs": [] })
        );
    }

    #[test]
    fn run_log_tags_errors() {
        let mut log = RunLog::default();
        log.info("fetching");
        log.error("it broke");
        assert_eq!(log.entries(), ["fetching", "ERROR: it broke"]);
    }

    #[test]
    fn standings_payload_tolerates_missing_path() {
        let payload: StandingsPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.standings.is_empty());
    }

    #[test]
    fn match_row_parses_nullable_scores() {
        let row: MatchRow = serde_json::from_value(json!({
            "id": 427123,
            "status": "SCHEDULED",
            "utcDate": "2026-08-15T14:00:00Z",
            "homeTeam": { "name": "Arsenal FC" },
            "awayTeam": { "name": "Everton FC" },
            "score": { "fullTime": { "home": null, "away": null } }
        }))
        .unwrap();
        assert_eq!(row.id, 427123);
        assert_eq!(row.score.full_time.home, None);
    }
}
