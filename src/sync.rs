//! The synchronization loop: a fixed task queue drained one target at a
//! time through a budget-gated fetch, with each response classified and
//! routed to the upsert procedure for its record kind.
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::instrument;

use crate::classify::{classify, Classified};
use crate::config::Collections;
use crate::model::{
    CompetitionPayload, CompetitionRecord, FetchTask, MatchRecord, MatchesPayload, RecordKind,
    RunLog, RunSummary, StandingRecord, StandingsPayload, TaskOutcome,
};
use crate::store::{unique_id, DocumentStore, Permission, Query};
use crate::upstream::FootballApi;

/// Only the first 10 rows of a standings table or matches list are stored.
const MAX_ROWS_PER_TASK: usize = 10;

const FINISHED_STATUS: &str = "FINISHED";

/// Fixed fetch plan: three competitions, each with info, standings and
/// finished matches. Iteration order is insertion order; the priority field
/// does not reorder.
static TASKS: [FetchTask; 9] = [
    FetchTask { endpoint: "/competitions/PL", priority: 1 },
    FetchTask { endpoint: "/competitions/PL/standings", priority: 2 },
    FetchTask { endpoint: "/competitions/PL/matches?status=FINISHED", priority: 3 },
    FetchTask { endpoint: "/competitions/PD", priority: 1 },
    FetchTask { endpoint: "/competitions/PD/standings", priority: 2 },
    FetchTask { endpoint: "/competitions/PD/matches?status=FINISHED", priority: 3 },
    FetchTask { endpoint: "/competitions/SA", priority: 1 },
    FetchTask { endpoint: "/competitions/SA/standings", priority: 2 },
    FetchTask { endpoint: "/competitions/SA/matches?status=FINISHED", priority: 3 },
];

pub fn task_queue() -> &'static [FetchTask] {
    &TASKS
}

/// Upstream call budget for one invocation. The counter moves only when a
/// response was actually obtained, so a transport failure does not consume
/// budget.
#[derive(Debug)]
pub struct RateLimiter {
    budget: u32,
    used: u32,
}

impl RateLimiter {
    pub fn new(budget: u32) -> Self {
        Self { budget, used: 0 }
    }

    pub fn allows(&self) -> bool {
        self.used < self.budget
    }

    pub fn record(&mut self) {
        self.used += 1;
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}

/// Run the full task queue once. Per-task failures are recorded in the log
/// and never abort the loop; once this function is entered the run always
/// reports success.
#[instrument(skip_all)]
pub async fn run_sync(
    collections: &Collections,
    upstream: &dyn FootballApi,
    store: &dyn DocumentStore,
    budget: u32,
    mut log: RunLog,
) -> RunSummary {
    let mut limiter = RateLimiter::new(budget);
    let mut outcomes: Vec<TaskOutcome> = Vec::new();

    log.info(format!(
        "starting sync run: {} tasks, request budget {}",
        task_queue().len(),
        budget
    ));

    for task in task_queue() {
        if !limiter.allows() {
            log.info(format!(
                "request budget exhausted after {} calls; skipping remaining tasks",
                limiter.used()
            ));
            break;
        }

        log.info(format!("processing {}", task.endpoint));
        match process_task(task, collections, upstream, store, &mut limiter, &mut log).await {
            Ok(records_written) => {
                log.info(format!(
                    "finished {}: {} records written",
                    task.endpoint, records_written
                ));
                outcomes.push(TaskOutcome::Completed {
                    endpoint: task.endpoint,
                    records_written,
                });
            }
            Err(err) => {
                log.error(format!("task {} failed: {err:#}", task.endpoint));
                outcomes.push(TaskOutcome::Failed {
                    endpoint: task.endpoint,
                    error: format!("{err:#}"),
                });
            }
        }
    }

    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, TaskOutcome::Completed { .. }))
        .count();
    let failed = outcomes.len() - completed;
    log.info(format!(
        "sync run finished: {completed} tasks completed, {failed} failed, {} upstream calls",
        limiter.used()
    ));

    RunSummary::Success {
        logs: log.into_entries(),
        requests_made: limiter.used(),
    }
}

/// Fetch one target, classify it and route the body to the matching upsert.
/// The budget counter moves as soon as the response is in hand, whatever
/// happens downstream.
async fn process_task(
    task: &FetchTask,
    collections: &Collections,
    upstream: &dyn FootballApi,
    store: &dyn DocumentStore,
    limiter: &mut RateLimiter,
    log: &mut RunLog,
) -> Result<usize> {
    let body = upstream.fetch(task.endpoint).await?;
    limiter.record();

    let Classified { kind, code } = classify(task.endpoint)
        .ok_or_else(|| anyhow!("unrecognized endpoint: {}", task.endpoint))?;

    match kind {
        RecordKind::Competition => upsert_competition(store, collections, &code, body, log).await,
        RecordKind::Standing => insert_standings(store, collections, &code, body).await,
        RecordKind::Match => upsert_matches(store, collections, &code, body, log).await,
    }
}

/// Insert the competition once per code. An existing record short-circuits
/// the write; nothing is updated.
async fn upsert_competition(
    store: &dyn DocumentStore,
    collections: &Collections,
    code: &str,
    body: Value,
    log: &mut RunLog,
) -> Result<usize> {
    let payload: CompetitionPayload =
        serde_json::from_value(body).context("malformed competition payload")?;

    let existing = store
        .list_documents(&collections.competitions, &[Query::equal("code", code)])
        .await?;
    if existing.total > 0 {
        log.info(format!("competition {code} already stored; skipping"));
        return Ok(0);
    }

    let record = CompetitionRecord {
        code: code.to_string(),
        name: payload.name,
        area_name: payload.area.name,
    };
    store
        .create_document(
            &collections.competitions,
            &unique_id(),
            serde_json::to_value(&record)?,
            &[Permission::ReadAny],
        )
        .await?;
    log.info(format!("stored competition {code}"));
    Ok(1)
}

/// Append a fresh snapshot of the table, one row per document. No existence
/// check; repeated runs accumulate rows.
async fn insert_standings(
    store: &dyn DocumentStore,
    collections: &Collections,
    code: &str,
    body: Value,
) -> Result<usize> {
    let payload: StandingsPayload =
        serde_json::from_value(body).context("malformed standings payload")?;
    let rows = payload
        .standings
        .into_iter()
        .next()
        .map(|t| t.table)
        .unwrap_or_default();

    let mut written = 0;
    for row in rows.into_iter().take(MAX_ROWS_PER_TASK) {
        let record = StandingRecord {
            competition_code: code.to_string(),
            position: row.position,
            team_name: row.team.name,
            points: row.points,
            played_games: row.played_games,
        };
        store
            .create_document(
                &collections.standings,
                &unique_id(),
                serde_json::to_value(&record)?,
                &[],
            )
            .await?;
        written += 1;
    }
    Ok(written)
}

/// Insert finished matches once per upstream match id. The first-10 slice
/// applies before the status filter.
async fn upsert_matches(
    store: &dyn DocumentStore,
    collections: &Collections,
    code: &str,
    body: Value,
    log: &mut RunLog,
) -> Result<usize> {
    let payload: MatchesPayload =
        serde_json::from_value(body).context("malformed matches payload")?;

    let mut written = 0;
    for entry in payload.matches.into_iter().take(MAX_ROWS_PER_TASK) {
        if entry.status != FINISHED_STATUS {
            continue;
        }

        let existing = store
            .list_documents(&collections.matches, &[Query::equal("match_id", entry.id)])
            .await?;
        if existing.total > 0 {
            log.info(format!("match {} already stored; skipping", entry.id));
            continue;
        }

        let doc_id = unique_id();
        let record = MatchRecord {
            doc_id: doc_id.clone(),
            match_id: entry.id,
            competition_code: code.to_string(),
            home_team_name: entry.home_team.name,
            away_team_name: entry.away_team.name,
            score_home: entry.score.full_time.home,
            score_away: entry.score.full_time.away,
            status: entry.status,
            utc_date: entry.utc_date,
        };
        store
            .create_document(
                &collections.matches,
                &doc_id,
                serde_json::to_value(&record)?,
                &[Permission::ReadAny],
            )
            .await?;
        log.info(format!("stored match {}", entry.id));
        written += 1;
    }
    Ok(written)
}
