//! Execution record and request state machine (C8 data model).

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::strategy::StrategyRecommendation;
use super::task_analysis::TaskAnalysis;

/// States a single request passes through. Terminal states are `Completed`
/// and `Error`; `Error` is reachable from any non-terminal state (spec
/// section 4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Initializing,
    Analyzing,
    Planning,
    Executing,
    Coordinating,
    Completed,
    Error,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Outcome of running a request end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    Success(String),
    Failure(String),
}

/// One completed (or failed) request, retained in the coordinator's bounded
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub request_text: String,
    pub analysis: Option<TaskAnalysis>,
    pub recommendation: Option<StrategyRecommendation>,
    pub providers_used: Vec<String>,
    pub roles_used: Vec<String>,
    pub status: RequestStatus,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
    pub result: Option<ExecutionOutcome>,
}

impl ExecutionRecord {
    pub fn new(request_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_text: request_text.into(),
            analysis: None,
            recommendation: None,
            providers_used: Vec::new(),
            roles_used: Vec::new(),
            status: RequestStatus::Initializing,
            start_ts: Utc::now(),
            end_ts: None,
            result: None,
        }
    }

    pub fn elapsed_ms(&self) -> Option<i64> {
        self.end_ts
            .map(|end| (end - self.start_ts).num_milliseconds())
    }

    pub fn finish(&mut self, outcome: ExecutionOutcome) {
        self.status = match &outcome {
            ExecutionOutcome::Success(_) => RequestStatus::Completed,
            ExecutionOutcome::Failure(_) => RequestStatus::Error,
        };
        self.result = Some(outcome);
        self.end_ts = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, Some(ExecutionOutcome::Success(_)))
    }
}

/// Bounded FIFO history of execution records (default capacity: 1000, spec
/// section 3).
#[derive(Debug, Clone)]
pub struct ExecutionHistory {
    capacity: usize,
    records: VecDeque<ExecutionRecord>,
}

impl ExecutionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn push(&mut self, record: ExecutionRecord) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter()
    }

    pub fn most_recent(&self) -> Option<&ExecutionRecord> {
        self.records.back()
    }
}
