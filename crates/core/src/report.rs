//! Result reporting - the record sent to the host when a level attempt ends
//!
//! Reporting is fire-and-forget from the engine's point of view: a failing
//! [`ResultReporter`] is logged and otherwise ignored.

use serde::Serialize;
use thiserror::Error;

use crate::event::OutcomeSummary;
use crate::types::{GameResult, LoseReason};

/// One finished level attempt, as posted to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub score: u32,
    /// Level id (not index).
    pub level: u32,
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub level_score: u32,
    pub target_score: u32,
    pub moves_left: Option<u32>,
    pub time_left: Option<u32>,
}

impl ResultRecord {
    pub fn new(result: GameResult, reason: Option<LoseReason>, summary: &OutcomeSummary) -> Self {
        Self {
            score: summary.total,
            level: summary.level_id,
            result: result.as_str(),
            reason: reason.map(|r| r.as_str()),
            level_score: summary.level_score,
            target_score: summary.target,
            moves_left: summary.moves_left,
            time_left: summary.time_left,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report channel disconnected")]
    Disconnected,
    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("report encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives result records.
pub trait ResultReporter {
    fn post_result(&mut self, record: &ResultRecord) -> Result<(), ReportError>;
}

/// Adapts a closure into a [`ResultReporter`].
pub struct FnReporter<F>(pub F);

impl<F> ResultReporter for FnReporter<F>
where
    F: FnMut(&ResultRecord) -> Result<(), ReportError>,
{
    fn post_result(&mut self, record: &ResultRecord) -> Result<(), ReportError> {
        (self.0)(record)
    }
}

/// Collects records in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    pub records: Vec<ResultRecord>,
}

impl ResultReporter for MemoryReporter {
    fn post_result(&mut self, record: &ResultRecord) -> Result<(), ReportError> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> OutcomeSummary {
        OutcomeSummary {
            level_id: 3,
            level_index: 2,
            total: 1450,
            level_score: 320,
            target: 800,
            moves_left: Some(0),
            time_left: None,
        }
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ResultRecord::new(GameResult::Lose, Some(LoseReason::Moves), &summary());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["score"], 1450);
        assert_eq!(json["level"], 3);
        assert_eq!(json["result"], "lose");
        assert_eq!(json["reason"], "moves");
        assert_eq!(json["levelScore"], 320);
        assert_eq!(json["targetScore"], 800);
        assert_eq!(json["movesLeft"], 0);
        assert!(json["timeLeft"].is_null());
    }

    #[test]
    fn test_win_record_omits_reason() {
        let record = ResultRecord::new(GameResult::Win, None, &summary());
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("reason"));
        assert!(json.contains("\"result\":\"win\""));
    }

    #[test]
    fn test_fn_reporter_forwards_errors() {
        let mut calls = 0;
        let mut reporter = FnReporter(|_: &ResultRecord| {
            calls += 1;
            Err(ReportError::Disconnected)
        });
        let record = ResultRecord::new(GameResult::Win, None, &summary());
        assert!(matches!(reporter.post_result(&record), Err(ReportError::Disconnected)));
        drop(reporter);
        assert_eq!(calls, 1);
    }
}
