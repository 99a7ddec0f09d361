//! Result reporters that leave the engine crate.

use std::io::Write;

use tokio::sync::mpsc;
use tui_match3_core::{ReportError, ResultRecord, ResultReporter};

/// Writes each record as a single JSON line.
pub struct JsonLinesReporter<W: Write> {
    out: W,
    buf: Vec<u8>,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: Vec::with_capacity(256),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultReporter for JsonLinesReporter<W> {
    fn post_result(&mut self, record: &ResultRecord) -> Result<(), ReportError> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, record)?;
        self.buf.push(b'\n');
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Forwards records to an async consumer.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ResultRecord>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::UnboundedSender<ResultRecord>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ResultRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ResultReporter for ChannelReporter {
    fn post_result(&mut self, record: &ResultRecord) -> Result<(), ReportError> {
        self.tx
            .send(record.clone())
            .map_err(|_| ReportError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_match3_core::OutcomeSummary;
    use tui_match3_types::{GameResult, LoseReason};

    fn record(result: GameResult, reason: Option<LoseReason>) -> ResultRecord {
        let summary = OutcomeSummary {
            level_id: 2,
            level_index: 1,
            total: 740,
            level_score: 240,
            target: 600,
            moves_left: None,
            time_left: Some(0),
        };
        ResultRecord::new(result, reason, &summary)
    }

    #[test]
    fn test_json_lines_one_object_per_line() {
        let mut reporter = JsonLinesReporter::new(Vec::new());
        reporter.post_result(&record(GameResult::Win, None)).unwrap();
        reporter
            .post_result(&record(GameResult::Lose, Some(LoseReason::Time)))
            .unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["result"], "win");
        assert_eq!(first["level"], 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["reason"], "time");
        assert_eq!(second["timeLeft"], 0);
    }

    #[test]
    fn test_channel_reporter_forwards_records() {
        let (mut reporter, mut rx) = ChannelReporter::channel();
        reporter.post_result(&record(GameResult::Win, None)).unwrap();

        let got = rx.try_recv().unwrap();
        assert_eq!(got.score, 740);
        assert_eq!(got.result, "win");
    }

    #[test]
    fn test_channel_reporter_reports_disconnect() {
        let (mut reporter, rx) = ChannelReporter::channel();
        drop(rx);

        let err = reporter
            .post_result(&record(GameResult::Lose, Some(LoseReason::Moves)))
            .unwrap_err();
        assert!(matches!(err, ReportError::Disconnected));
    }
}
