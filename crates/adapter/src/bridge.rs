//! Bridge runtime.
//!
//! Owns a tokio runtime next to the synchronous game loop. Records are written
//! by a background task; host commands queue up until the game thread polls.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tui_match3_core::ResultRecord;

use crate::command::HostCommand;
use crate::reporter::ChannelReporter;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub report_path: Option<PathBuf>,
    pub max_pending_commands: usize,
    pub disabled: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            report_path: None,
            max_pending_commands: 16,
            disabled: false,
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        use std::env;

        let report_path = env::var("MATCH3_REPORT_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let max_pending_commands = env::var("MATCH3_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(16);

        let disabled = env::var("MATCH3_REPORT_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            report_path,
            max_pending_commands,
            disabled,
        }
    }
}

/// Running bridge instance.
pub struct HostBridge {
    rt: Runtime,
    record_tx: Option<mpsc::UnboundedSender<ResultRecord>>,
    writer: Option<JoinHandle<()>>,
    cmd_tx: mpsc::Sender<HostCommand>,
    cmd_rx: mpsc::Receiver<HostCommand>,
}

impl HostBridge {
    /// Start the bridge. Returns `None` when disabled by config.
    pub fn start(config: BridgeConfig) -> Result<Option<Self>> {
        if config.disabled {
            info!("host bridge disabled");
            return Ok(None);
        }

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let (record_tx, record_rx) = mpsc::unbounded_channel::<ResultRecord>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<HostCommand>(config.max_pending_commands.max(1));

        let writer = rt.spawn(write_records(config.report_path.clone(), record_rx));
        match &config.report_path {
            Some(path) => info!("host bridge reporting to {}", path.display()),
            None => info!("host bridge running without a report file"),
        }

        Ok(Some(Self {
            rt,
            record_tx: Some(record_tx),
            writer: Some(writer),
            cmd_tx,
            cmd_rx,
        }))
    }

    /// A reporter feeding the writer task, for `Session::with_reporter`.
    pub fn reporter(&self) -> Option<ChannelReporter> {
        self.record_tx.clone().map(ChannelReporter::new)
    }

    /// Sender side of the command queue, for whatever transport the host uses.
    pub fn command_sender(&self) -> mpsc::Sender<HostCommand> {
        self.cmd_tx.clone()
    }

    /// Queue a command given as a JSON line. Full queues drop the command.
    pub fn push_line(&self, line: &str) -> bool {
        match HostCommand::parse(line) {
            Ok(cmd) => self.cmd_tx.try_send(cmd).is_ok(),
            Err(e) => {
                warn!("ignoring host command {line:?}: {e}");
                false
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<HostCommand> {
        self.cmd_rx.try_recv().ok()
    }

    /// Close the record channel and wait briefly for pending writes.
    pub fn shutdown(mut self) {
        self.record_tx = None;
        if let Some(writer) = self.writer.take() {
            let flushed = self
                .rt
                .block_on(async { tokio::time::timeout(FLUSH_TIMEOUT, writer).await });
            if flushed.is_err() {
                warn!("host bridge writer did not finish in time");
            }
        }
    }
}

/// Drain `rx`, appending each record to `path` as a JSON line. Without a path
/// records are only logged.
pub async fn write_records(path: Option<PathBuf>, mut rx: mpsc::UnboundedReceiver<ResultRecord>) {
    let mut file = match &path {
        Some(path) => match open_append(path).await {
            Ok(f) => Some(f),
            Err(e) => {
                warn!("cannot open report file {}: {e}", path.display());
                None
            }
        },
        None => None,
    };

    let mut buf: Vec<u8> = Vec::with_capacity(256);
    while let Some(record) = rx.recv().await {
        debug!("result record: level {} {} score {}", record.level, record.result, record.score);
        let Some(out) = file.as_mut() else {
            continue;
        };
        buf.clear();
        if let Err(e) = serde_json::to_writer(&mut buf, &record) {
            warn!("cannot encode result record: {e}");
            continue;
        }
        buf.push(b'\n');
        if let Err(e) = out.write_all(&buf).await {
            warn!("report write failed: {e}");
            file = None;
            continue;
        }
        let _ = out.flush().await;
    }
}

async fn open_append(path: &Path) -> std::io::Result<tokio::fs::File> {
    OpenOptions::new().create(true).append(true).open(path).await
}
