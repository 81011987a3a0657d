//! Recorded notification traces (JSON lines).
//!
//! One notification per line, either `["redraw", [updates...]]` or `["Gui", [name, args...]]`.
//! Blank lines and lines starting with `#` are skipped; undecodable lines are logged and skipped.

use crate::source::{BatchStream, decode_notification};
use anyhow::Context;
use core_events::Event;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

pub struct TraceReplay {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl TraceReplay {
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .await
            .with_context(|| format!("opening trace {}", path.display()))?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse one trace line. `Ok(None)` for lines that carry nothing to apply.
pub fn parse_trace_line(line: &str) -> anyhow::Result<Option<Event>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(line).context("invalid json")?;
    let parts = value.as_array().context("expected [method, params]")?;
    let [method, params] = parts.as_slice() else {
        anyhow::bail!("expected [method, params]");
    };
    let method = method.as_str().context("method is not a string")?;
    Ok(decode_notification(method, params)?)
}

impl BatchStream for TraceReplay {
    async fn next_event(&mut self) -> anyhow::Result<Option<Event>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            match parse_trace_line(&line) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        target: "transport.trace",
                        line = self.line_no,
                        error = %e,
                        "trace_line_skipped"
                    );
                }
            }
        }
        Ok(None)
    }
}
