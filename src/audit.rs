//! Best-effort audit notifications
//!
//! Audit events are a side channel. A failing sink is logged and otherwise
//! ignored; optimization results never depend on it.

use crate::config::AuditConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: String,
    pub project_id: String,
    pub timestamp: DateTime<Utc>,
    pub mode: String,
    pub fallback: bool,
}

impl AuditEvent {
    pub fn optimize(project_id: &str, mode: &str, fallback: bool) -> Self {
        Self {
            action: "optimize".to_string(),
            project_id: project_id.to_string(),
            timestamp: Utc::now(),
            mode: mode.to_string(),
            fallback,
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// Writes events to the `audit` log target.
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        info!(
            target: "audit",
            "{} project={} mode={} fallback={}",
            event.action, event.project_id, event.mode, event.fallback
        );
        Ok(())
    }
}

/// Appends one JSON object per line.
pub struct JsonlAuditSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlAuditSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;
        // A poisoned lock only means another writer panicked mid-append.
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

pub fn sink_from_config(config: &AuditConfig) -> Option<Arc<dyn AuditSink>> {
    if !config.enabled {
        return None;
    }
    match &config.log_path {
        Some(path) => Some(Arc::new(JsonlAuditSink::new(path.clone()))),
        None => Some(Arc::new(LogAuditSink)),
    }
}

/// Record an event, swallowing any failure.
pub fn notify_best_effort(sink: &dyn AuditSink, event: &AuditEvent) {
    if let Err(e) = sink.record(event) {
        warn!("Audit notification dropped: {}", e);
    }
}

/// Record an event on the blocking pool so sink I/O stays off the runtime
/// threads. Failures, including a panicking sink, are only logged.
pub async fn notify_in_background(sink: Arc<dyn AuditSink>, event: AuditEvent) {
    let task = tokio::task::spawn_blocking(move || notify_best_effort(sink.as_ref(), &event));
    if let Err(e) = task.await {
        warn!("Audit task failed: {}", e);
    }
}
