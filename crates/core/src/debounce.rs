//! Quiet-period gating for detection requests driven by keystrokes.

use crate::service::{DetectOutcome, TranslatorService};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Marks one call to [`Debouncer::arm`]; only the newest ticket survives
/// the quiet period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Supersedes every ticket handed out before this one.
    pub fn arm(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Waits out the quiet period; `false` if a newer ticket was armed.
    pub async fn settled(&self, ticket: Ticket) -> bool {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AutoDetect {
    /// Blank input; nothing to detect.
    Empty,
    /// A newer input arrived during the quiet period.
    Superseded,
    /// Same text as the last successful detection.
    Unchanged(DetectOutcome),
    Fresh(DetectOutcome),
}

impl AutoDetect {
    pub fn status(&self) -> AutoDetectStatus {
        match self {
            Self::Empty => AutoDetectStatus::Empty,
            Self::Superseded => AutoDetectStatus::Superseded,
            Self::Unchanged(o) | Self::Fresh(o) if o.detected.is_some() => {
                AutoDetectStatus::Detected
            }
            Self::Unchanged(_) | Self::Fresh(_) => AutoDetectStatus::Failed,
        }
    }

    pub fn outcome(&self) -> Option<&DetectOutcome> {
        match self {
            Self::Unchanged(o) | Self::Fresh(o) => Some(o),
            Self::Empty | Self::Superseded => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AutoDetectStatus {
    Detected,
    Empty,
    Superseded,
    Failed,
}

/// Detection on input change: debounced, and skipped when the text matches
/// the last successfully detected one.
#[derive(Debug)]
pub struct AutoDetector {
    debouncer: Debouncer,
    last: Mutex<Option<(String, DetectOutcome)>>,
}

impl AutoDetector {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            last: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    pub async fn on_input(&self, service: &TranslatorService, text: &str) -> AutoDetect {
        // Every input, even blank or unchanged, cancels pending detections.
        let ticket = self.debouncer.arm();

        if text.trim().is_empty() {
            return AutoDetect::Empty;
        }
        if let Some(outcome) = self.remembered(text) {
            return AutoDetect::Unchanged(outcome);
        }
        if !self.debouncer.settled(ticket).await {
            tracing::debug!("detection superseded by newer input");
            return AutoDetect::Superseded;
        }

        let outcome = service.detect_language(text).await;
        if outcome.detected.is_some() {
            *self.last.lock().unwrap_or_else(PoisonError::into_inner) =
                Some((text.to_owned(), outcome.clone()));
        }
        AutoDetect::Fresh(outcome)
    }

    fn remembered(&self, text: &str) -> Option<DetectOutcome> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|(last, _)| last == text)
            .map(|(_, outcome)| outcome.clone())
    }
}
