//! Per-article load state.
//!
//! Body text and AI summary are tracked independently, each with the same
//! small state machine:
//!
//! ```text
//! Unloaded ──begin──▶ Loading ──finish──▶ Loaded
//!     ▲                  │
//!     └──── Failed ◀─fail┘     (Failed ──begin──▶ Loading)
//! ```
//!
//! `begin_*` is the serialization point: it refuses while a request is
//! already in flight or after a result exists, so two callers can never
//! issue the same request for the same article.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    fn begin(&mut self) -> bool {
        match self {
            Self::Unloaded | Self::Failed => {
                *self = Self::Loading;
                true
            }
            Self::Loading | Self::Loaded => false,
        }
    }

    fn settle(&mut self, outcome: LoadState) -> bool {
        if *self != Self::Loading {
            return false;
        }
        *self = outcome;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleState {
    pub content: LoadState,
    pub summary: LoadState,
    pub body: Option<String>,
    pub summary_text: Option<String>,
}

/// Thread-safe map from article id to its [`ArticleState`].
#[derive(Debug, Default)]
pub struct ArticleStore {
    states: Mutex<HashMap<Uuid, ArticleState>>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ArticleState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of an article's state; unknown ids are `Unloaded`.
    pub fn state(&self, id: Uuid) -> ArticleState {
        self.lock().get(&id).cloned().unwrap_or_default()
    }

    pub fn begin_content(&self, id: Uuid) -> bool {
        let started = self.lock().entry(id).or_default().content.begin();
        debug!(%id, started, "begin_content");
        started
    }

    pub fn finish_content(&self, id: Uuid, body: String) {
        let mut states = self.lock();
        let state = states.entry(id).or_default();
        if state.content.settle(LoadState::Loaded) {
            state.body = Some(body);
        } else {
            warn!(%id, current = ?state.content, "finish_content without begin_content; ignored");
        }
    }

    pub fn fail_content(&self, id: Uuid) {
        let mut states = self.lock();
        let state = states.entry(id).or_default();
        if !state.content.settle(LoadState::Failed) {
            warn!(%id, current = ?state.content, "fail_content without begin_content; ignored");
        }
    }

    pub fn begin_summary(&self, id: Uuid) -> bool {
        let started = self.lock().entry(id).or_default().summary.begin();
        debug!(%id, started, "begin_summary");
        started
    }

    pub fn finish_summary(&self, id: Uuid, summary: String) {
        let mut states = self.lock();
        let state = states.entry(id).or_default();
        if state.summary.settle(LoadState::Loaded) {
            state.summary_text = Some(summary);
        } else {
            warn!(%id, current = ?state.summary, "finish_summary without begin_summary; ignored");
        }
    }

    pub fn fail_summary(&self, id: Uuid) {
        let mut states = self.lock();
        let state = states.entry(id).or_default();
        if !state.summary.settle(LoadState::Failed) {
            warn!(%id, current = ?state.summary, "fail_summary without begin_summary; ignored");
        }
    }
}
