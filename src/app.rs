//! Explicit view state: the last snapshot plus the current filter.
//!
//! Every change of input goes through [`App`], and [`App::view`] recomputes
//! the chart and table from the held snapshot without touching the network.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::FetchError;
use crate::model::Snapshot;
use crate::present::{DisplayRow, filter_and_project};
use crate::stats::{LineCount, count_by_line};

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct View {
    pub fetched_at: Option<DateTime<Utc>>,
    pub warning: Option<String>,
    pub filter: String,
    pub counts: Vec<LineCount>,
    pub rows: Vec<DisplayRow>,
}

#[derive(Debug, Default)]
pub struct App {
    snapshot: Option<Arc<Snapshot>>,
    warning: Option<String>,
    filter: String,
}

impl App {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            ..Default::default()
        }
    }

    /// Takes the outcome of a fetch. A failure discards the previous snapshot.
    pub fn apply_fetch(&mut self, result: Result<Arc<Snapshot>, FetchError>) {
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.warning = None;
            }
            Err(e) => {
                self.snapshot = None;
                self.warning = Some(e.to_string());
            }
        }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn view(&self) -> View {
        let mut view = View {
            warning: self.warning.clone(),
            filter: self.filter.clone(),
            ..Default::default()
        };
        if let Some(snapshot) = &self.snapshot {
            view.fetched_at = Some(snapshot.fetched_at);
            view.counts = count_by_line(&snapshot.vehicles);
            view.rows = filter_and_project(&snapshot.vehicles, &self.filter);
        }
        view
    }
}
