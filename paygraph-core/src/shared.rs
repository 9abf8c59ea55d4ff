// Copyright 2025 Paygraph (https://github.com/paygraph)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Thread-safe wrapper for sharing one window across workers.
//!
//! The eviction sweep and the median read are order-dependent and not
//! commutative with concurrent insertion, so the ingest + median pair must
//! run as a single critical section.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::graph::WindowedGraph;

/// Cloneable handle to a mutex-guarded [`WindowedGraph`].
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<Mutex<WindowedGraph>>,
}

impl SharedGraph {
    /// Shared graph with the default 60 second window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared graph with a custom window width.
    pub fn with_window(window_secs: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WindowedGraph::with_window(window_secs))),
        }
    }

    /// Ingest one payment and read the median under one lock acquisition.
    pub fn record(&self, target: &str, actor: &str, timestamp: i64) -> String {
        let mut graph = self.inner.lock();
        graph.ingest(target, actor, timestamp);
        graph.median_degree()
    }

    /// Current median without ingesting anything.
    pub fn median_degree(&self) -> String {
        self.inner.lock().median_degree()
    }

    /// Snapshot of (nodes, edges) for inspection.
    pub fn counts(&self) -> (usize, usize) {
        let graph = self.inner.lock();
        (graph.node_count(), graph.edge_count())
    }
}
