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

//! Windowed payment graph and median-degree statistic.
//!
//! The graph is undirected: nodes are party identifiers, edges are unordered
//! party pairs tagged with the `last_seen` timestamp of the most recent
//! payment between them. Only edges inside the trailing window
//! `[max_timestamp - max_elapse, max_timestamp]` survive; a node exists only
//! while it has at least one incident edge.
//!
//! Eviction is driven by a secondary index keyed by `last_seen`, so a window
//! advance only touches the expired timestamp buckets instead of rescanning
//! every edge. The surviving edge set is identical to what a full scan would
//! produce.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace};

/// Default trailing window width in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Unordered pair of party identifiers. `EdgeKey::new("a", "b")` and
/// `EdgeKey::new("b", "a")` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    a: String,
    b: String,
}

impl EdgeKey {
    pub fn new(x: &str, y: &str) -> Self {
        if x <= y {
            Self {
                a: x.to_string(),
                b: y.to_string(),
            }
        } else {
            Self {
                a: y.to_string(),
                b: x.to_string(),
            }
        }
    }

    pub fn endpoints(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }

    fn is_self_loop(&self) -> bool {
        self.a == self.b
    }
}

/// Undirected graph restricted to a trailing time window.
///
/// `max_timestamp` is the largest timestamp ever presented to [`ingest`],
/// whether or not that payment was accepted; it never decreases. Degrees are
/// maintained incrementally, so nodes drop out the moment their last incident
/// edge is evicted.
///
/// Self-loop convention: a self-loop is a single edge and contributes 1 to
/// its node's degree (degree = count of distinct incident edges).
///
/// [`ingest`]: WindowedGraph::ingest
#[derive(Debug, Clone)]
pub struct WindowedGraph {
    /// Window width; edges strictly older than this relative to
    /// `max_timestamp` are evicted.
    max_elapse: i64,
    /// Right edge of the window, 0 until the first payment arrives.
    max_timestamp: i64,
    /// `last_seen` per live edge.
    edges: HashMap<EdgeKey, i64>,
    /// Incident-edge count per node. Never holds a zero entry.
    degrees: HashMap<String, usize>,
    /// Expiry index: `last_seen` -> edges carrying that timestamp.
    by_last_seen: BTreeMap<i64, HashSet<EdgeKey>>,
}

impl Default for WindowedGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowedGraph {
    /// Empty graph with the default 60 second window.
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW_SECS)
    }

    /// Empty graph with a custom window width in seconds.
    pub fn with_window(max_elapse: i64) -> Self {
        Self {
            max_elapse,
            max_timestamp: 0,
            edges: HashMap::new(),
            degrees: HashMap::new(),
            by_last_seen: BTreeMap::new(),
        }
    }

    /// Feed one payment into the graph.
    ///
    /// Advances `max_timestamp` if `timestamp` exceeds it, evicting expired
    /// edges on advance (and only on advance). A payment older than the
    /// post-advance window is discarded without touching the graph; anything
    /// in-window upserts the edge with an unconditional `last_seen`
    /// overwrite, even when the new timestamp is older than the edge's
    /// current one.
    pub fn ingest(&mut self, target: &str, actor: &str, timestamp: i64) {
        if timestamp > self.max_timestamp {
            self.max_timestamp = timestamp;
            self.evict_expired();
        }

        if self.max_timestamp - timestamp > self.max_elapse {
            trace!(
                timestamp,
                max_timestamp = self.max_timestamp,
                "payment outside window, discarded"
            );
            return;
        }

        self.upsert_edge(EdgeKey::new(target, actor), timestamp);
    }

    /// Median node degree, formatted with exactly two decimals.
    ///
    /// `"0.00"` for the empty graph. Pure read: no field is mutated.
    pub fn median_degree(&self) -> String {
        format!("{:.2}", self.median_degree_value())
    }

    /// Median node degree as a raw float. 0.0 for the empty graph.
    pub fn median_degree_value(&self) -> f64 {
        if self.degrees.is_empty() {
            return 0.0;
        }
        let mut degrees: Vec<usize> = self.degrees.values().copied().collect();
        degrees.sort_unstable();
        let mid = degrees.len() / 2;
        if degrees.len() % 2 == 1 {
            degrees[mid] as f64
        } else {
            (degrees[mid - 1] + degrees[mid]) as f64 / 2.0
        }
    }

    /// Right edge of the current window.
    pub fn max_timestamp(&self) -> i64 {
        self.max_timestamp
    }

    /// Window width in seconds.
    pub fn window_secs(&self) -> i64 {
        self.max_elapse
    }

    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Degree of a node, or `None` if the node is not in the graph.
    pub fn degree(&self, node: &str) -> Option<usize> {
        self.degrees.get(node).copied()
    }

    /// Whether an edge currently connects the two parties (order-insensitive).
    pub fn contains_edge(&self, x: &str, y: &str) -> bool {
        self.edges.contains_key(&EdgeKey::new(x, y))
    }

    /// `last_seen` of the edge between two parties, if it exists.
    pub fn edge_last_seen(&self, x: &str, y: &str) -> Option<i64> {
        self.edges.get(&EdgeKey::new(x, y)).copied()
    }

    /// Iterate over live edges with their `last_seen` timestamps.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, i64)> {
        self.edges.iter().map(|(key, last_seen)| (key, *last_seen))
    }

    /// Iterate over nodes currently in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.degrees.keys().map(String::as_str)
    }

    /// Remove every edge with `max_timestamp - last_seen > max_elapse`,
    /// dropping nodes whose degree reaches zero. Only called on a window
    /// advance, so only timestamp buckets below the cutoff are visited.
    fn evict_expired(&mut self) {
        let cutoff = self.max_timestamp - self.max_elapse;
        let expired: Vec<i64> = self
            .by_last_seen
            .range(..cutoff)
            .map(|(last_seen, _)| *last_seen)
            .collect();

        let mut removed = 0usize;
        for last_seen in expired {
            if let Some(keys) = self.by_last_seen.remove(&last_seen) {
                for key in keys {
                    self.edges.remove(&key);
                    self.decrement_degree_for(&key);
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            debug!(
                removed,
                max_timestamp = self.max_timestamp,
                edges = self.edges.len(),
                nodes = self.degrees.len(),
                "evicted expired edges"
            );
        }
    }

    fn upsert_edge(&mut self, key: EdgeKey, timestamp: i64) {
        if let Some(previous) = self.edges.insert(key.clone(), timestamp) {
            // Refresh: reindex under the new last_seen. Degrees are untouched.
            if previous != timestamp {
                if let Some(bucket) = self.by_last_seen.get_mut(&previous) {
                    bucket.remove(&key);
                    if bucket.is_empty() {
                        self.by_last_seen.remove(&previous);
                    }
                }
                self.by_last_seen.entry(timestamp).or_default().insert(key);
            }
        } else {
            *self.degrees.entry(key.a.clone()).or_insert(0) += 1;
            if !key.is_self_loop() {
                *self.degrees.entry(key.b.clone()).or_insert(0) += 1;
            }
            self.by_last_seen.entry(timestamp).or_default().insert(key);
        }
    }

    fn decrement_degree_for(&mut self, key: &EdgeKey) {
        self.decrement_degree(&key.a);
        if !key.is_self_loop() {
            self.decrement_degree(&key.b);
        }
    }

    fn decrement_degree(&mut self, node: &str) {
        if let Some(degree) = self.degrees.get_mut(node) {
            *degree -= 1;
            if *degree == 0 {
                self.degrees.remove(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph_median_is_zero() {
        let graph = WindowedGraph::new();
        assert_eq!(graph.median_degree(), "0.00");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_single_edge() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 100);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.median_degree(), "1.00");
        assert_eq!(graph.max_timestamp(), 100);
    }

    #[test]
    fn test_edge_key_is_unordered() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 100);
        graph.ingest("b", "a", 110);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_last_seen("a", "b"), Some(110));
    }

    #[test]
    fn test_median_formula_odd_and_even() {
        let mut graph = WindowedGraph::new();
        // Degrees {1, 1, 2}: a-b, b-c.
        graph.ingest("a", "b", 100);
        graph.ingest("b", "c", 100);
        assert_eq!(graph.median_degree(), "1.00");

        // Degrees {1, 1, 2, 2}: add c-d.
        graph.ingest("c", "d", 100);
        assert_eq!(graph.median_degree(), "1.50");
    }

    #[test]
    fn test_self_loop_counts_once() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "a", 100);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree("a"), Some(1));
        assert_eq!(graph.median_degree(), "1.00");
    }

    #[test]
    fn test_idempotent_refresh() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 100);
        graph.ingest("b", "c", 105);
        let before = ["a", "b", "c"].map(|n| graph.degree(n));

        graph.ingest("a", "b", 100);
        let after = ["a", "b", "c"].map(|n| graph.degree(n));

        assert_eq!(before, after);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_stale_payment_is_discarded() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 1000);
        graph.ingest("c", "d", 900); // 100s old, window is 60
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.contains_edge("c", "d"));
        // The discarded payment still never lowers the clock.
        assert_eq!(graph.max_timestamp(), 1000);
    }

    #[test]
    fn test_boundary_payment_is_kept() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 1000);
        // Exactly max_elapse old: 1000 - 940 = 60, not > 60.
        graph.ingest("c", "d", 940);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_eviction_only_on_advance() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 1000);
        graph.ingest("c", "d", 1050);
        // No advance: the a-b edge is now 50s old and stays.
        graph.ingest("e", "f", 1040);
        assert_eq!(graph.edge_count(), 3);
        // Advance past the window of the first edge.
        graph.ingest("g", "h", 1070);
        assert!(!graph.contains_edge("a", "b"));
        assert!(graph.contains_edge("c", "d"));
        assert!(graph.contains_edge("e", "f"));
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn test_eviction_drops_isolated_nodes() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 1000);
        graph.ingest("b", "c", 1050);
        graph.ingest("d", "e", 1070); // evicts a-b, a becomes isolated
        assert_eq!(graph.degree("a"), None);
        assert_eq!(graph.degree("b"), Some(1));
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_refresh_overwrites_last_seen_even_backwards() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 1000);
        // In-window payment for the same pair with an older timestamp: the
        // overwrite is unconditional.
        graph.ingest("a", "b", 970);
        assert_eq!(graph.edge_last_seen("a", "b"), Some(970));
        // So an advance past 970's window evicts the edge.
        graph.ingest("c", "d", 1031);
        assert!(!graph.contains_edge("a", "b"));
    }

    #[test]
    fn test_refreshed_edge_survives_eviction_of_old_bucket() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 1000);
        graph.ingest("a", "b", 1050);
        graph.ingest("c", "d", 1070); // old bucket at 1000 must be gone
        assert_eq!(graph.edge_last_seen("a", "b"), Some(1050));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_median_is_pure_read() {
        let mut graph = WindowedGraph::new();
        graph.ingest("a", "b", 1000);
        let first = graph.median_degree();
        let second = graph.median_degree();
        assert_eq!(first, second);
        assert_eq!(graph.max_timestamp(), 1000);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_independent_windows_coexist() {
        let mut narrow = WindowedGraph::with_window(10);
        let mut wide = WindowedGraph::with_window(1000);
        narrow.ingest("a", "b", 100);
        wide.ingest("a", "b", 100);
        narrow.ingest("c", "d", 200);
        wide.ingest("c", "d", 200);
        assert_eq!(narrow.edge_count(), 1);
        assert_eq!(wide.edge_count(), 2);
    }
}
