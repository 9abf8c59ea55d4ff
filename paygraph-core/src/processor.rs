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

//! Per-record stream orchestration.
//!
//! Drives the full path for each input line: JSON decode, timestamp
//! conversion, graph ingestion, median read. Every line yields an explicit
//! [`RecordOutcome`] instead of a swallowed error, so callers can observe
//! skips without the stream ever aborting on a bad record.
//!
//! Output contract: a record that fails decoding emits no output line; a
//! stale payment is not an error and emits the unchanged median. Output line
//! count therefore equals accepted input line count.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::error::{PaygraphError, Result};
use crate::graph::WindowedGraph;
use crate::payment::Payment;

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The record reached the graph (accepted or stale); the median after
    /// this record is carried here and belongs on the output stream.
    Emitted(String),
    /// The record never reached the graph; no output line is produced.
    Skipped(SkipReason),
}

/// Why a record was skipped before ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Blank input line.
    EmptyLine,
    /// Not a valid JSON payment object, or missing fields.
    MalformedJson(String),
    /// `created_time` did not parse.
    InvalidTimestamp(String),
    /// `target` or `actor` was empty.
    EmptyParty,
}

impl From<&PaygraphError> for SkipReason {
    fn from(err: &PaygraphError) -> Self {
        match err {
            PaygraphError::MalformedRecord(source) => SkipReason::MalformedJson(source.to_string()),
            PaygraphError::InvalidTimestamp { value, .. } => {
                SkipReason::InvalidTimestamp(value.clone())
            }
            PaygraphError::EmptyParty => SkipReason::EmptyParty,
            // I/O never happens on the per-line path; keep the message anyway.
            PaygraphError::Io(source) => SkipReason::MalformedJson(source.to_string()),
        }
    }
}

/// Counters for one stream run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Records that reached the graph and emitted a median.
    pub processed: u64,
    /// Records skipped before ingestion.
    pub skipped: u64,
}

/// Sequential single-writer processor around one [`WindowedGraph`].
///
/// One record is fully processed (ingest plus median read) before the next
/// is considered; nothing here suspends or blocks mid-mutation.
#[derive(Debug, Default)]
pub struct Processor {
    graph: WindowedGraph,
    stats: StreamStats,
}

impl Processor {
    /// Processor over a fresh graph with the default 60 second window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor over a fresh graph with a custom window width.
    pub fn with_window(window_secs: i64) -> Self {
        Self {
            graph: WindowedGraph::with_window(window_secs),
            stats: StreamStats::default(),
        }
    }

    /// Handle one input line end to end.
    pub fn process_line(&mut self, line: &str) -> RecordOutcome {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.stats.skipped += 1;
            return RecordOutcome::Skipped(SkipReason::EmptyLine);
        }

        match Payment::from_json_line(trimmed) {
            Ok(payment) => {
                self.graph
                    .ingest(&payment.target, &payment.actor, payment.timestamp);
                self.stats.processed += 1;
                RecordOutcome::Emitted(self.graph.median_degree())
            }
            Err(err) => {
                self.stats.skipped += 1;
                warn!(error = %err, "skipping undecodable payment record");
                RecordOutcome::Skipped(SkipReason::from(&err))
            }
        }
    }

    /// Run a whole stream: one median line per accepted record, in input
    /// order. Skipped records produce no output line. Only stream-level I/O
    /// failures abort the run.
    pub fn process_stream<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        mut writer: W,
    ) -> Result<StreamStats> {
        for line in reader.lines() {
            let line = line?;
            if let RecordOutcome::Emitted(median) = self.process_line(&line) {
                writeln!(writer, "{median}")?;
            }
        }
        writer.flush()?;

        info!(
            processed = self.stats.processed,
            skipped = self.stats.skipped,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "payment stream complete"
        );
        Ok(self.stats)
    }

    /// Counters so far.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// The underlying graph, for inspection.
    pub fn graph(&self) -> &WindowedGraph {
        &self.graph
    }
}
