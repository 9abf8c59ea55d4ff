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

//! Paygraph Core
//!
//! Windowed payment-graph engine: ingests timestamped payments between two
//! parties, keeps an undirected graph restricted to a trailing time window,
//! and reports the median node degree after every record.
//!
//! The graph's only notion of "now" is the largest business timestamp seen
//! so far; wall-clock time plays no role.

pub mod error;
pub mod graph;
pub mod payment;
pub mod processor;
pub mod shared;

pub use error::{PaygraphError, Result};
pub use graph::{EdgeKey, WindowedGraph, DEFAULT_WINDOW_SECS};
pub use payment::{parse_created_time, Payment, PaymentRecord, CREATED_TIME_FORMAT};
pub use processor::{Processor, RecordOutcome, SkipReason, StreamStats};
pub use shared::SharedGraph;
