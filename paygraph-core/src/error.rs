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

//! Error types for the paygraph core.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PaygraphError>;

/// Errors raised while decoding payment records or driving a stream.
///
/// The windowed graph itself never fails for well-formed arguments; every
/// variant here belongs to the record-decoding boundary or to stream I/O.
#[derive(Debug, Error)]
pub enum PaygraphError {
    /// The input line was not a valid JSON payment object.
    #[error("malformed payment record: {0}")]
    MalformedRecord(#[from] serde_json::Error),

    /// `created_time` did not match the `YYYY-MM-DDTHH:MM:SSZ` shape.
    #[error("invalid created_time {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// `target` or `actor` was present but empty.
    #[error("empty party identifier in payment record")]
    EmptyParty,

    /// Reading the input stream or writing the output stream failed.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}
