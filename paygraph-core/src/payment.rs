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

//! Payment record decoding.
//!
//! The input stream carries one JSON object per line with `created_time`,
//! `target`, and `actor` fields. Decoding converts the ISO-8601 timestamp
//! (`YYYY-MM-DDTHH:MM:SSZ`, UTC) to epoch seconds before the record reaches
//! the graph; the graph only ever sees integer timestamps and opaque party
//! identifiers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{PaygraphError, Result};

/// `created_time` wire format. Only this exact shape is accepted.
pub const CREATED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Raw wire-level payment record, one per input line.
///
/// Unknown fields are ignored so that richer upstream payloads (amounts,
/// notes, payment ids) pass through without error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub created_time: String,
    pub target: String,
    pub actor: String,
}

/// A decoded payment, ready for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// Receiving party.
    pub target: String,
    /// Paying party.
    pub actor: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` string to epoch seconds (UTC).
pub fn parse_created_time(value: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(value, CREATED_TIME_FORMAT).map_err(|source| {
        PaygraphError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })?;
    Ok(naive.and_utc().timestamp())
}

impl Payment {
    /// Decode a single JSON input line into a payment.
    pub fn from_json_line(line: &str) -> Result<Self> {
        let record: PaymentRecord = serde_json::from_str(line)?;
        Self::try_from(record)
    }
}

impl TryFrom<PaymentRecord> for Payment {
    type Error = PaygraphError;

    fn try_from(record: PaymentRecord) -> Result<Self> {
        if record.target.is_empty() || record.actor.is_empty() {
            return Err(PaygraphError::EmptyParty);
        }
        Ok(Self {
            timestamp: parse_created_time(&record.created_time)?,
            target: record.target,
            actor: record.actor,
        })
    }
}
