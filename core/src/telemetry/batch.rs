//! Batch wire encoding
//!
//! ```text
//! {"run_id": int, "test_id": int,
//!  "timestamps": [u64, ...],
//!  "values": [[number | null, ...], ...],
//!  "channels": [string, ...]}
//! ```
//!
//! Absent ids are sent as `-1`; NaN (and infinite) values as `null`.

use alloc::vec::Vec;

use serde::ser::{Serialize, Serializer};

use crate::protocol::SessionIdentity;

use super::sample::Sample;

/// Wire value for an absent run or test id
pub const ABSENT_ID: i32 = -1;

#[derive(serde::Serialize)]
struct Batch<'a> {
    run_id: i32,
    test_id: i32,
    timestamps: Timestamps<'a>,
    values: Rows<'a>,
    channels: &'a [&'a str],
}

struct Timestamps<'a>(&'a [Sample]);

impl Serialize for Timestamps<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|sample| sample.timestamp_ms))
    }
}

struct Rows<'a>(&'a [Sample]);

impl Serialize for Rows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|sample| Row(&sample.values)))
    }
}

struct Row<'a>(&'a [f32]);

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|v| v.is_finite().then_some(*v)))
    }
}

/// Encode `samples` as one data batch tagged with `session`'s ids
pub fn encode(session: &SessionIdentity, channels: &[&str], samples: &[Sample]) -> Option<Vec<u8>> {
    let batch = Batch {
        run_id: session.run_id().unwrap_or(ABSENT_ID),
        test_id: session.test_id().unwrap_or(ABSENT_ID),
        timestamps: Timestamps(samples),
        values: Rows(samples),
        channels,
    };
    serde_json::to_vec(&batch).ok()
}
