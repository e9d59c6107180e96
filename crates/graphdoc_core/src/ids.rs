//! Record identifiers and timestamps.

use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TIME_WIDTH: usize = 9;
const SEQ_WIDTH: usize = 4;
const RANDOM_WIDTH: usize = 6;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Generates prefixed, time-sortable identifiers.
///
/// An id is `prefix_` followed by a fixed-width base-36 suffix made of
/// the millisecond clock, a per-millisecond sequence, and a random tail:
///
/// ```text
/// user_lz3k9q1w0000x81kq2
///      |-------||--||----|
///        time   seq random
/// ```
///
/// Ids from one generator compare in creation order as plain strings,
/// even when several are minted in the same millisecond or the system
/// clock steps backwards. The random tail keeps ids from separate
/// generators apart.
#[derive(Debug, Default)]
pub struct IdGenerator {
    state: Mutex<(i64, u64)>,
}

impl IdGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id `"{prefix}_{suffix}"`.
    pub fn next(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.suffix())
    }

    /// Returns a fresh sortable suffix.
    pub fn suffix(&self) -> String {
        let (millis, seq) = {
            let mut state = self.state.lock();
            let now = now_millis().max(state.0);
            if now == state.0 {
                state.1 += 1;
            } else {
                *state = (now, 0);
            }
            *state
        };

        let mut out = String::with_capacity(TIME_WIDTH + SEQ_WIDTH + RANDOM_WIDTH);
        push_base36(&mut out, u64::try_from(millis).unwrap_or(0), TIME_WIDTH);
        push_base36(&mut out, seq, SEQ_WIDTH);
        let random = u128::from_be_bytes(Uuid::new_v4().into_bytes());
        push_base36(&mut out, (random % 36u128.pow(RANDOM_WIDTH as u32)) as u64, RANDOM_WIDTH);
        out
    }
}

/// Appends `value` in base 36, left-padded with zeros to `width` digits.
///
/// Values too large for the width keep their extra leading digits.
fn push_base36(out: &mut String, mut value: u64, width: usize) {
    let mut digits = Vec::with_capacity(width);
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    while digits.len() < width {
        digits.push(b'0');
    }
    out.extend(digits.iter().rev().map(|&b| b as char));
}
