//! Per-thread latched "last error" channel.
//!
//! Every failing public operation latches its short message here; the
//! application consumes it with [`last_error`]. Each thread owns its slot, so
//! failures on one thread never perturb another thread's report.

use std::cell::RefCell;

use crate::error::{Error, Result};

/// Latched messages are clamped to this many bytes.
const MESSAGE_CAP: usize = 80;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Latch `err`'s channel message for the current thread, replacing any
/// previous one.
pub fn set_last_error(err: &Error) {
    LAST_ERROR.set(Some(clamp(err.channel_message())));
}

/// Take the current thread's latched message, clearing the slot.
///
/// One-shot: a second call without an intervening failure returns `None`.
pub fn last_error() -> Option<String> {
    LAST_ERROR.take()
}

/// Latch on failure, pass the result through unchanged.
pub fn latch<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        set_last_error(err);
    }
    result
}

fn clamp(mut msg: String) -> String {
    if msg.len() > MESSAGE_CAP {
        let mut end = MESSAGE_CAP;
        while !msg.is_char_boundary(end) {
            end -= 1;
        }
        msg.truncate(end);
    }
    msg
}
