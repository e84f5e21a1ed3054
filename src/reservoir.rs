// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The cross-frame bit reservoir: main-data bytes are not always fully
//! self-contained within their own frame, so frames may borrow capacity
//! from the tail of previously seen frames via `main_data_begin`.
//!
//! This intentionally does not replicate the reference decoder's reservoir
//! loop, which mis-indexes its copy (`j++` against a test of `i <= i-1`).
//! The assembly rule implemented here follows the standard directly: take
//! the last `main_data_begin` bytes of history, then append this frame's own
//! main-data bytes.

use std::collections::VecDeque;

use log::trace;

use crate::error::{reservoir_underflow, Result};

/// Rolling history of main-data bytes, bounded to `max_bytes`.
pub struct Reservoir {
    history: VecDeque<u8>,
    max_bytes: usize,
}

impl Reservoir {
    pub fn new(max_bytes: usize) -> Reservoir {
        Reservoir { history: VecDeque::with_capacity(max_bytes), max_bytes }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Bytes of history currently available for back-reference.
    pub fn available(&self) -> usize {
        self.history.len()
    }

    /// Assemble the main-data stream for a frame whose side info declared
    /// `main_data_begin` bytes of back-reference, given this frame's own
    /// main-data bytes. On success, the returned buffer's bit 0 is the first
    /// bit of granule 0 / channel 0's scale factors.
    ///
    /// The reservoir's history is always advanced by `frame_bytes`
    /// regardless of success, since the standard defines `main_data_begin`
    /// relative to the raw byte stream position, independent of whether this
    /// particular frame could be fully assembled.
    pub fn assemble(&mut self, main_data_begin: usize, frame_bytes: &[u8]) -> Result<Vec<u8>> {
        let result = if main_data_begin > self.history.len() {
            trace!(
                "reservoir underflow: need {} bytes of history, have {}",
                main_data_begin,
                self.history.len()
            );
            reservoir_underflow("main_data_begin exceeds available reservoir history")
        } else {
            let skip = self.history.len() - main_data_begin;
            let mut assembled = Vec::with_capacity(main_data_begin + frame_bytes.len());
            assembled.extend(self.history.iter().skip(skip).copied());
            assembled.extend_from_slice(frame_bytes);
            Ok(assembled)
        };

        self.history.extend(frame_bytes.iter().copied());
        let overflow = self.history.len().saturating_sub(self.max_bytes);
        for _ in 0..overflow {
            self.history.pop_front();
        }

        result
    }
}
