//! Per-handle partial read state.
//!
//! A read shorter than a counter would otherwise force the caller to query
//! again for the remaining bytes and get them from a different instant.
//! Instead each handle buffers the last captured value and hands it out in
//! pieces until all of it has been delivered:
//!
//! ```text
//!            read < WIDTH bytes
//!   IDLE ---------------------------> STREAMING(cursor)
//!    ^  \__ read >= WIDTH __/            |   \__ read, bytes remain __/
//!    |                                   |
//!    +------ rest delivered / reset -----+
//! ```
//!
//! Control queries reset the machine to IDLE.

use core::mem::size_of;

use crate::{collector::SnapshotCollector, error::SysError, mm::UserBuf};

/// Bytes in one streamed counter.
pub const WIDTH: usize = size_of::<u64>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// nothing buffered, the next read captures
    Idle,
    /// bytes `cursor..WIDTH` of the buffered value are still owed
    Streaming { cursor: usize },
}

/// State of one open handle.
#[derive(Debug, Default)]
pub struct Session {
    buffered: u64,
    cursor: usize,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            buffered: 0,
            cursor: 0,
        }
    }

    /// Current state, or `EUCLEAN` if the cursor is out of range.
    pub fn state(&self) -> Result<StreamState, SysError> {
        match self.cursor {
            0 => Ok(StreamState::Idle),
            cursor if cursor < WIDTH => Ok(StreamState::Streaming { cursor }),
            cursor => {
                log::warn!("[sir] unexpected stream cursor during read: {}", cursor);
                Err(SysError::EUCLEAN)
            }
        }
    }

    /// Back to IDLE, dropping any undelivered bytes.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Deliver up to `out.capacity()` bytes of the current counter.
    ///
    /// Returns the number of bytes delivered. A failed copy leaves the
    /// session as if nothing had been read.
    pub fn read(
        &mut self,
        collector: &SnapshotCollector,
        out: &mut dyn UserBuf,
    ) -> Result<usize, SysError> {
        let state = self.state()?;
        let max_len = out.capacity();
        if max_len == 0 {
            return Ok(0);
        }
        let (value, start) = match state {
            StreamState::Idle => (collector.capture_simple()?.value, 0),
            StreamState::Streaming { cursor } => {
                log::trace!("[sir] returning previous partial result");
                (self.buffered, cursor)
            }
        };
        let count = (WIDTH - start).min(max_len);
        let bytes = value.to_ne_bytes();
        out.copy_out(&bytes[start..start + count]).map_err(|err| {
            log::warn!("[sir] error when copying result to user: {}", err);
            err
        })?;

        self.buffered = value;
        self.cursor = if start + count == WIDTH { 0 } else { start + count };
        Ok(count)
    }

    #[cfg(test)]
    pub(crate) fn corrupt_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }
}
