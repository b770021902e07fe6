use std::fmt;
use std::sync::Arc;

use super::handler::Handler;

/// One registered listener.
///
/// `remaining == 0` means unlimited. A positive counter is decremented on
/// every firing; the firing that brings it to zero marks the record for removal.
pub(crate) struct ListenerRecord {
    callback: Handler,
    remaining: u64,
    marked: bool,
}

impl ListenerRecord {
    pub(crate) fn new(callback: Handler, remaining: u64) -> Self {
        Self {
            callback,
            remaining,
            marked: false,
        }
    }

    /// Accounts for one firing. Returns `true` if this firing exhausted the record.
    pub(crate) fn consume(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.marked = true;
            }
        }
        self.marked
    }

    #[inline]
    pub(crate) fn is_marked(&self) -> bool {
        self.marked
    }

    #[inline]
    pub(crate) fn callback(&self) -> Handler {
        Arc::clone(&self.callback)
    }
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("remaining", &self.remaining)
            .field("marked", &self.marked)
            .finish_non_exhaustive()
    }
}
