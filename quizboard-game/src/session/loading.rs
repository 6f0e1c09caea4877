use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Rejection};

/// Handle for one board load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket(u64);

impl LoadTicket {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Result of handing a finished load back to the session.
#[derive(Debug)]
pub enum LoadCompletion {
    /// The board was validated and installed.
    Applied,
    /// The load failed; the session has no board until the next load.
    Failed(LoadError),
}

/// Tracks the single in-flight board request.
///
/// Issuing a ticket supersedes the previous one, and invalidation (teardown)
/// orphans whatever is outstanding.
#[derive(Debug, Clone, Default)]
pub struct LoadGuard {
    issued: u64,
    in_flight: Option<u64>,
}

impl LoadGuard {
    pub fn begin(&mut self) -> LoadTicket {
        self.issued = self.issued.wrapping_add(1);
        self.in_flight = Some(self.issued);
        LoadTicket(self.issued)
    }

    /// Accept the completion for `ticket` if it is still the current request.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::StaleLoad`] for superseded or orphaned tickets.
    pub fn accept(&mut self, ticket: LoadTicket) -> Result<(), Rejection> {
        if self.in_flight == Some(ticket.0) {
            self.in_flight = None;
            Ok(())
        } else {
            Err(Rejection::StaleLoad(ticket.0))
        }
    }

    pub fn invalidate(&mut self) {
        self.in_flight = None;
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut guard = LoadGuard::default();
        let first = guard.begin();
        let second = guard.begin();
        assert_eq!(guard.accept(first), Err(Rejection::StaleLoad(first.id())));
        assert!(guard.is_loading());
        assert_eq!(guard.accept(second), Ok(()));
        assert!(!guard.is_loading());
        assert!(guard.accept(second).is_err());
    }

    #[test]
    fn invalidation_orphans_outstanding_ticket() {
        let mut guard = LoadGuard::default();
        let ticket = guard.begin();
        guard.invalidate();
        assert_eq!(guard.accept(ticket), Err(Rejection::StaleLoad(ticket.id())));
    }
}
