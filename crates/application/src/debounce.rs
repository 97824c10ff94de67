use std::time::Duration;

use tokio::time::Instant;

/// Default quiescence delay applied to search input.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Coalesces rapid value changes into one settled value.
///
/// A pushed value settles once no further value was pushed for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    settled: T,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Creates a debouncer whose settled value starts as `initial`.
    #[must_use]
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
        }
    }

    /// Records a new input value, restarting the quiescence window.
    pub fn push(&mut self, value: T, now: Instant) {
        let deadline = now.checked_add(self.delay).unwrap_or(now);
        self.pending = Some((value, deadline));
    }

    /// Returns when the pending value settles, if one is pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Settles the pending value once its deadline passed.
    ///
    /// Returns the new settled value only when it differs from the previous one.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if deadline > now {
            return None;
        }

        let (value, _) = self.pending.take()?;
        if value == self.settled {
            return None;
        }

        self.settled = value.clone();
        Some(value)
    }

    /// Returns the last settled value.
    #[must_use]
    pub fn settled(&self) -> &T {
        &self.settled
    }
}
