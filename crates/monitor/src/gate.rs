//! At-most-once signal publication.
//!
//! Each publication claims the signal id in the [`SignalStore`] before
//! delivering and marks it sent afterwards. Claims live in the store, so any
//! number of gates over one store never alert twice for the same pivot. A
//! failed delivery releases the claim and a later evaluation may retry it;
//! a concurrent attempt during an in-flight delivery reports a duplicate.

use std::sync::Arc;

use divmon_strategy::signal_key;
use divmon_types::DivergenceSignal;

use crate::alert::AlertPayload;
use crate::collaborators::{AlertSink, SignalStore};
use crate::error::MonitorError;

/// Result of one publication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Delivered and marked
    Sent(String),
    /// Already sent or claimed by another publisher; nothing delivered
    Duplicate(String),
}

impl GateOutcome {
    /// Signal id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Sent(id) | Self::Duplicate(id) => id,
        }
    }

    /// True when this call delivered the alert.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Dedup gate over a shared [`SignalStore`].
pub struct SignalGate {
    store: Arc<dyn SignalStore>,
}

impl std::fmt::Debug for SignalGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalGate").finish_non_exhaustive()
    }
}

impl SignalGate {
    /// Creates a gate over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SignalStore>) -> Self {
        Self { store }
    }

    /// Publishes `signal` through `sink` unless its id was already sent.
    ///
    /// # Errors
    /// - [`MonitorError::Alert`] when delivery fails; the id stays unmarked.
    /// - [`MonitorError::Store`] when the store cannot be read or written.
    pub fn publish(
        &self,
        signal: &DivergenceSignal,
        sink: &dyn AlertSink,
    ) -> Result<GateOutcome, MonitorError> {
        let id = signal_key(signal);
        if !self.store.try_reserve(&id)? {
            tracing::debug!(symbol = %signal.symbol, id = %id, "Signal already sent");
            return Ok(GateOutcome::Duplicate(id));
        }

        if let Err(err) = sink.deliver(&AlertPayload::from_signal(signal)) {
            self.store.release(&id)?;
            return Err(err.into());
        }
        self.store
            .mark_sent(&id, &signal.symbol, &signal.timeframe, signal.kind)?;

        tracing::info!(
            "Signal {} {} {} confirmations={} {}",
            signal.symbol,
            signal.kind.as_str().to_uppercase(),
            signal.strength.as_str().to_uppercase(),
            signal.confirmations_label(),
            signal.reason
        );
        Ok(GateOutcome::Sent(id))
    }
}
