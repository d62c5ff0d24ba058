//! Divmon Monitor
//!
//! Runtime side of the divergence monitor: collaborator traits for market
//! data, persistence and alert delivery; an in-memory store; the at-most-once
//! signal gate; stream reconnect with backoff; the live monitor; and the
//! historical backtest session.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use divmon_monitor::{
//!     CancellationToken, DryRunSink, LiveMonitor, MemoryStore, SignalGate, init_tracing,
//! };
//!
//! let config = MonitorConfig::from_env()?;
//! init_tracing(&config.logging);
//! let store = Arc::new(MemoryStore::new());
//! let gate = Arc::new(SignalGate::new(store.clone()));
//! let mut monitor = LiveMonitor::new(config, store, gate, Arc::new(DryRunSink))?;
//! let cancel = CancellationToken::new();
//! monitor.run(&provider, &cancel).await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod alert;
pub mod collaborators;
pub mod error;
pub mod gate;
pub mod live;
pub mod logging;
pub mod reconnect;
pub mod session;
pub mod store;

pub use alert::{AlertPayload, DryRunSink, Embed, EmbedField};
pub use collaborators::{AlertSink, BarsBySymbol, CandleRepository, MarketDataProvider, SignalStore};
pub use error::{AlertError, MonitorError, ProviderError, StoreError};
pub use gate::{GateOutcome, SignalGate};
pub use live::LiveMonitor;
pub use logging::init_tracing;
pub use reconnect::{ReconnectPolicy, run_stream_with_reconnect};
pub use tokio_util::sync::CancellationToken;
pub use session::{BacktestSession, SessionOutcome, log_summary};
pub use store::{MemoryStore, SentRecord};
