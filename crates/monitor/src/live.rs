//! Live monitor: bars in, gated alerts out.
//!
//! Each symbol owns one [`CandleAggregator`]. When a candle closes it is
//! persisted and the most recent `history_limit` candles are evaluated; any
//! signal goes through the [`SignalGate`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono_tz::Tz;
use divmon_data::{CandleAggregator, bucket_start};
use divmon_strategy::evaluate;
use divmon_types::{Bar, Candle, MonitorConfig, parse_timezone};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::collaborators::{AlertSink, CandleRepository, MarketDataProvider};
use crate::error::MonitorError;
use crate::gate::{GateOutcome, SignalGate};
use crate::reconnect::{ReconnectPolicy, run_stream_with_reconnect};

/// Bars buffered between the stream and candle handling.
const BAR_BUFFER: usize = 1024;

/// Streaming divergence monitor for a fixed symbol set.
pub struct LiveMonitor {
    config: MonitorConfig,
    timeframe: String,
    timezone: Tz,
    aggregators: BTreeMap<String, CandleAggregator>,
    repository: Arc<dyn CandleRepository>,
    gate: Arc<SignalGate>,
    sink: Arc<dyn AlertSink>,
    closed_candles: u64,
}

impl std::fmt::Debug for LiveMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveMonitor")
            .field("symbols", &self.config.symbols)
            .field("timeframe", &self.timeframe)
            .field("closed_candles", &self.closed_candles)
            .finish_non_exhaustive()
    }
}

impl LiveMonitor {
    /// Creates a monitor after validating `config`.
    ///
    /// # Errors
    /// Returns [`MonitorError::Config`] for an invalid configuration.
    pub fn new(
        config: MonitorConfig,
        repository: Arc<dyn CandleRepository>,
        gate: Arc<SignalGate>,
        sink: Arc<dyn AlertSink>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        let timezone = parse_timezone(&config.timezone)?;
        let aggregators = config
            .symbols
            .iter()
            .map(|symbol| {
                (
                    symbol.clone(),
                    CandleAggregator::new(symbol.clone(), config.timeframe, timezone),
                )
            })
            .collect();

        Ok(Self {
            timeframe: config.timeframe.label(),
            config,
            timezone,
            aggregators,
            repository,
            gate,
            sink,
            closed_candles: 0,
        })
    }

    /// Candles closed since start.
    #[must_use]
    pub fn closed_candles(&self) -> u64 {
        self.closed_candles
    }

    /// Candle currently accumulating for `symbol`.
    #[must_use]
    pub fn open_candle(&self, symbol: &str) -> Option<&Candle> {
        self.aggregators.get(symbol)?.current()
    }

    /// Loads recent history at the monitor timeframe and persists it.
    /// Returns the number of candles stored.
    ///
    /// # Errors
    /// - [`MonitorError::Provider`] when the request fails.
    /// - [`MonitorError::Store`] when persisting fails.
    pub async fn backfill(&self, provider: &dyn MarketDataProvider) -> Result<usize, MonitorError> {
        let bars = provider
            .backfill(
                &self.config.symbols,
                self.config.timeframe,
                self.config.backfill_limit,
            )
            .await?;

        let mut stored = 0;
        for (symbol, bars) in &bars {
            let candles: Vec<Candle> = bars
                .iter()
                .map(|bar| {
                    let start = bucket_start(bar.timestamp, self.config.timeframe, self.timezone);
                    Candle::from_bar(bar, &self.timeframe, start)
                })
                .collect();
            if candles.is_empty() {
                continue;
            }
            self.repository.upsert_candles(&candles)?;
            tracing::info!("Backfilled {} candles for {symbol}", candles.len());
            stored += candles.len();
        }
        Ok(stored)
    }

    /// Feeds one bar. When it closes a candle, persists the candle and
    /// evaluates the symbol. Bars for unknown symbols are ignored.
    ///
    /// # Errors
    /// Any error from persisting, evaluating or publishing.
    pub fn handle_bar(&mut self, bar: &Bar) -> Result<Option<GateOutcome>, MonitorError> {
        let Some(aggregator) = self.aggregators.get_mut(&bar.symbol) else {
            tracing::debug!(symbol = %bar.symbol, "Ignoring bar for unmonitored symbol");
            return Ok(None);
        };
        let Some(closed) = aggregator.push(bar)? else {
            return Ok(None);
        };

        self.closed_candles += 1;
        tracing::info!(
            "Candle closed {} {} {} O:{:.2} H:{:.2} L:{:.2} C:{:.2} V:{:.0}",
            closed.symbol,
            closed.timeframe,
            closed.timestamp.to_rfc3339(),
            closed.open,
            closed.high,
            closed.low,
            closed.close,
            closed.volume
        );
        let every = self.config.heartbeat_every;
        if every > 0 && self.closed_candles % every == 0 {
            tracing::info!("Heartbeat: processed {} closed candles", self.closed_candles);
        }

        self.repository.upsert_candles(std::slice::from_ref(&closed))?;
        self.evaluate_symbol(&closed.symbol)
    }

    /// Evaluates the stored history of `symbol` and publishes any signal.
    ///
    /// # Errors
    /// Any error from loading history, evaluating or publishing.
    pub fn evaluate_symbol(&self, symbol: &str) -> Result<Option<GateOutcome>, MonitorError> {
        let candles =
            self.repository
                .get_candles(symbol, &self.timeframe, self.config.history_limit)?;
        if candles.len() < self.config.evaluation.min_history {
            return Ok(None);
        }

        let Some(signal) = evaluate(symbol, &self.timeframe, &candles, &self.config.evaluation)?
        else {
            return Ok(None);
        };
        let outcome = self.gate.publish(&signal, self.sink.as_ref())?;
        Ok(Some(outcome))
    }

    /// Backfills, then streams until `cancel` fires. Errors while handling
    /// individual bars are logged and the stream continues. Bars already
    /// received when `cancel` fires are still handled.
    ///
    /// # Errors
    /// Returns an error only when the backfill fails.
    pub async fn run(
        &mut self,
        provider: &dyn MarketDataProvider,
        cancel: &CancellationToken,
    ) -> Result<(), MonitorError> {
        self.backfill(provider).await?;

        let symbols = self.config.symbols.clone();
        let mut policy = ReconnectPolicy::from_config(&self.config.reconnect);
        tracing::info!(
            "Monitoring {} on {} candles",
            symbols.join(","),
            self.timeframe
        );

        let (tx, mut rx) = mpsc::channel(BAR_BUFFER);
        let stream = run_stream_with_reconnect(provider, &symbols, tx, &mut policy, cancel);
        let handle = async {
            while let Some(bar) = rx.recv().await {
                if let Err(err) = self.handle_bar(&bar) {
                    tracing::warn!(symbol = %bar.symbol, "Bar handling failed: {err}");
                }
            }
        };
        tokio::join!(stream, handle);
        Ok(())
    }
}
