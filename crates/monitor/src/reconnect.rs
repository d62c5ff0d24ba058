//! Stream reconnect loop with exponential backoff.

use std::time::Duration;

use divmon_types::{Bar, ReconnectConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::collaborators::MarketDataProvider;

/// Exponential backoff: start delay, doubling, capped, reset on a clean
/// reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectPolicy {
    /// Creates a policy. `max` is raised to `initial` if smaller.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            current: initial,
        }
    }

    /// Policy from configuration.
    #[must_use]
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Delay the next failure will wait.
    #[must_use]
    pub fn current_delay(&self) -> Duration {
        self.current
    }

    /// Returns the delay to wait now and doubles it for the next failure.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Back to the start delay.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}

/// Streams bars into `bars` until `cancel` fires or the receiver is dropped.
///
/// A provider error is logged, followed by a backoff sleep; a clean close
/// resets the backoff and reconnects at once. Both the open stream and the
/// backoff sleep race against `cancel`, so cancellation returns without
/// waiting for either.
pub async fn run_stream_with_reconnect<P: MarketDataProvider + ?Sized>(
    provider: &P,
    symbols: &[String],
    bars: mpsc::Sender<Bar>,
    policy: &mut ReconnectPolicy,
    cancel: &CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            tracing::info!("Stream cancelled");
            return;
        }
        if bars.is_closed() {
            tracing::info!("Bar consumer closed; stopping stream");
            return;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Stream cancelled");
                return;
            }
            result = provider.stream(symbols, bars.clone()) => result,
        };

        match result {
            Ok(()) => {
                policy.reset();
                tracing::info!("Stream closed cleanly; reconnecting");
            }
            Err(err) => {
                let delay = policy.next_delay();
                tracing::warn!("Stream error: {err}. Reconnecting in {:.1}s", delay.as_secs_f64());
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::info!("Stream cancelled");
                        return;
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Instant;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;
    use proptest::prelude::*;

    use crate::collaborators::BarsBySymbol;
    use crate::error::ProviderError;

    enum Step {
        Fail,
        Clean,
        Bar,
        Hang,
    }

    /// Plays scripted connection outcomes, cancelling once the script ends.
    struct ScriptedProvider {
        steps: Mutex<VecDeque<Step>>,
        cancel: CancellationToken,
        connects: Mutex<Vec<tokio::time::Instant>>,
    }

    impl ScriptedProvider {
        fn new(steps: Vec<Step>, cancel: CancellationToken) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                cancel,
                connects: Mutex::new(Vec::new()),
            }
        }

        fn connect_count(&self) -> usize {
            self.connects.lock().len()
        }
    }

    #[async_trait]
    impl MarketDataProvider for ScriptedProvider {
        async fn backfill(
            &self,
            _: &[String],
            _: divmon_types::Timeframe,
            _: usize,
        ) -> Result<BarsBySymbol, ProviderError> {
            Ok(BarsBySymbol::new())
        }

        async fn get_range(
            &self,
            _: &[String],
            _: divmon_types::Timeframe,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<BarsBySymbol, ProviderError> {
            Ok(BarsBySymbol::new())
        }

        async fn stream(
            &self,
            _: &[String],
            bars: mpsc::Sender<Bar>,
        ) -> Result<(), ProviderError> {
            self.connects.lock().push(tokio::time::Instant::now());
            let step = self.steps.lock().pop_front();
            match step {
                Some(Step::Fail) => Err(ProviderError::connection("socket closed")),
                Some(Step::Clean) => Ok(()),
                Some(Step::Bar) => {
                    let bar = Bar {
                        symbol: "SMCI".to_string(),
                        timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap(),
                        open: 1.0,
                        high: 1.0,
                        low: 1.0,
                        close: 1.0,
                        volume: 1.0,
                    };
                    let _ = bars.send(bar).await;
                    Ok(())
                }
                Some(Step::Hang) => std::future::pending().await,
                None => {
                    self.cancel.cancel();
                    Err(ProviderError::connection("cancelled"))
                }
            }
        }
    }

    fn cancel_after(cancel: &CancellationToken, delay: Duration) {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            cancel.cancel();
        });
    }

    #[test]
    fn test_policy_doubles_and_caps() {
        let mut policy = ReconnectPolicy::default();
        let delays: Vec<Duration> = (0..7).map(|_| policy.next_delay()).collect();
        let secs: Vec<u64> = delays.iter().map(Duration::as_secs).collect();
        assert_eq!(secs, [1, 2, 4, 8, 16, 30, 30]);
        policy.reset();
        assert_eq!(policy.current_delay(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_back_off_and_clean_close_resets() {
        let cancel = CancellationToken::new();
        let provider = ScriptedProvider::new(
            vec![Step::Fail, Step::Fail, Step::Fail, Step::Clean, Step::Fail],
            cancel.clone(),
        );
        let (tx, _rx) = mpsc::channel(8);

        run_stream_with_reconnect(
            &provider,
            &["SMCI".to_string()],
            tx,
            &mut ReconnectPolicy::default(),
            &cancel,
        )
        .await;

        let connects = provider.connects.lock().clone();
        let gaps: Vec<u64> = connects
            .windows(2)
            .map(|w| (w[1] - w[0]).as_secs())
            .collect();
        assert_eq!(connects.len(), 6);
        assert_eq!(gaps, [1, 2, 4, 0, 1]);
    }

    #[tokio::test]
    async fn test_bars_are_forwarded() {
        let cancel = CancellationToken::new();
        let provider = ScriptedProvider::new(vec![Step::Bar, Step::Bar], cancel.clone());
        let (tx, mut rx) = mpsc::channel(8);

        run_stream_with_reconnect(
            &provider,
            &["SMCI".to_string()],
            tx,
            &mut ReconnectPolicy::default(),
            &cancel,
        )
        .await;

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 2);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_backoff_sleep() {
        let cancel = CancellationToken::new();
        let steps = (0..10).map(|_| Step::Fail).collect();
        let provider = ScriptedProvider::new(steps, cancel.clone());
        let (tx, _rx) = mpsc::channel(8);
        let mut policy = ReconnectPolicy::new(Duration::from_secs(3), Duration::from_secs(30));

        cancel_after(&cancel, Duration::from_millis(50));
        let started = Instant::now();
        run_stream_with_reconnect(&provider, &["SMCI".to_string()], tx, &mut policy, &cancel)
            .await;

        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(provider.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_open_stream() {
        let cancel = CancellationToken::new();
        let provider = ScriptedProvider::new(vec![Step::Hang], cancel.clone());
        let (tx, _rx) = mpsc::channel(8);

        cancel_after(&cancel, Duration::from_millis(50));
        let started = Instant::now();
        run_stream_with_reconnect(
            &provider,
            &["SMCI".to_string()],
            tx,
            &mut ReconnectPolicy::default(),
            &cancel,
        )
        .await;

        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(provider.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_connect_never_streams() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let provider = ScriptedProvider::new(vec![Step::Fail], cancel.clone());
        let (tx, _rx) = mpsc::channel(8);

        run_stream_with_reconnect(
            &provider,
            &["SMCI".to_string()],
            tx,
            &mut ReconnectPolicy::default(),
            &cancel,
        )
        .await;

        assert_eq!(provider.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_stream() {
        let cancel = CancellationToken::new();
        let provider = ScriptedProvider::new(vec![Step::Clean, Step::Clean], cancel.clone());
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        run_stream_with_reconnect(
            &provider,
            &["SMCI".to_string()],
            tx,
            &mut ReconnectPolicy::default(),
            &cancel,
        )
        .await;

        assert_eq!(provider.connect_count(), 0);
        assert!(!cancel.is_cancelled());
    }

    proptest! {
        #[test]
        fn prop_delay_never_exceeds_cap(
            initial in 1u64..5_000,
            max in 1u64..60_000,
            failures in 1usize..40,
        ) {
            let mut policy = ReconnectPolicy::new(
                Duration::from_millis(initial),
                Duration::from_millis(max),
            );
            let cap = Duration::from_millis(max.max(initial));
            let mut previous = Duration::ZERO;
            for _ in 0..failures {
                let delay = policy.next_delay();
                prop_assert!(delay <= cap);
                prop_assert!(delay >= previous);
                previous = delay;
            }
        }
    }
}
