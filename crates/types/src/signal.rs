use chrono::{DateTime, FixedOffset};

/// Direction of a divergence signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Price lower low, RSI higher low
    Bullish,
    /// Price higher high, RSI lower high
    Bearish,
}

impl SignalKind {
    /// Lowercase wire name, also used in signal identity keys
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Bullish => "bullish",
            SignalKind::Bearish => "bearish",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength classification derived from confirmations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    /// RSI-only, or a subset of confirmations
    Normal,
    /// All requested confirmations fired
    Strong,
}

impl Strength {
    /// Lowercase wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::Normal => "normal",
            Strength::Strong => "strong",
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auxiliary oscillator that corroborated a divergence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    /// MACD histogram rising / line above signal (mirrored for bearish)
    Macd,
    /// K/D crossover or oversold/overbought drift
    Kdj,
}

impl Confirmation {
    /// Lowercase wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Confirmation::Macd => "macd",
            Confirmation::Kdj => "kdj",
        }
    }
}

/// Divergence signal produced by one evaluation call
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DivergenceSignal {
    /// Ticker symbol
    pub symbol: String,
    /// Timeframe label
    pub timeframe: String,
    /// Bullish or bearish
    pub kind: SignalKind,
    /// Normal or strong
    pub strength: Strength,
    /// Confirmations that fired, in `macd`, `kdj` order
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
    /// Index of the earlier pivot
    pub earlier_pivot: usize,
    /// Index of the later pivot
    pub later_pivot: usize,
    /// Timestamp of the later pivot candle
    pub pivot_timestamp: DateTime<FixedOffset>,
    /// Human-readable explanation
    pub reason: String,
}

impl DivergenceSignal {
    /// Comma separated confirmation names, or "none"
    #[must_use]
    pub fn confirmations_label(&self) -> String {
        if self.confirmations.is_empty() {
            "none".to_string()
        } else {
            self.confirmations
                .iter()
                .map(Confirmation::as_str)
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    /// Converts an accepted signal into a replay event.
    #[must_use]
    pub fn to_event(&self) -> SignalEvent {
        SignalEvent {
            symbol: self.symbol.clone(),
            kind: self.kind,
            strength: self.strength,
            confirmations: self.confirmations.clone(),
            pivot_index: self.later_pivot,
            pivot_timestamp: self.pivot_timestamp,
        }
    }
}

/// Accepted signal as consumed by the portfolio simulator and metrics
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SignalEvent {
    /// Ticker symbol
    pub symbol: String,
    /// Bullish or bearish
    pub kind: SignalKind,
    /// Normal or strong
    pub strength: Strength,
    /// Confirmations that fired
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
    /// Candle index of the later pivot
    pub pivot_index: usize,
    /// Timestamp of the later pivot candle
    pub pivot_timestamp: DateTime<FixedOffset>,
}
