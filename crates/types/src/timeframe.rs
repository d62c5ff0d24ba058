/// Candle timeframe expressed in whole minutes within one hour.
///
/// Buckets are aligned by flooring the minute-of-hour, so only widths in
/// `1..=60` are meaningful. Parsed from `"<N>m"` or `"1h"`; the canonical
/// label is always `"<N>m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    minutes: u32,
}

/// Error parsing timeframe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeframeError(pub String);

impl std::fmt::Display for ParseTimeframeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unsupported timeframe: {}", self.0)
    }
}

impl std::error::Error for ParseTimeframeError {}

impl Timeframe {
    /// Largest supported bucket width.
    pub const MAX_MINUTES: u32 = 60;

    /// Ten-minute candles
    pub const DEFAULT: Self = Self { minutes: 10 };

    /// Provider bar granularity
    pub const ONE_MINUTE: Self = Self { minutes: 1 };

    /// Creates a timeframe from a minute count.
    ///
    /// # Errors
    /// Returns [`ParseTimeframeError`] when `minutes` is outside `1..=60`.
    pub fn from_minutes(minutes: u32) -> Result<Self, ParseTimeframeError> {
        if minutes == 0 || minutes > Self::MAX_MINUTES {
            return Err(ParseTimeframeError(format!("{minutes}m")));
        }
        Ok(Self { minutes })
    }

    /// Bucket width in minutes
    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Returns duration in seconds
    #[must_use]
    pub fn to_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60
    }

    /// Canonical label, e.g. "10m"
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}m", self.minutes)
    }
}

impl std::str::FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let minutes = if let Some(value) = trimmed.strip_suffix('m') {
            value.parse::<u32>().ok()
        } else if let Some(value) = trimmed.strip_suffix('h') {
            value.parse::<u32>().ok().and_then(|h| h.checked_mul(60))
        } else {
            None
        };

        minutes
            .and_then(|m| Self::from_minutes(m).ok())
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.minutes)
    }
}

impl TryFrom<String> for Timeframe {
    type Error = ParseTimeframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.label()
    }
}
