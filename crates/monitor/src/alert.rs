//! Alert payloads and the dry-run sink.

use divmon_strategy::format_pivot_timestamp;
use divmon_types::{DivergenceSignal, SignalKind};
use serde::{Deserialize, Serialize};

use crate::collaborators::AlertSink;
use crate::error::AlertError;

/// Embed colour for bullish alerts (green)
pub const BULLISH_COLOR: u32 = 3_066_993;
/// Embed colour for bearish alerts (red)
pub const BEARISH_COLOR: u32 = 15_158_332;

/// One name/value row of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field label
    pub name: String,
    /// Field content
    pub value: String,
    /// Render next to the previous field
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

/// Rich alert body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// e.g. "Bullish divergence (strong)"
    pub title: String,
    /// Symbol, Timeframe, Pivot, Confirmations, Reason
    pub fields: Vec<EmbedField>,
    /// RGB colour as an integer
    pub color: u32,
}

/// Webhook-style alert payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Always a single embed
    pub embeds: Vec<Embed>,
}

impl AlertPayload {
    /// Builds the payload for a signal.
    #[must_use]
    pub fn from_signal(signal: &DivergenceSignal) -> Self {
        let (label, color) = match signal.kind {
            SignalKind::Bullish => ("Bullish", BULLISH_COLOR),
            SignalKind::Bearish => ("Bearish", BEARISH_COLOR),
        };
        let confirmations = if signal.confirmations.is_empty() {
            "None".to_string()
        } else {
            signal
                .confirmations
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let embed = Embed {
            title: format!("{label} divergence ({})", signal.strength),
            fields: vec![
                EmbedField::new("Symbol", signal.symbol.clone(), true),
                EmbedField::new("Timeframe", signal.timeframe.clone(), true),
                EmbedField::new("Pivot", format_pivot_timestamp(&signal.pivot_timestamp), false),
                EmbedField::new("Confirmations", confirmations, false),
                EmbedField::new("Reason", signal.reason.clone(), false),
            ],
            color,
        };
        Self {
            embeds: vec![embed],
        }
    }

    /// Serialises the payload as compact JSON.
    ///
    /// # Errors
    /// Returns [`AlertError::Encode`] if encoding fails.
    pub fn to_json(&self) -> Result<String, AlertError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Sink that logs payloads instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

impl AlertSink for DryRunSink {
    fn deliver(&self, payload: &AlertPayload) -> Result<(), AlertError> {
        tracing::info!("DRY_RUN enabled. Payload: {}", payload.to_json()?);
        Ok(())
    }
}
