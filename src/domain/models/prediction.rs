//! Prediction domain model.
//!
//! A [`PredictionRecord`] is created when the trigger policy fires (or when
//! an imported schedule entry is launched), advanced by the verifier as
//! later result lines arrive, and frozen once it reaches a terminal status.
//! The published message text is always produced by [`PredictionRecord::render`]
//! so edits replace the whole text instead of patching tokens in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Predicted outcome category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// First group ends high (`P+6,5`). Domain name "joueur".
    #[serde(alias = "joueur")]
    Player,
    /// First group ends low (`M-4,5`). Domain name "banquier".
    #[serde(alias = "banquier")]
    Banker,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Banker => "banker",
        }
    }

    /// Recognise a free-form label such as `"Joueur"`, `"victoire banquier"`
    /// or `"Banker"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        if lower.contains("banquier") || lower.contains("banker") {
            Some(Self::Banker)
        } else if lower.contains("joueur") || lower.contains("player") {
            Some(Self::Player)
        } else {
            None
        }
    }

    /// Badge shown in the published message.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Player => "🅿️+6,5",
            Self::Banker => "Ⓜ️-4,,5",
        }
    }
}

/// Verification status of a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PredictionStatus {
    #[default]
    Pending,
    /// Verified at the given offset past the predicted game.
    Success { offset: u32 },
    Failure,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Status token embedded in the published text.
    pub fn token(&self) -> String {
        match self {
            Self::Pending => "⏳".to_string(),
            Self::Success { offset } => success_token(*offset),
            Self::Failure => "❌".to_string(),
        }
    }
}

/// `✅0️⃣` for a first-attempt success up to `✅🔟` for the eleventh.
pub fn success_token(offset: u32) -> String {
    match offset {
        0..=9 => format!("✅{offset}\u{fe0f}\u{20e3}"),
        10 => "✅🔟".to_string(),
        _ => format!("✅{offset}"),
    }
}

/// Reference to a message published on the display channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: i64,
    pub message_id: i64,
}

/// One in-flight or resolved prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Predicted game number as a string; also the map key.
    pub key: String,
    pub predicted_id: u64,
    pub expected_outcome: Outcome,
    /// Next offset to test, i.e. the number of attempts consumed.
    #[serde(default)]
    pub offset: u32,
    /// Inclusive upper bound on the tested offset.
    pub max_offset: u32,
    #[serde(default)]
    pub status: PredictionStatus,
    #[serde(default)]
    pub verified: bool,
    /// Published message to edit on resolution.
    #[serde(default)]
    pub external_ref: Option<MessageRef>,
    /// Game number that triggered the prediction, if live.
    #[serde(default)]
    pub source_id: Option<u64>,
    /// `#T` value that chose the outcome, if live.
    #[serde(default)]
    pub metric: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PredictionRecord {
    pub fn new(predicted_id: u64, expected_outcome: Outcome, max_offset: u32) -> Self {
        Self {
            key: predicted_id.to_string(),
            predicted_id,
            expected_outcome,
            offset: 0,
            max_offset,
            status: PredictionStatus::Pending,
            verified: false,
            external_ref: None,
            source_id: None,
            metric: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source_id: u64, metric: f64) -> Self {
        self.source_id = Some(source_id);
        self.metric = Some(metric);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.verified || self.status.is_terminal()
    }

    /// Move to a terminal status. Returns `false` if already terminal.
    pub fn resolve(&mut self, status: PredictionStatus) -> bool {
        if self.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.verified = true;
        self.resolved_at = Some(Utc::now());
        true
    }

    /// Full text of the published message for the current status.
    pub fn render(&self) -> String {
        render(self.predicted_id, self.expected_outcome, self.status)
    }
}

/// Render a prediction line: `🔵882:🅿️+6,5🔵statut :⏳`.
pub fn render(predicted_id: u64, outcome: Outcome, status: PredictionStatus) -> String {
    format!(
        "🔵{predicted_id}:{}🔵statut :{}",
        outcome.badge(),
        status.token()
    )
}
