//! Parsed result-line model.
//!
//! A source-channel message is a single line such as
//! `#N881. 6(A♠6♠) ✅ 7(3♦4♣) #T12`. The parser turns it into a
//! [`ParsedMessage`]; everything downstream works on that shape only.

use serde::{Deserialize, Serialize};

/// Card rank vocabulary recognised inside a card group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Map a rank token (`"2"`..`"10"`, `"J"`, `"Q"`, `"K"`, `"A"`).
    ///
    /// Anything outside the vocabulary yields `None` and is ignored by the
    /// parser rather than rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "2" => Some(Self::Two),
            "3" => Some(Self::Three),
            "4" => Some(Self::Four),
            "5" => Some(Self::Five),
            "6" => Some(Self::Six),
            "7" => Some(Self::Seven),
            "8" => Some(Self::Eight),
            "9" => Some(Self::Nine),
            "10" => Some(Self::Ten),
            "J" => Some(Self::Jack),
            "Q" => Some(Self::Queen),
            "K" => Some(Self::King),
            "A" => Some(Self::Ace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        }
    }
}

/// One `<total>(<cards>)` group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardGroup {
    pub total: u32,
    /// Cards in order of appearance; duplicates are kept so sixes can be counted.
    pub cards: Vec<Rank>,
}

impl CardGroup {
    pub fn has_six(&self) -> bool {
        self.cards.contains(&Rank::Six)
    }

    pub fn six_count(&self) -> usize {
        self.cards.iter().filter(|rank| **rank == Rank::Six).count()
    }
}

/// Fields extracted from one source-channel message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// Game number the line refers to.
    pub sequence_id: u64,
    /// Carries a confirmed or alternate-confirmed marker.
    pub finalized: bool,
    /// Carries an in-edit marker; such lines are re-sent later as edits.
    pub in_edit: bool,
    /// Carries the alternate-confirmed marker.
    #[serde(default)]
    pub alternate_confirmed: bool,
    /// At most two groups, in order of first appearance.
    pub card_groups: Vec<CardGroup>,
    /// The `#T` value.
    pub metric: Option<f64>,
    /// Tie marker present.
    pub tie: bool,
    /// Leading digits of the first group; the value compared against thresholds.
    pub first_group_point: Option<u32>,
}

impl ParsedMessage {
    pub fn first_group(&self) -> Option<&CardGroup> {
        self.card_groups.first()
    }

    pub fn second_group(&self) -> Option<&CardGroup> {
        self.card_groups.get(1)
    }

    /// Total number of rank-6 cards across all groups.
    pub fn six_count(&self) -> usize {
        self.card_groups.iter().map(CardGroup::six_count).sum()
    }
}

/// Inbound message event as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw text of the message.
    pub text: String,
    /// True when the event is an edit of an earlier message.
    #[serde(default)]
    pub edited: bool,
    /// Channel the event came from, when the transport reports it.
    #[serde(default)]
    pub channel_id: Option<i64>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            edited: false,
            channel_id: None,
        }
    }

    pub fn edited(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            edited: true,
            channel_id: None,
        }
    }

    pub fn from_channel(mut self, channel_id: i64) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    /// Whether the event passes a source-channel filter. Events without a
    /// channel always pass.
    pub fn is_from(&self, source_channel: Option<i64>) -> bool {
        match (source_channel, self.channel_id) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        }
    }
}
