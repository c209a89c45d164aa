//! Result-line parser.
//!
//! Extracts the game number, finalization state, card groups, `#T` metric
//! and tie marker from one source-channel message. Every extraction is
//! total: a missing field is `None`/`false`, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::domain::models::{CardGroup, ParsedMessage, Rank};

/// Confirmed and alternate-confirmed markers.
const FINAL_MARKERS: [char; 2] = ['✅', '🔰'];

const ALTERNATE_MARKER: char = '🔰';

/// Markers of a result line still being edited.
const IN_EDIT_MARKERS: [char; 2] = ['⏰', '🕐'];

/// Compound tie marker.
const TIE_MARKER: &str = "🟣#X";

/// Groups kept per message.
const MAX_GROUPS: usize = 2;

static GAME_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#N\s*(\d+)").expect("valid regex"));

static CARD_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:✅|🔰)?(\d+)\(([^)]+)\)").expect("valid regex"));

static FIRST_GROUP_POINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:✅|🔰)?(\d+)\(").expect("valid regex"));

static CARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+|[AKQJ])(?:♠|♥|♦|♣)").expect("valid regex"));

static METRIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#T(\d+(?:\.\d+)?)").expect("valid regex"));

/// Parse one message. `None` means the text carries no game number and
/// must be ignored.
pub fn parse(text: &str) -> Option<ParsedMessage> {
    let sequence_id = game_number(text)?;
    let in_edit = text.contains(IN_EDIT_MARKERS);
    let finalized = text.contains(FINAL_MARKERS);

    let parsed = ParsedMessage {
        sequence_id,
        finalized,
        in_edit,
        alternate_confirmed: text.contains(ALTERNATE_MARKER),
        card_groups: card_groups(text),
        metric: metric(text),
        tie: text.contains(TIE_MARKER),
        first_group_point: first_group_point(text),
    };
    trace!(
        sequence_id,
        finalized,
        groups = parsed.card_groups.len(),
        metric = ?parsed.metric,
        "parsed result line"
    );
    Some(parsed)
}

/// Game number from `#N<digits>`.
pub fn game_number(text: &str) -> Option<u64> {
    GAME_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Card groups in order of appearance, at most two.
pub fn card_groups(text: &str) -> Vec<CardGroup> {
    CARD_GROUP
        .captures_iter(text)
        .filter_map(|caps| {
            let total = caps.get(1)?.as_str().parse().ok()?;
            let cards = caps.get(2).map_or_else(Vec::new, |m| cards(m.as_str()));
            Some(CardGroup { total, cards })
        })
        .take(MAX_GROUPS)
        .collect()
}

fn cards(group: &str) -> Vec<Rank> {
    CARD.captures_iter(group)
        .filter_map(|caps| caps.get(1).and_then(|m| Rank::from_token(m.as_str())))
        .collect()
}

/// First `#T` value.
pub fn metric(text: &str) -> Option<f64> {
    METRIC
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Leading digits of the first `<digits>(`; the point value compared
/// against outcome thresholds.
pub fn first_group_point(text: &str) -> Option<u32> {
    FIRST_GROUP_POINT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINAL_LINE: &str = "#N881. 6(A♠6♠) ✅ 7(3♦4♣) #T12 ";

    #[test]
    fn test_parse_final_line() {
        let msg = parse(FINAL_LINE).unwrap();
        assert_eq!(msg.sequence_id, 881);
        assert!(msg.finalized);
        assert!(!msg.in_edit);
        assert!(!msg.tie);
        assert_eq!(msg.metric, Some(12.0));
        assert_eq!(msg.first_group_point, Some(6));
        assert_eq!(msg.card_groups.len(), 2);
        assert_eq!(msg.card_groups[0].total, 6);
        assert_eq!(msg.card_groups[0].cards, vec![Rank::Ace, Rank::Six]);
        assert_eq!(msg.card_groups[1].cards, vec![Rank::Three, Rank::Four]);
    }

    #[test]
    fn test_no_game_number_is_ignored() {
        assert!(parse("6(A♠6♠) ✅ 7(3♦4♣) #T12").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_in_edit_line_is_not_final() {
        let msg = parse("#N12. ⏰5(K♠4♦) - 3(2♣A♥)").unwrap();
        assert!(!msg.finalized);
        assert!(msg.in_edit);

    }

    #[test]
    fn test_confirmed_line_still_marked_in_edit() {
        let msg = parse("#N12. 🕐5(K♠4♦) ✅ 3(2♣A♥)").unwrap();
        assert!(msg.finalized);
        assert!(msg.in_edit);
        assert!(!msg.alternate_confirmed);
    }

    #[test]
    fn test_alternate_confirmed_marker() {
        let msg = parse("#N25. 5(Q♣️6♥️5♣️) 🔰 5(3♣️9♦️3♠️) #T10 🟣#X").unwrap();
        assert!(msg.finalized);
        assert!(msg.alternate_confirmed);
        assert!(msg.tie);
        assert_eq!(msg.card_groups[0].cards, vec![Rank::Queen, Rank::Six, Rank::Five]);
        assert_eq!(msg.metric, Some(10.0));
    }

    #[test]
    fn test_marker_prefixed_group_point() {
        assert_eq!(first_group_point("#N5. ✅8(K♠8♦) - 7(3♦4♣)"), Some(8));
        assert_eq!(first_group_point("#N5. 🔰3(K♠3♦) - 3(3♦Q♣)"), Some(3));
        assert_eq!(first_group_point("#N5. nothing here"), None);
    }

    #[test]
    fn test_ten_and_unknown_tokens() {
        let groups = card_groups("#N1. 9(10♥9♠1♣) ✅ 2(J♦2♠)");
        assert_eq!(groups[0].cards, vec![Rank::Ten, Rank::Nine]);
        assert_eq!(groups[1].cards, vec![Rank::Jack, Rank::Two]);
    }

    #[test]
    fn test_at_most_two_groups() {
        let groups = card_groups("#N1. 1(A♠) 2(2♠) 3(3♠)");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].total, 2);
    }

    #[test]
    fn test_decimal_metric() {
        assert_eq!(metric("#N3. 4(2♠2♦) ✅ 9(9♣) #T10.5"), Some(10.5));
        assert_eq!(metric("#N3. 4(2♠2♦) ✅ 9(9♣)"), None);
    }

    #[test]
    fn test_game_number_with_space() {
        assert_eq!(game_number("#N 42. 1(A♠)"), Some(42));
    }
}
