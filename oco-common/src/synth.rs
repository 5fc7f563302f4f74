//! Turning decoded records into timed, client-consumable structures

use serde::Serialize;

/// Alignment frame length in seconds
pub const ALIGNMENT_HOP: f64 = 0.01;

/// Pitch sample length in seconds when no audio duration is known
pub const PITCH_HOP: f64 = 0.01;

/// Seconds per word when spreading a transcript without a known duration
pub const WORD_SECONDS: f64 = 0.25;

/// One timed, named interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub interval: [f64; 2],
    pub name: String,
}

/// Uniformly sampled pitch track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchContour {
    pub hop: f64,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodicity: Option<Vec<f64>>,
}

/// One fixed-width frame per token
///
/// Token `i` spans `[i * hop, (i + 1) * hop]`. Repeated tokens are not
/// merged. Endpoints are rounded to the microsecond so that frame edges
/// compare equal across neighbours.
pub fn alignment_intervals(tokens: &[String], hop: f64) -> Vec<Segment> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| Segment {
            interval: [
                round_to(i as f64 * hop, 6),
                round_to((i + 1) as f64 * hop, 6),
            ],
            name: token.clone(),
        })
        .collect()
}

/// Pitch payload with its sample hop
///
/// With a positive duration and at least one value the hop is
/// `duration / len` rounded to milliseconds; otherwise `default_hop`.
pub fn pitch_contour(
    values: Vec<f64>,
    periodicity: Option<Vec<f64>>,
    duration: Option<f64>,
    default_hop: f64,
) -> PitchContour {
    let hop = match duration {
        Some(d) if d > 0.0 && !values.is_empty() => round_to(d / values.len() as f64, 3),
        _ => default_hop,
    };
    PitchContour {
        hop,
        values,
        periodicity,
    }
}

/// Spread the words of `text` evenly over `duration`
///
/// Without a duration each word gets [`WORD_SECONDS`].
pub fn word_intervals(text: &str, duration: Option<f64>) -> Vec<Segment> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let total = duration.unwrap_or(WORD_SECONDS * words.len() as f64);
    let per_word = total / words.len() as f64;

    words
        .iter()
        .enumerate()
        .map(|(i, word)| Segment {
            interval: [
                round_to(i as f64 * per_word, 6),
                round_to((i + 1) as f64 * per_word, 6),
            ],
            name: word.to_string(),
        })
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_alignment_intervals_fixed_frames() {
        let segments = alignment_intervals(&tokens(&["a", "b", "c"]), ALIGNMENT_HOP);
        assert_eq!(
            segments,
            vec![
                Segment { interval: [0.0, 0.01], name: "a".to_string() },
                Segment { interval: [0.01, 0.02], name: "b".to_string() },
                Segment { interval: [0.02, 0.03], name: "c".to_string() },
            ]
        );
    }

    #[test]
    fn test_alignment_intervals_contiguous_and_unmerged() {
        let input = tokens(&["sil", "sil", "a", "a", "a", "sil"]);
        let segments = alignment_intervals(&input, ALIGNMENT_HOP);

        assert_eq!(segments.len(), input.len());
        for pair in segments.windows(2) {
            assert_eq!(pair[0].interval[1], pair[1].interval[0]);
        }
        assert_eq!(segments[0].interval[0], 0.0);
        assert_eq!(segments[5].interval[1], 0.06);
        let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["sil", "sil", "a", "a", "a", "sil"]);
    }

    #[test]
    fn test_alignment_intervals_empty() {
        assert!(alignment_intervals(&[], ALIGNMENT_HOP).is_empty());
    }

    #[test]
    fn test_alignment_intervals_long_sequence_has_no_drift() {
        let input: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
        let segments = alignment_intervals(&input, ALIGNMENT_HOP);
        assert_eq!(segments[999].interval, [9.99, 10.0]);
    }

    #[test]
    fn test_pitch_hop_from_duration() {
        let contour = pitch_contour(vec![1.0, 2.0, 3.0, 4.0], None, Some(0.4), PITCH_HOP);
        assert_eq!(contour.hop, 0.1);
        assert_eq!(contour.values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_pitch_hop_rounded_to_milliseconds() {
        let contour = pitch_contour(vec![0.0; 3], None, Some(1.0), PITCH_HOP);
        assert_eq!(contour.hop, 0.333);
    }

    #[test]
    fn test_pitch_hop_default_without_usable_duration() {
        assert_eq!(pitch_contour(vec![1.0], None, None, PITCH_HOP).hop, PITCH_HOP);
        assert_eq!(pitch_contour(vec![1.0], None, Some(0.0), PITCH_HOP).hop, PITCH_HOP);
        assert_eq!(pitch_contour(vec![1.0], None, Some(-2.0), PITCH_HOP).hop, PITCH_HOP);
        assert_eq!(pitch_contour(vec![], None, Some(2.0), PITCH_HOP).hop, PITCH_HOP);
    }

    #[test]
    fn test_pitch_periodicity_omitted_when_absent() {
        let json = serde_json::to_value(pitch_contour(vec![1.0], None, None, PITCH_HOP)).unwrap();
        assert!(json.get("periodicity").is_none());

        let json = serde_json::to_value(pitch_contour(vec![1.0], Some(vec![]), None, PITCH_HOP)).unwrap();
        assert_eq!(json["periodicity"], serde_json::json!([]));
    }

    #[test]
    fn test_word_intervals_with_duration() {
        let segments = word_intervals("hello big world", Some(1.5));
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].interval, [0.0, 0.5]);
        assert_eq!(segments[2].interval, [1.0, 1.5]);
        assert_eq!(segments[1].name, "big");
    }

    #[test]
    fn test_word_intervals_default_word_length() {
        let segments = word_intervals("a b", None);
        assert_eq!(segments[1].interval, [0.25, 0.5]);
        assert!(word_intervals("   ", Some(1.0)).is_empty());
    }
}
