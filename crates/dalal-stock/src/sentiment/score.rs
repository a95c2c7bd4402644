//! Per-article sentiment scoring
//!
//! Each article gets a base score from its sentiment label (+3/0/-3), a
//! time weight in [0.01, 0.24] derived from its publish timestamp, and a
//! total score where the weight amplifies the base score's magnitude:
//! `total = base + base × weight`. A positive article published within the
//! hour scores +3.72, not a discounted value.

use crate::tz;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use dalal_core::{SentimentLabel, SentimentPrediction};

/// Weight of an article published within the last hour
pub const MAX_TIME_WEIGHT: f64 = 0.24;

/// Weight floor: articles a day old or with unparsable dates
pub const MIN_TIME_WEIGHT: f64 = 0.01;

/// Timestamp formats carrying an explicit offset, tried first
const AWARE_FORMATS: &[&str] = &["%a, %d %b %Y %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%z"];

/// Date-time formats without an offset
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%a, %d %b %Y %H:%M:%S"];

/// Date-only formats, read as midnight
const DATE_FORMATS: &[&str] = &["%a %b %d, %Y", "%d %b %Y"];

/// Lexical tie-breakers for the model's sentiment label
const POSITIVE_WORDS: &[&str] = &[
    "up", "rise", "gain", "positive", "growth", "profit", "beat", "surge", "jump", "higher",
];
const NEGATIVE_WORDS: &[&str] = &[
    "down", "fall", "loss", "negative", "decline", "drop", "miss", "plunge", "lower", "worse",
];

/// Parse a publish timestamp against the ordered format list
///
/// The first format that parses wins. Returns `None` when nothing does.
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let ist = tz::ist();

    for format in AWARE_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return ist
                .from_local_datetime(&parsed)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            let midnight = parsed.and_hms_opt(0, 0, 0)?;
            return ist
                .from_local_datetime(&midnight)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    None
}

/// Time weight of an article published at `raw`, evaluated at `now`
///
/// Unparsable timestamps fall to the minimum weight rather than erroring.
pub fn time_weight_at(raw: &str, now: DateTime<Utc>) -> f64 {
    let Some(published) = parse_publish_date(raw) else {
        tracing::debug!(date = raw, "unparsable publish date, using minimum weight");
        return MIN_TIME_WEIGHT;
    };

    let hours = (now - published).num_seconds() as f64 / 3600.0;
    decay(hours)
}

/// Time weight evaluated at the current instant
pub fn time_weight(raw: &str) -> f64 {
    time_weight_at(raw, Utc::now())
}

/// The decay curve: 24% inside the first hour, minus one percentage point
/// per further hour, floored at 1% from the 24th hour on
pub(crate) fn decay(hours: f64) -> f64 {
    if hours < 1.0 {
        MAX_TIME_WEIGHT
    } else if hours < 24.0 {
        (MAX_TIME_WEIGHT - (hours - 1.0) * 0.01).max(MIN_TIME_WEIGHT)
    } else {
        MIN_TIME_WEIGHT
    }
}

/// Base score for a sentiment label
pub fn base_score(label: SentimentLabel) -> f64 {
    match label {
        SentimentLabel::Positive => 3.0,
        SentimentLabel::Neutral => 0.0,
        SentimentLabel::Negative => -3.0,
    }
}

/// Total score: the time weight amplifies the base score's magnitude
pub fn total_score(base: f64, weight: f64) -> f64 {
    base + base * weight
}

/// Override the model's label when the lexical keyword count disagrees
///
/// A strict majority of matched keywords wins and lifts the confidence to
/// at least 0.7; an exact tie keeps the model's label at confidence ≥ 0.6.
pub fn refine_with_lexicon(text: &str, model: SentimentPrediction) -> SentimentPrediction {
    let lowered = text.to_lowercase();
    let positives = POSITIVE_WORDS
        .iter()
        .filter(|w| lowered.contains(*w))
        .count();
    let negatives = NEGATIVE_WORDS
        .iter()
        .filter(|w| lowered.contains(*w))
        .count();

    if positives > negatives {
        SentimentPrediction::new(SentimentLabel::Positive, model.confidence.max(0.7))
    } else if negatives > positives {
        SentimentPrediction::new(SentimentLabel::Negative, model.confidence.max(0.7))
    } else {
        SentimentPrediction::new(model.label, model.confidence.max(0.6))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rfc2822_ago(now: DateTime<Utc>, hours: f64) -> String {
        let published = now - Duration::seconds((hours * 3600.0) as i64);
        published.format("%a, %d %b %Y %H:%M:%S %z").to_string()
    }

    #[test]
    fn test_weight_is_max_inside_first_hour() {
        let now = Utc::now();
        assert_eq!(time_weight_at(&rfc2822_ago(now, 0.5), now), MAX_TIME_WEIGHT);
    }

    #[test]
    fn test_weight_is_min_after_a_day() {
        let now = Utc::now();
        assert_eq!(time_weight_at(&rfc2822_ago(now, 30.0), now), MIN_TIME_WEIGHT);
        assert_eq!(time_weight_at(&rfc2822_ago(now, 24.0), now), MIN_TIME_WEIGHT);
    }

    #[test]
    fn test_weight_decays_linearly() {
        // 10 hours old: 0.24 - 9 * 0.01 = 0.15
        assert!((decay(10.0) - 0.15).abs() < 1e-9);
        // 2 hours old: 0.23
        assert!((decay(2.0) - 0.23).abs() < 1e-9);
    }

    #[test]
    fn test_weight_monotone_in_age() {
        let mut last = decay(1.0);
        for tenths in 11..=240 {
            let weight = decay(f64::from(tenths) / 10.0);
            assert!(weight <= last, "weight must not grow with age");
            last = weight;
        }
    }

    #[test]
    fn test_unparsable_date_gets_minimum_weight() {
        let now = Utc::now();
        assert_eq!(time_weight_at("yesterday-ish", now), MIN_TIME_WEIGHT);
        assert_eq!(time_weight_at("", now), MIN_TIME_WEIGHT);
    }

    #[test]
    fn test_naive_formats_parse() {
        assert!(parse_publish_date("2026-08-01 09:30:00").is_some());
        assert!(parse_publish_date("01 Aug 2026").is_some());
        assert!(parse_publish_date("Sat Aug 01, 2026").is_some());
    }

    #[test]
    fn test_score_worked_examples() {
        // Positive article half an hour old: 3 + 3 * 0.24 = 3.72
        let total = total_score(base_score(SentimentLabel::Positive), decay(0.5));
        assert!((total - 3.72).abs() < 1e-9);

        // Negative article ten hours old: -3 + (-3 * 0.15) = -3.45
        let total = total_score(base_score(SentimentLabel::Negative), decay(10.0));
        assert!((total + 3.45).abs() < 1e-9);

        // Neutral scores zero at any age
        let total = total_score(base_score(SentimentLabel::Neutral), decay(0.1));
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_lexicon_majority_overrides_model() {
        let model = SentimentPrediction::new(SentimentLabel::Negative, 0.55);
        let refined = refine_with_lexicon("Shares surge on profit beat", model);
        assert_eq!(refined.label, SentimentLabel::Positive);
        assert!(refined.confidence >= 0.7);
    }

    #[test]
    fn test_lexicon_tie_keeps_model_label() {
        // One positive ("gain") and one negative ("loss") keyword
        let model = SentimentPrediction::new(SentimentLabel::Neutral, 0.4);
        let refined = refine_with_lexicon("gain for some, loss for others", model);
        assert_eq!(refined.label, SentimentLabel::Neutral);
        assert!((refined.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_lexicon_does_not_lower_confident_model() {
        let model = SentimentPrediction::new(SentimentLabel::Positive, 0.95);
        let refined = refine_with_lexicon("stock continues to surge higher", model);
        assert_eq!(refined.confidence, 0.95);
    }
}
