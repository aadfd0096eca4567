//! Boilerplate removal.
//!
//! Slide decks repeat course headers and footers on every slide. Any line
//! that recurs across enough segments of one artifact is treated as
//! boilerplate and dropped from all of them.

use std::collections::{HashMap, HashSet};

/// Minimum number of segments before recurrence statistics are meaningful.
const MIN_SEGMENTS_FOR_DETECTION: usize = 3;

/// Remove recurring header/footer lines from a lecture's segments.
///
/// A line counts as boilerplate when it appears, trimmed, in more than
/// `threshold` of the segments (and in at least three of them). Line order
/// within each segment is preserved.
pub fn strip_boilerplate(segments: &[String], threshold: f32) -> Vec<String> {
    if segments.len() < MIN_SEGMENTS_FOR_DETECTION {
        return segments.to_vec();
    }

    let mut line_counts: HashMap<&str, usize> = HashMap::new();
    for segment in segments {
        // Count each distinct line once per segment.
        let distinct: HashSet<&str> = segment
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        for line in distinct {
            *line_counts.entry(line).or_insert(0) += 1;
        }
    }

    let cutoff = (segments.len() as f32 * threshold).max(MIN_SEGMENTS_FOR_DETECTION as f32 - 1.0);
    let boilerplate: HashSet<&str> = line_counts
        .into_iter()
        .filter(|(_, count)| *count as f32 > cutoff)
        .map(|(line, _)| line)
        .collect();

    if boilerplate.is_empty() {
        return segments.to_vec();
    }

    segments
        .iter()
        .map(|segment| {
            segment
                .lines()
                .filter(|line| !boilerplate.contains(line.trim()))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .collect()
}
