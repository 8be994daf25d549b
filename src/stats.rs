//! Aggregate statistics over decoded responses.
//!
//! Responses are grouped by type (largest group first, ties in first-seen
//! order). The session duration is the gap between the first and the last
//! timestamped response in file order; out-of-order captures may therefore
//! produce a negative duration.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local};
use humansize::{format_size, BINARY};

use crate::capture::Response;

/// Count and average size for one response type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStat {
    pub response_type: String,
    pub count: usize,
    /// Floor of the mean decompressed size
    pub average_size: usize,
    pub total_size: usize,
}

/// Summary of a decoded capture.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Per-type statistics, largest group first
    pub types: Vec<TypeStat>,
    pub total_responses: usize,
    pub timestamped_responses: usize,
    /// First timestamped response in file order
    pub first_timestamp: Option<DateTime<Local>>,
    /// Last timestamped response in file order
    pub last_timestamp: Option<DateTime<Local>>,
}

impl SessionStats {
    /// Aggregate responses given in file order.
    pub fn from_responses<'a, I>(responses: I) -> Self
    where
        I: IntoIterator<Item = &'a Response>,
    {
        let mut stats = SessionStats::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for response in responses {
            stats.total_responses += 1;

            let position = *positions
                .entry(response.response_type.clone())
                .or_insert_with(|| {
                    stats.types.push(TypeStat {
                        response_type: response.response_type.clone(),
                        count: 0,
                        average_size: 0,
                        total_size: 0,
                    });
                    stats.types.len() - 1
                });
            let entry = &mut stats.types[position];
            entry.count += 1;
            entry.total_size += response.decompressed_size;

            if let Some(timestamp) = response.timestamp {
                stats.timestamped_responses += 1;
                stats.first_timestamp.get_or_insert(timestamp);
                stats.last_timestamp = Some(timestamp);
            }
        }

        for entry in &mut stats.types {
            entry.average_size = entry.total_size / entry.count;
        }
        // Stable sort keeps first-seen order for equal counts
        stats.types.sort_by(|a, b| b.count.cmp(&a.count));
        stats
    }

    /// Last minus first timestamp, if at least two responses carry one.
    pub fn duration(&self) -> Option<Duration> {
        if self.timestamped_responses < 2 {
            return None;
        }
        Some(self.last_timestamp? - self.first_timestamp?)
    }

    /// Duration as `HH:MM:SS`, or "unknown".
    pub fn duration_display(&self) -> String {
        match self.duration() {
            Some(duration) => format_duration(duration),
            None => "unknown".to_string(),
        }
    }

    /// Look up the statistics for one type.
    pub fn get(&self, response_type: &str) -> Option<&TypeStat> {
        self.types
            .iter()
            .find(|stat| stat.response_type == response_type)
    }

    /// Format a summary for display
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Responses: {}", self.total_responses),
            format!("Response types: {}", self.types.len()),
            format!("Session duration: {}", self.duration_display()),
        ];
        if !self.types.is_empty() {
            lines.push(String::new());
        }
        for stat in &self.types {
            lines.push(format!(
                "   {}: {} (avg {})",
                stat.response_type,
                stat.count,
                format_size(stat.average_size, BINARY)
            ));
        }
        lines.join("\n")
    }
}

/// Format a duration as `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds();
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
