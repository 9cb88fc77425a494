//! Domain model for a single music composition entry. The struct mirrors the
//! JSON document stored on disk and gets passed throughout the TUI, so it
//! stays a light-weight data holder; presentation and persistence logic live
//! in other layers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// One composition entry with its descriptive metadata and named ratings.
/// There is no identity field; the title acts as the de facto key for
/// removal, though nothing enforces uniqueness and duplicate titles are
/// legal.
pub struct Composition {
    /// Title displayed in lists and used for case-insensitive removal.
    pub title: String,
    /// Musical genre, free text.
    pub genre: String,
    /// Performing or composing artist, free text.
    pub artist: String,
    /// Full lyrics. Only the detail view renders this field.
    pub lyrics: String,
    /// When the composition was created. Stored with a time component so the
    /// on-disk format round-trips as an ISO-8601 date-time string.
    pub creation_date: NaiveDateTime,
    /// Length in minutes.
    pub duration: f64,
    /// Distribution format, free text (e.g. "mp3", "vinyl").
    pub format: String,
    /// Named scores contributing to the average. Last write for a given
    /// label wins.
    #[serde(default)]
    pub ratings: BTreeMap<String, f64>,
}

impl Composition {
    /// Insert or overwrite the rating stored under `label`.
    pub fn add_rating(&mut self, label: impl Into<String>, value: f64) {
        self.ratings.insert(label.into(), value);
    }

    /// Arithmetic mean of all stored rating values, or 0 when none exist.
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let total: f64 = self.ratings.values().sum();
        total / self.ratings.len() as f64
    }
}

impl fmt::Display for Composition {
    /// Write every field plus the computed average as one human-readable
    /// line. Display is implemented so the type plays nicely with widgets
    /// that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' by {} (genre: {}, created: {}, duration: {} min, format: {}, \
             average rating: {:.2}, lyrics: {})",
            self.title,
            self.artist,
            self.genre,
            self.creation_date.format("%Y-%m-%d"),
            self.duration,
            self.format,
            self.average_rating(),
            self.lyrics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Composition {
        Composition {
            title: "Song A".to_string(),
            genre: "Pop".to_string(),
            artist: "X".to_string(),
            lyrics: "la la la".to_string(),
            creation_date: NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            duration: 3.5,
            format: "mp3".to_string(),
            ratings: BTreeMap::new(),
        }
    }

    #[test]
    fn average_rating_is_zero_without_ratings() {
        assert_eq!(sample().average_rating(), 0.0);
    }

    #[test]
    fn average_rating_is_the_mean_of_all_values() {
        let mut composition = sample();
        composition.add_rating("a", 3.0);
        composition.add_rating("b", 5.0);
        assert_eq!(composition.average_rating(), 4.0);
    }

    #[test]
    fn add_rating_overwrites_an_existing_label() {
        let mut composition = sample();
        composition.add_rating("quality", 2.0);
        composition.add_rating("quality", 4.0);
        assert_eq!(composition.ratings.len(), 1);
        assert_eq!(composition.average_rating(), 4.0);
    }

    #[test]
    fn display_carries_the_title_and_average() {
        let mut composition = sample();
        composition.add_rating("quality", 4.0);
        let line = composition.to_string();
        assert!(line.contains("'Song A'"));
        assert!(line.contains("average rating: 4.00"));
    }
}
