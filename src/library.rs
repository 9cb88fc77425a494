//! In-memory collection of compositions for one session. The library is an
//! ordered sequence: entries keep their append order until a sort reorders
//! them or a removal shrinks them, and no ordering survives a save/load
//! cycle beyond the order the entries were written in.

use std::cmp::Ordering;

use crate::models::Composition;

/// Keys the library knows how to sort by. Title and artist compare
/// case-insensitively; average rating sorts descending with ties left in
/// arbitrary order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Artist,
    AverageRating,
}

/// The ordered set of compositions held in memory for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct Library {
    compositions: Vec<Composition>,
}

impl Library {
    /// Start with an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-deserialized sequence, preserving its order.
    pub fn from_compositions(compositions: Vec<Composition>) -> Self {
        Self { compositions }
    }

    /// Add a composition at the end. No uniqueness check; duplicate titles
    /// are accepted.
    pub fn append(&mut self, composition: Composition) {
        self.compositions.push(composition);
    }

    /// Remove every composition matching `predicate` and return how many
    /// were dropped. Zero matches leaves the collection untouched.
    pub fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&Composition) -> bool,
    {
        let before = self.compositions.len();
        self.compositions.retain(|composition| !predicate(composition));
        before - self.compositions.len()
    }

    /// Count entries whose title equals `title` case-insensitively. The
    /// remove flow shows this number before asking for confirmation.
    pub fn count_titled(&self, title: &str) -> usize {
        let needle = title.to_lowercase();
        self.compositions
            .iter()
            .filter(|composition| composition.title.to_lowercase() == needle)
            .count()
    }

    /// Remove every entry whose title equals `title` case-insensitively and
    /// return the removed count.
    pub fn remove_titled(&mut self, title: &str) -> usize {
        let needle = title.to_lowercase();
        self.remove_where(|composition| composition.title.to_lowercase() == needle)
    }

    /// Reorder the collection in place by the given key.
    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Title => self
                .compositions
                .sort_by(|a, b| compare_case_insensitive(&a.title, &b.title)),
            SortKey::Artist => self
                .compositions
                .sort_by(|a, b| compare_case_insensitive(&a.artist, &b.artist)),
            SortKey::AverageRating => self
                .compositions
                .sort_by(|a, b| b.average_rating().total_cmp(&a.average_rating())),
        }
    }

    /// Iterate over the compositions in their current order. The iterator
    /// holds no cursor state between calls.
    pub fn iter(&self) -> impl Iterator<Item = &Composition> {
        self.compositions.iter()
    }

    /// Current order as a slice, used by rendering and serialization.
    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }

    pub fn len(&self) -> usize {
        self.compositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compositions.is_empty()
    }
}

fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn composition(title: &str, artist: &str, rating: Option<f64>) -> Composition {
        let mut composition = Composition {
            title: title.to_string(),
            genre: "Pop".to_string(),
            artist: artist.to_string(),
            lyrics: String::new(),
            creation_date: NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            duration: 3.0,
            format: "mp3".to_string(),
            ratings: Default::default(),
        };
        if let Some(value) = rating {
            composition.add_rating("quality", value);
        }
        composition
    }

    #[test]
    fn iteration_follows_append_order() {
        let mut library = Library::new();
        library.append(composition("First", "A", None));
        library.append(composition("Second", "B", None));
        library.append(composition("Third", "C", None));

        let titles: Vec<&str> = library.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second", "Third"]);
    }

    #[test]
    fn title_sort_is_case_insensitive() {
        let mut library = Library::new();
        library.append(composition("zeta", "A", None));
        library.append(composition("Alpha", "B", None));

        library.sort(SortKey::Title);

        let titles: Vec<&str> = library.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "zeta"]);
    }

    #[test]
    fn artist_sort_is_case_insensitive() {
        let mut library = Library::new();
        library.append(composition("One", "zappa", None));
        library.append(composition("Two", "Bach", None));

        library.sort(SortKey::Artist);

        let artists: Vec<&str> = library.iter().map(|c| c.artist.as_str()).collect();
        assert_eq!(artists, ["Bach", "zappa"]);
    }

    #[test]
    fn rating_sort_is_descending() {
        let mut library = Library::new();
        library.append(composition("Low", "A", Some(2.0)));
        library.append(composition("High", "B", Some(8.0)));
        library.append(composition("Mid", "C", Some(5.0)));

        library.sort(SortKey::AverageRating);

        let averages: Vec<f64> = library.iter().map(|c| c.average_rating()).collect();
        assert_eq!(averages, [8.0, 5.0, 2.0]);
    }

    #[test]
    fn unrated_entries_sort_below_rated_ones() {
        let mut library = Library::new();
        library.append(composition("Silent", "A", None));
        library.append(composition("Loud", "B", Some(6.0)));

        library.sort(SortKey::AverageRating);

        let titles: Vec<&str> = library.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Loud", "Silent"]);
    }

    #[test]
    fn remove_titled_matches_case_insensitively_and_removes_all() {
        let mut library = Library::new();
        library.append(composition("Song A", "X", None));
        library.append(composition("song a", "Y", None));
        library.append(composition("Song B", "Z", None));

        let removed = library.remove_titled("SONG A");

        assert_eq!(removed, 2);
        let titles: Vec<&str> = library.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Song B"]);
    }

    #[test]
    fn remove_titled_reports_zero_when_nothing_matches() {
        let mut library = Library::new();
        library.append(composition("Song A", "X", None));

        let removed = library.remove_titled("Song B");

        assert_eq!(removed, 0);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn count_titled_agrees_with_removal() {
        let mut library = Library::new();
        library.append(composition("Echo", "X", None));
        library.append(composition("ECHO", "Y", None));

        assert_eq!(library.count_titled("echo"), 2);
        assert_eq!(library.remove_titled("echo"), 2);
        assert!(library.is_empty());
    }
}
