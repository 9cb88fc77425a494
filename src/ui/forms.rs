use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Composition;

/// Fields of the add-composition form, in the order they are displayed and
/// cycled through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum CompositionField {
    #[default]
    Title,
    Genre,
    Artist,
    Lyrics,
    CreationDate,
    Duration,
    Format,
    RatingLabel,
    RatingValue,
}

impl CompositionField {
    pub(crate) const ALL: [CompositionField; 9] = [
        CompositionField::Title,
        CompositionField::Genre,
        CompositionField::Artist,
        CompositionField::Lyrics,
        CompositionField::CreationDate,
        CompositionField::Duration,
        CompositionField::Format,
        CompositionField::RatingLabel,
        CompositionField::RatingValue,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            CompositionField::Title => "Title",
            CompositionField::Genre => "Genre",
            CompositionField::Artist => "Artist",
            CompositionField::Lyrics => "Lyrics",
            CompositionField::CreationDate => "Creation date",
            CompositionField::Duration => "Duration (min)",
            CompositionField::Format => "Format",
            CompositionField::RatingLabel => "Rating label",
            CompositionField::RatingValue => "Rating value",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            CompositionField::CreationDate => "<YYYY-MM-DD>",
            CompositionField::Duration => "<minutes>",
            CompositionField::RatingValue => "<number>",
            _ => "<free text>",
        }
    }

    /// Row offset of this field inside the form, used to position the
    /// terminal cursor.
    pub(crate) fn row(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }
}

/// Form state for creating a composition. Every field is edited as raw text;
/// typed values only exist after `parse_inputs` succeeds, which is what
/// keeps the form open (the re-prompt loop) when a date or number does not
/// parse.
#[derive(Default, Clone)]
pub(crate) struct CompositionForm {
    pub(crate) title: String,
    pub(crate) genre: String,
    pub(crate) artist: String,
    pub(crate) lyrics: String,
    pub(crate) creation_date: String,
    pub(crate) duration: String,
    pub(crate) format: String,
    pub(crate) rating_label: String,
    pub(crate) rating_value: String,
    pub(crate) active: CompositionField,
    pub(crate) error: Option<String>,
}

impl CompositionForm {
    /// Move focus to the next field, wrapping at the end.
    pub(crate) fn next_field(&mut self) {
        let next = (self.active.row() + 1) % CompositionField::ALL.len();
        self.active = CompositionField::ALL[next];
    }

    /// Move focus to the previous field, wrapping at the start.
    pub(crate) fn previous_field(&mut self) {
        let len = CompositionField::ALL.len();
        let previous = (self.active.row() + len - 1) % len;
        self.active = CompositionField::ALL[previous];
    }

    /// Append a character to the active field, filtering input the field can
    /// never accept: dates take digits and dashes, numeric fields take
    /// digits and a decimal point, everything else takes any printable text.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = match self.active {
            CompositionField::CreationDate => ch.is_ascii_digit() || ch == '-',
            CompositionField::Duration | CompositionField::RatingValue => {
                ch.is_ascii_digit() || ch == '.'
            }
            _ => !ch.is_control(),
        };
        if accepted {
            self.value_mut(self.active).push(ch);
        }
        accepted
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Validate the raw inputs and build the composition they describe. Free
    /// text fields are accepted as-is (trimmed); only the date and the two
    /// numeric fields can fail. The single rating pair is attached here;
    /// creation is the only moment a rating can be added.
    pub(crate) fn parse_inputs(&self) -> Result<Composition> {
        let date = NaiveDate::parse_from_str(self.creation_date.trim(), "%Y-%m-%d")
            .map_err(|_| anyhow!("Creation date must be a valid YYYY-MM-DD date."))?;
        let creation_date = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Creation date must be a valid YYYY-MM-DD date."))?;

        let duration = self
            .duration
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow!("Duration must be a number of minutes."))?;

        let rating_value = self
            .rating_value
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow!("Rating value must be a number."))?;

        let mut composition = Composition {
            title: self.title.trim().to_string(),
            genre: self.genre.trim().to_string(),
            artist: self.artist.trim().to_string(),
            lyrics: self.lyrics.trim().to_string(),
            creation_date,
            duration,
            format: self.format.trim().to_string(),
            ratings: Default::default(),
        };
        composition.add_rating(self.rating_label.trim(), rating_value);

        Ok(composition)
    }

    /// Render a styled line for the modal form widget.
    pub(crate) fn build_line(&self, field: CompositionField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            field.placeholder().to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, used for cursor placement.
    pub(crate) fn value_len(&self, field: CompositionField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: CompositionField) -> &String {
        match field {
            CompositionField::Title => &self.title,
            CompositionField::Genre => &self.genre,
            CompositionField::Artist => &self.artist,
            CompositionField::Lyrics => &self.lyrics,
            CompositionField::CreationDate => &self.creation_date,
            CompositionField::Duration => &self.duration,
            CompositionField::Format => &self.format,
            CompositionField::RatingLabel => &self.rating_label,
            CompositionField::RatingValue => &self.rating_value,
        }
    }

    fn value_mut(&mut self, field: CompositionField) -> &mut String {
        match field {
            CompositionField::Title => &mut self.title,
            CompositionField::Genre => &mut self.genre,
            CompositionField::Artist => &mut self.artist,
            CompositionField::Lyrics => &mut self.lyrics,
            CompositionField::CreationDate => &mut self.creation_date,
            CompositionField::Duration => &mut self.duration,
            CompositionField::Format => &mut self.format,
            CompositionField::RatingLabel => &mut self.rating_label,
            CompositionField::RatingValue => &mut self.rating_value,
        }
    }
}

/// Form state for the remove flow: a single title field. The title is
/// accepted unconditionally; matching happens afterwards.
#[derive(Default, Clone)]
pub(crate) struct RemoveForm {
    pub(crate) title: String,
}

impl RemoveForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.title.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.title.pop();
    }
}

/// State for confirming a removal, carrying the match count shown in the
/// dialog so the user knows how many entries are about to go.
pub(crate) struct ConfirmRemoval {
    pub(crate) title: String,
    pub(crate) matches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> CompositionForm {
        CompositionForm {
            title: "Song A".to_string(),
            genre: "Pop".to_string(),
            artist: "X".to_string(),
            lyrics: "...".to_string(),
            creation_date: "2020-01-01".to_string(),
            duration: "3.5".to_string(),
            format: "mp3".to_string(),
            rating_label: "quality".to_string(),
            rating_value: "4".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parse_inputs_builds_the_composition() {
        let composition = filled_form().parse_inputs().unwrap();
        assert_eq!(composition.title, "Song A");
        assert_eq!(composition.duration, 3.5);
        assert_eq!(
            composition.creation_date.format("%Y-%m-%d").to_string(),
            "2020-01-01"
        );
        assert_eq!(composition.ratings.get("quality"), Some(&4.0));
    }

    #[test]
    fn parse_inputs_rejects_a_malformed_date() {
        let mut form = filled_form();
        form.creation_date = "2020-13-99".to_string();
        let err = form.parse_inputs().unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn parse_inputs_rejects_a_malformed_duration() {
        let mut form = filled_form();
        form.duration = "3.5.1".to_string();
        let err = form.parse_inputs().unwrap_err();
        assert!(err.to_string().contains("Duration"));
    }

    #[test]
    fn parse_inputs_rejects_a_malformed_rating_value() {
        let mut form = filled_form();
        form.rating_value = "..".to_string();
        let err = form.parse_inputs().unwrap_err();
        assert!(err.to_string().contains("Rating value"));
    }

    #[test]
    fn rating_label_is_accepted_unconditionally() {
        let mut form = filled_form();
        form.rating_label = String::new();
        let composition = form.parse_inputs().unwrap();
        assert_eq!(composition.ratings.get(""), Some(&4.0));
    }

    #[test]
    fn numeric_fields_filter_typed_characters() {
        let mut form = CompositionForm {
            active: CompositionField::Duration,
            ..Default::default()
        };
        assert!(form.push_char('3'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('x'));
        assert_eq!(form.duration, "3.");
    }

    #[test]
    fn date_field_accepts_only_digits_and_dashes() {
        let mut form = CompositionForm {
            active: CompositionField::CreationDate,
            ..Default::default()
        };
        for ch in "2020-01-01".chars() {
            assert!(form.push_char(ch));
        }
        assert!(!form.push_char('a'));
        assert_eq!(form.creation_date, "2020-01-01");
    }

    #[test]
    fn field_cycling_wraps_both_ways() {
        let mut form = CompositionForm::default();
        assert_eq!(form.active, CompositionField::Title);
        form.previous_field();
        assert_eq!(form.active, CompositionField::RatingValue);
        form.next_field();
        assert_eq!(form.active, CompositionField::Title);
    }
}
