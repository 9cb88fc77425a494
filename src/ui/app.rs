use std::cmp::min;
use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::library::{Library, SortKey};
use crate::models::Composition;
use crate::store::LoadReport;

use super::forms::{CompositionField, CompositionForm, ConfirmRemoval, RemoveForm};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for status messages and the menu line.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per composition card in the list view.
const CARD_HEIGHT: u16 = 5;

/// Interaction states of the menu loop. `Normal` is the menu itself; every
/// other variant is a modal flow layered on top of the list.
enum Mode {
    Normal,
    Viewing,
    Adding(CompositionForm),
    Removing(RemoveForm),
    ConfirmRemoval(ConfirmRemoval),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    library: Library,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the initial state from the loaded library, translating the load
    /// report into the first status message the user sees.
    pub fn new(library: Library, load_report: &LoadReport) -> Self {
        let status = match load_report {
            LoadReport::Loaded(count) => Some(StatusMessage {
                text: format!("Loaded {count} compositions from compositions.json."),
                kind: StatusKind::Info,
            }),
            LoadReport::Missing => Some(StatusMessage {
                text: "compositions.json not found; starting with an empty library.".to_string(),
                kind: StatusKind::Info,
            }),
            LoadReport::Discarded(reason) => Some(StatusMessage {
                text: format!("Discarded compositions.json ({reason}); starting empty."),
                kind: StatusKind::Error,
            }),
        };

        Self {
            library,
            selected: 0,
            mode: Mode::Normal,
            status,
        }
    }

    /// The collection as it stands, handed back to `main` for the final save.
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Route a key press to the active mode. Returns true when the user
    /// chose to quit; the caller then leaves the event loop and persists.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_menu_key(code, &mut exit),
            Mode::Viewing => Self::handle_detail_key(code),
            Mode::Adding(form) => self.handle_add(code, form),
            Mode::Removing(form) => self.handle_remove(code, form),
            Mode::ConfirmRemoval(confirm) => self.handle_confirm_removal(code, confirm),
        };

        exit
    }

    /// The menu proper: digits 1-7 dispatch, arrows move the selection, and
    /// any other typed character reports an invalid choice instead of doing
    /// anything destructive.
    fn handle_menu_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('1') => {
                self.clear_status();
                return Mode::Adding(CompositionForm::default());
            }
            KeyCode::Char('2') | KeyCode::Enter => {
                if self.library.is_empty() {
                    self.set_status("No compositions to view yet.", StatusKind::Error);
                } else {
                    self.clear_status();
                    return Mode::Viewing;
                }
            }
            KeyCode::Char('3') => {
                self.library.sort(SortKey::Title);
                self.set_status("Compositions sorted by title.", StatusKind::Info);
            }
            KeyCode::Char('4') => {
                self.library.sort(SortKey::Artist);
                self.set_status("Compositions sorted by artist.", StatusKind::Info);
            }
            KeyCode::Char('5') => {
                self.library.sort(SortKey::AverageRating);
                self.set_status(
                    "Compositions sorted by average rating (descending).",
                    StatusKind::Info,
                );
            }
            KeyCode::Char('6') => {
                self.clear_status();
                return Mode::Removing(RemoveForm::default());
            }
            KeyCode::Char('7') | KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::Char(other) => {
                self.set_status(
                    format!("Invalid choice '{other}'. Use options 1-7."),
                    StatusKind::Error,
                );
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_detail_key(code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('2') => Mode::Normal,
            _ => Mode::Viewing,
        }
    }

    /// The add flow. A failed parse keeps the form open with the message
    /// shown inline, so the user fixes the offending field and retries.
    fn handle_add(&mut self, code: KeyCode, mut form: CompositionForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add composition cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Tab | KeyCode::Down => {
                form.next_field();
                Mode::Adding(form)
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.previous_field();
                Mode::Adding(form)
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::Adding(form)
            }
            KeyCode::Enter => match form.parse_inputs() {
                Ok(composition) => {
                    self.library.append(composition);
                    self.selected = self.library.len() - 1;
                    self.set_status("Composition added.", StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::Adding(form)
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
                Mode::Adding(form)
            }
            _ => Mode::Adding(form),
        }
    }

    /// The remove flow's title prompt. Matching is case-insensitive; zero
    /// matches short-circuits with an honest "nothing matched" message
    /// instead of claiming success.
    fn handle_remove(&mut self, code: KeyCode, mut form: RemoveForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::Removing(form)
            }
            KeyCode::Enter => {
                let title = form.title.trim().to_string();
                let matches = self.library.count_titled(&title);
                if matches == 0 {
                    self.set_status(
                        format!("No compositions titled '{title}'."),
                        StatusKind::Error,
                    );
                    Mode::Normal
                } else {
                    self.clear_status();
                    Mode::ConfirmRemoval(ConfirmRemoval { title, matches })
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Mode::Removing(form)
            }
            _ => Mode::Removing(form),
        }
    }

    fn handle_confirm_removal(&mut self, code: KeyCode, confirm: ConfirmRemoval) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let removed = self.library.remove_titled(&confirm.title);
                self.ensure_selection_in_bounds();
                let noun = if removed == 1 {
                    "composition"
                } else {
                    "compositions"
                };
                self.set_status(
                    format!("Removed {removed} {noun} titled '{}'.", confirm.title),
                    StatusKind::Info,
                );
                Mode::Normal
            }
            _ => Mode::ConfirmRemoval(confirm),
        }
    }

    fn current_composition(&self) -> Option<&Composition> {
        self.library.compositions().get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.library.is_empty() {
            return;
        }
        let len = self.library.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    fn select_first(&mut self) {
        self.selected = 0;
    }

    fn select_last(&mut self) {
        if !self.library.is_empty() {
            self.selected = self.library.len() - 1;
        }
    }

    fn ensure_selection_in_bounds(&mut self) {
        if self.library.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.library.len() {
            self.selected = self.library.len() - 1;
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_composition_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Adding(form) => self.draw_composition_form(frame, area, form),
            Mode::Removing(form) => self.draw_remove_form(frame, area, form),
            Mode::ConfirmRemoval(confirm) => self.draw_confirm_removal(frame, area, confirm),
            Mode::Viewing => self.draw_detail(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_composition_list(&self, frame: &mut Frame, area: Rect) {
        if self.library.is_empty() {
            let message = Paragraph::new("No compositions yet. Press '1' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }

        let card_height = CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = self.library.len();
        let mut start = if self.selected >= capacity {
            self.selected + 1 - capacity
        } else {
            0
        };
        if len > capacity && start > len - capacity {
            start = len - capacity;
        }
        let end = min(len, start + capacity);

        let mut y = area.y;
        for (offset, composition) in self.library.compositions()[start..end].iter().enumerate() {
            let remaining = (area.y + area.height).saturating_sub(y);
            if remaining == 0 {
                break;
            }
            let rect = Rect {
                x: area.x,
                y,
                width: area.width,
                height: CARD_HEIGHT.min(remaining),
            };

            let index = start + offset;
            let title = if composition.title.trim().is_empty() {
                "(untitled)".to_string()
            } else {
                composition.title.clone()
            };
            let mut block = Block::default().borders(Borders::ALL).title(title);
            if index == self.selected {
                block = block.style(Style::default().fg(Color::Yellow));
            }

            let rating_count = composition.ratings.len();
            let rating_word = if rating_count == 1 { "rating" } else { "ratings" };
            let lines = vec![
                Line::from(format!("{} • {}", composition.artist, composition.genre)),
                Line::from(format!(
                    "created {} • {} min • {}",
                    composition.creation_date.format("%Y-%m-%d"),
                    composition.duration,
                    composition.format,
                )),
                Line::from(format!(
                    "average rating {:.2} ({rating_count} {rating_word})",
                    composition.average_rating(),
                )),
            ];

            frame.render_widget(Paragraph::new(lines).block(block), rect);
            y += CARD_HEIGHT;
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Adding(_) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next field   "),
                Span::styled("[Shift+Tab]", key_style),
                Span::raw(" Previous   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::Removing(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Continue   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmRemoval(_) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::Viewing => Line::from(vec![
                Span::styled("[Esc]", key_style),
                Span::raw(" Back to the menu"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[1]", key_style),
                Span::raw(" Add   "),
                Span::styled("[2]", key_style),
                Span::raw(" View   "),
                Span::styled("[3]", key_style),
                Span::raw(" Sort: Title   "),
                Span::styled("[4]", key_style),
                Span::raw(" Sort: Artist   "),
                Span::styled("[5]", key_style),
                Span::raw(" Sort: Rating   "),
                Span::styled("[6]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[7]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_composition_form(&self, frame: &mut Frame, area: Rect, form: &CompositionForm) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Composition").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line<'static>> = CompositionField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch fields • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = format!("{}: ", form.active.label()).chars().count() as u16;
        let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
        let cursor_y = inner.y + form.active.row() as u16;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_remove_form(&self, frame: &mut Frame, area: Rect, form: &RemoveForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Remove Composition")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(vec![
                Span::raw("Title: "),
                Span::styled(form.title.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from("Every entry with this title is removed, case-insensitively."),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to continue • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + "Title: ".len() as u16 + form.title.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_confirm_removal(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRemoval) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let noun = if confirm.matches == 1 {
            "composition"
        } else {
            "compositions"
        };
        let lines = vec![
            Line::from(format!(
                "Remove {} {noun} titled '{}'?",
                confirm.matches, confirm.title
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Composition Details")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let Some(composition) = self.current_composition() else {
            let message = Paragraph::new("Nothing selected.").alignment(Alignment::Center);
            frame.render_widget(message, inner);
            return;
        };

        let label_style = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Title: ", label_style),
                Span::raw(composition.title.clone()),
            ]),
            Line::from(vec![
                Span::styled("Artist: ", label_style),
                Span::raw(composition.artist.clone()),
            ]),
            Line::from(vec![
                Span::styled("Genre: ", label_style),
                Span::raw(composition.genre.clone()),
            ]),
            Line::from(vec![
                Span::styled("Created: ", label_style),
                Span::raw(composition.creation_date.format("%Y-%m-%d").to_string()),
            ]),
            Line::from(vec![
                Span::styled("Duration: ", label_style),
                Span::raw(format!("{} min", composition.duration)),
            ]),
            Line::from(vec![
                Span::styled("Format: ", label_style),
                Span::raw(composition.format.clone()),
            ]),
            Line::from(vec![
                Span::styled("Average rating: ", label_style),
                Span::raw(format!("{:.2}", composition.average_rating())),
            ]),
            Line::from(""),
            Line::from(Span::styled("Ratings:", label_style)),
        ];

        if composition.ratings.is_empty() {
            lines.push(Line::from("  (none)"));
        } else {
            for (label, value) in &composition.ratings {
                lines.push(Line::from(format!("  {label}: {value}")));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Lyrics:", label_style)));
        if composition.lyrics.trim().is_empty() {
            lines.push(Line::from("  (none)"));
        } else {
            for lyric_line in composition.lyrics.lines() {
                lines.push(Line::from(format!("  {lyric_line}")));
            }
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn composition(title: &str) -> Composition {
        Composition {
            title: title.to_string(),
            genre: "Pop".to_string(),
            artist: "X".to_string(),
            lyrics: String::new(),
            creation_date: NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            duration: 3.0,
            format: "mp3".to_string(),
            ratings: BTreeMap::new(),
        }
    }

    fn app_with(titles: &[&str]) -> App {
        let mut library = Library::new();
        for title in titles {
            library.append(composition(title));
        }
        App::new(library, &LoadReport::Loaded(titles.len()))
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let mut app = app_with(&[]);
        assert!(app.handle_key(KeyCode::Char('7')));
        let mut app = app_with(&[]);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn sort_choices_do_not_exit_and_reorder_the_library() {
        let mut app = app_with(&["zeta", "Alpha"]);
        assert!(!app.handle_key(KeyCode::Char('3')));
        let titles: Vec<&str> = app.library().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "zeta"]);
    }

    #[test]
    fn unknown_choice_is_reported_not_fatal() {
        let mut app = app_with(&[]);
        assert!(!app.handle_key(KeyCode::Char('x')));
        assert!(matches!(
            app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }

    #[test]
    fn add_flow_keeps_the_form_open_on_a_bad_date() {
        let mut app = app_with(&[]);
        app.handle_key(KeyCode::Char('1'));
        // Submit the empty form: the date cannot parse.
        app.handle_key(KeyCode::Enter);
        match &app.mode {
            Mode::Adding(form) => assert!(form.error.is_some()),
            _ => panic!("form should stay open after a parse failure"),
        }
        assert!(app.library().is_empty());
    }

    #[test]
    fn remove_flow_reports_zero_matches_without_confirming() {
        let mut app = app_with(&["Song A"]);
        app.handle_key(KeyCode::Char('6'));
        for ch in "Song B".chars() {
            app.handle_key(KeyCode::Char(ch));
        }
        app.handle_key(KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.library().len(), 1);
    }

    #[test]
    fn remove_flow_confirms_then_removes_all_matches() {
        let mut app = app_with(&["Song A", "song a", "Song B"]);
        app.handle_key(KeyCode::Char('6'));
        for ch in "SONG A".chars() {
            app.handle_key(KeyCode::Char(ch));
        }
        app.handle_key(KeyCode::Enter);
        assert!(matches!(
            app.mode,
            Mode::ConfirmRemoval(ConfirmRemoval { matches: 2, .. })
        ));
        app.handle_key(KeyCode::Char('y'));
        let titles: Vec<&str> = app.library().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Song B"]);
    }
}
