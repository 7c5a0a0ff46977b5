//! Main application state and TUI event loop for Replay.
//!
//! [`App`] owns the base record set, the current filter spec, and the
//! aggregate report derived from them. Every filter change triggers one full
//! synchronous filter-and-aggregate pass over the in-memory records; there is
//! no caching or incremental recomputation.

use std::io;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use replay_core::models::{ContentType, FilterSpec, PlayRecord};
use replay_data::aggregator::{self, AggregateReport};
use replay_data::filter::{self, FilterOptions};
use replay_data::ingest::{IngestMetadata, IngestResult};

use crate::dashboard::{self, TAB_TITLES};
use crate::picker::Picker;
use crate::themes::Theme;

// ── PickerTarget ──────────────────────────────────────────────────────────────

/// Which filter dimension an open picker edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    Systems,
    Devices,
    Artists,
    Tracks,
    Countries,
    Types,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the Replay TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Immutable base record set, sorted by (date, hour).
    records: Vec<PlayRecord>,
    /// Load metadata shown in the footer.
    metadata: IngestMetadata,
    /// Distinct values per dimension, for picker options.
    options: FilterOptions,
    /// Current filter spec.
    pub spec: FilterSpec,
    /// Aggregates for the current filtered view.
    pub report: AggregateReport,
    /// Active tab index into [`TAB_TITLES`].
    pub tab: usize,
    /// Open picker overlay, if any.
    picker: Option<(PickerTarget, Picker)>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    top_n: usize,
    /// Earliest and latest dates in the base set, bounding date adjustments.
    data_min: Option<NaiveDate>,
    data_max: Option<NaiveDate>,
}

impl App {
    /// Construct the application from an ingested history.
    pub fn new(theme_name: &str, ingested: IngestResult, top_n: usize) -> Self {
        let options = filter::filter_options(&ingested.records);
        let data_min = ingested.records.first().map(|r| r.date);
        let data_max = ingested.records.last().map(|r| r.date);
        let mut app = Self {
            theme: Theme::from_name(theme_name),
            records: ingested.records,
            metadata: ingested.metadata,
            options,
            spec: FilterSpec::default(),
            report: AggregateReport::default(),
            tab: 0,
            picker: None,
            should_quit: false,
            top_n,
            data_min,
            data_max,
        };
        app.refresh();
        app
    }

    /// Re-run the filter and aggregation pipeline for the current spec.
    pub fn refresh(&mut self) {
        let view = filter::apply_filter(&self.records, &self.spec);
        self.report = aggregator::aggregate_with_top_n(&view, self.top_n);
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the TUI until the user quits.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout; all recomputation
    /// happens synchronously on this thread in response to key events.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            if self.should_quit {
                break;
            }
        }

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    /// Apply one key event to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.picker.is_some() {
            self.handle_picker_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.tab = (self.tab + 1) % TAB_TITLES.len(),
            KeyCode::BackTab => {
                self.tab = (self.tab + TAB_TITLES.len() - 1) % TAB_TITLES.len();
            }
            KeyCode::Char(c @ '1'..='5') => {
                self.tab = (c as usize) - ('1' as usize);
            }
            KeyCode::Char('s') => self.open_picker(PickerTarget::Systems),
            KeyCode::Char('d') => self.open_picker(PickerTarget::Devices),
            KeyCode::Char('a') => self.open_picker(PickerTarget::Artists),
            KeyCode::Char('t') => self.open_picker(PickerTarget::Tracks),
            KeyCode::Char('c') => self.open_picker(PickerTarget::Countries),
            KeyCode::Char('y') => self.open_picker(PickerTarget::Types),
            KeyCode::Char('r') => {
                self.spec = FilterSpec::default();
                self.refresh();
            }
            KeyCode::Char('[') => self.adjust_date_from(-1),
            KeyCode::Char(']') => self.adjust_date_from(1),
            KeyCode::Char('{') => self.adjust_date_to(-1),
            KeyCode::Char('}') => self.adjust_date_to(1),
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                if let Some((_, picker)) = self.picker.as_mut() {
                    picker.move_up();
                }
            }
            KeyCode::Down => {
                if let Some((_, picker)) = self.picker.as_mut() {
                    picker.move_down();
                }
            }
            KeyCode::Char(' ') => {
                if let Some((_, picker)) = self.picker.as_mut() {
                    picker.toggle();
                }
            }
            KeyCode::Enter => {
                if let Some((target, picker)) = self.picker.take() {
                    self.apply_picker(target, &picker);
                    self.refresh();
                }
            }
            KeyCode::Esc => self.picker = None,
            _ => {}
        }
    }

    // ── Pickers ───────────────────────────────────────────────────────────────

    fn open_picker(&mut self, target: PickerTarget) {
        let picker = match target {
            PickerTarget::Systems => {
                Picker::for_selection("Systems", self.options.systems.clone(), &self.spec.systems)
            }
            PickerTarget::Devices => {
                Picker::for_selection("Devices", self.options.devices.clone(), &self.spec.devices)
            }
            PickerTarget::Artists => {
                Picker::for_selection("Artists", self.options.artists.clone(), &self.spec.artists)
            }
            PickerTarget::Tracks => {
                Picker::for_selection("Tracks", self.options.tracks.clone(), &self.spec.tracks)
            }
            PickerTarget::Countries => Picker::for_selection(
                "Countries",
                self.options.countries.clone(),
                &self.spec.countries,
            ),
            PickerTarget::Types => Picker::without_all(
                "Content types",
                vec![
                    ContentType::Song.to_string(),
                    ContentType::Podcast.to_string(),
                ],
                self.spec.types.iter().map(ToString::to_string).collect(),
            ),
        };
        self.picker = Some((target, picker));
    }

    fn apply_picker(&mut self, target: PickerTarget, picker: &Picker) {
        match target {
            PickerTarget::Systems => self.spec.systems = picker.selection(),
            PickerTarget::Devices => self.spec.devices = picker.selection(),
            PickerTarget::Artists => self.spec.artists = picker.selection(),
            PickerTarget::Tracks => self.spec.tracks = picker.selection(),
            PickerTarget::Countries => self.spec.countries = picker.selection(),
            PickerTarget::Types => {
                self.spec.types = picker
                    .chosen()
                    .iter()
                    .filter_map(|name| match name.as_str() {
                        "Song" => Some(ContentType::Song),
                        "Podcast" => Some(ContentType::Podcast),
                        _ => None,
                    })
                    .collect();
            }
        }
    }

    // ── Date bounds ───────────────────────────────────────────────────────────

    fn adjust_date_from(&mut self, delta_days: i64) {
        let (Some(min), Some(max)) = (self.data_min, self.data_max) else {
            return;
        };
        let base = self.spec.date_from.unwrap_or(min);
        let upper = self.spec.date_to.unwrap_or(max);
        if let Some(adjusted) = shift_date(base, delta_days) {
            self.spec.date_from = Some(adjusted.clamp(min, upper));
            self.refresh();
        }
    }

    fn adjust_date_to(&mut self, delta_days: i64) {
        let (Some(min), Some(max)) = (self.data_min, self.data_max) else {
            return;
        };
        let base = self.spec.date_to.unwrap_or(max);
        let lower = self.spec.date_from.unwrap_or(min);
        if let Some(adjusted) = shift_date(base, delta_days) {
            self.spec.date_to = Some(adjusted.clamp(lower, max));
            self.refresh();
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        dashboard::render_header(frame, chunks[0], self.tab, &self.report.daily, &self.theme);

        let body = chunks[1];
        if self.records.is_empty() {
            dashboard::render_no_data(frame, body, &self.theme);
        } else {
            match self.tab {
                0 => dashboard::render_summary(frame, body, &self.report, &self.theme),
                1 => dashboard::render_daily_chart(frame, body, &self.report.daily, &self.theme),
                2 => dashboard::render_yearly_chart(frame, body, &self.report.yearly, &self.theme),
                3 => dashboard::render_hourly_chart(frame, body, &self.report.hourly, &self.theme),
                _ => {
                    let halves = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                        .split(body);
                    dashboard::render_top_artists(
                        frame,
                        halves[0],
                        &self.report.top_artists,
                        &self.theme,
                    );
                    dashboard::render_top_tracks(
                        frame,
                        halves[1],
                        &self.report.top_tracks,
                        &self.theme,
                    );
                }
            }
        }

        dashboard::render_footer(
            frame,
            chunks[2],
            &self.metadata,
            !self.spec.is_empty(),
            &self.theme,
        );

        if let Some((_, picker)) = &self.picker {
            picker.render(frame, frame.area(), &self.theme);
        }
    }
}

/// Shift a date by whole days in either direction.
fn shift_date(date: NaiveDate, delta_days: i64) -> Option<NaiveDate> {
    if delta_days >= 0 {
        date.checked_add_days(Days::new(delta_days as u64))
    } else {
        date.checked_sub_days(Days::new(delta_days.unsigned_abs()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use ratatui::backend::TestBackend;
    use replay_core::models::Selection;

    fn record(date: &str, hour: u8, system: &str, artist: &str) -> PlayRecord {
        PlayRecord {
            date: date.parse().unwrap(),
            hour,
            duration_ms: 60_000,
            system: Some(system.to_string()),
            device: Some("PIXEL5".to_string()),
            content_type: ContentType::Song,
            artist: Some(artist.to_string()),
            track: Some("T".to_string()),
            episode_show: None,
            episode_name: None,
            country: Some("SE".to_string()),
        }
    }

    fn make_app() -> App {
        let records = vec![
            record("2023-01-01", 9, "ANDROID", "A"),
            record("2023-01-02", 10, "IOS", "B"),
            record("2023-01-04", 22, "ANDROID", "A"),
        ];
        App::new(
            "dark",
            IngestResult {
                records,
                metadata: IngestMetadata::default(),
            },
            20,
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn test_new_computes_initial_report() {
        let app = make_app();
        assert_eq!(app.report.summary.play_count, 3);
        // Densified from 01-01 to 01-04.
        assert_eq!(app.report.daily.len(), 4);
        assert!(!app.should_quit);
    }

    // ── Quit keys ─────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_on_q() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_quit_on_ctrl_c() {
        let mut app = make_app();
        app.handle_key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        });
        assert!(app.should_quit);
    }

    // ── Tabs ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_tab_cycles_forward_and_back() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.tab, 1);
        app.handle_key(press(KeyCode::BackTab));
        assert_eq!(app.tab, 0);
        app.handle_key(press(KeyCode::BackTab));
        assert_eq!(app.tab, TAB_TITLES.len() - 1);
    }

    #[test]
    fn test_digit_selects_tab() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Char('4')));
        assert_eq!(app.tab, 3);
    }

    // ── Pickers ───────────────────────────────────────────────────────────────

    #[test]
    fn test_system_picker_applies_filter() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Char('s')));
        // Move past the (All) row to ANDROID and toggle it.
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.spec.systems, Selection::only(["ANDROID"]));
        assert_eq!(app.report.summary.play_count, 2);
    }

    #[test]
    fn test_picker_escape_discards_changes() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Char('a')));
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Esc));

        assert_eq!(app.spec.artists, Selection::All);
        assert_eq!(app.report.summary.play_count, 3);
    }

    #[test]
    fn test_picker_all_row_restores_unfiltered_view() {
        let mut app = make_app();
        app.spec.systems = Selection::only(["IOS"]);
        app.refresh();
        assert_eq!(app.report.summary.play_count, 1);

        app.handle_key(press(KeyCode::Char('s')));
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.spec.systems, Selection::All);
        assert_eq!(app.report.summary.play_count, 3);
    }

    #[test]
    fn test_types_picker_restricts_without_sentinel() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Char('y')));
        // First row is "Song" directly, no (All) row for this dimension.
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Enter));

        assert!(app.spec.types.contains(&ContentType::Song));
        assert_eq!(app.report.summary.play_count, 3);
    }

    // ── Reset / date range ────────────────────────────────────────────────────

    #[test]
    fn test_reset_clears_all_filters() {
        let mut app = make_app();
        app.spec.systems = Selection::only(["IOS"]);
        app.spec.date_from = Some("2023-01-02".parse().unwrap());
        app.refresh();

        app.handle_key(press(KeyCode::Char('r')));
        assert!(app.spec.is_empty());
        assert_eq!(app.report.summary.play_count, 3);
    }

    #[test]
    fn test_date_from_adjustment_filters_and_clamps() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Char(']')));
        assert_eq!(app.spec.date_from, Some("2023-01-02".parse().unwrap()));
        assert_eq!(app.report.summary.play_count, 2);

        // Cannot move below the data minimum.
        app.handle_key(press(KeyCode::Char('[')));
        app.handle_key(press(KeyCode::Char('[')));
        assert_eq!(app.spec.date_from, Some("2023-01-01".parse().unwrap()));
        assert_eq!(app.report.summary.play_count, 3);
    }

    #[test]
    fn test_date_to_cannot_cross_date_from() {
        let mut app = make_app();
        app.spec.date_from = Some("2023-01-02".parse().unwrap());
        app.refresh();

        for _ in 0..10 {
            app.handle_key(press(KeyCode::Char('{')));
        }
        assert_eq!(app.spec.date_to, Some("2023-01-02".parse().unwrap()));
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_render_all_tabs_do_not_panic() {
        let mut app = make_app();
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        for tab in 0..TAB_TITLES.len() {
            app.tab = tab;
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
    }

    #[test]
    fn test_render_with_picker_overlay_does_not_panic() {
        let mut app = make_app();
        app.handle_key(press(KeyCode::Char('s')));
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }

    #[test]
    fn test_render_empty_record_set_does_not_panic() {
        let app = App::new(
            "dark",
            IngestResult {
                records: Vec::new(),
                metadata: IngestMetadata::default(),
            },
            20,
        );
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
