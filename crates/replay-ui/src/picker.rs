//! Multi-select filter picker overlay.
//!
//! One picker instance exists at a time, opened over the dashboard for a
//! single filter dimension. String dimensions carry a leading `(All)` row
//! that clears the selection; the content-type dimension has no such row
//! because an empty choice already means unrestricted.

use std::collections::BTreeSet;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

use replay_core::models::Selection;

use crate::themes::Theme;

/// Marker text for the clear-selection row.
const ALL_LABEL: &str = "(All)";

/// State of an open picker overlay.
#[derive(Debug, Clone)]
pub struct Picker {
    title: String,
    options: Vec<String>,
    chosen: BTreeSet<String>,
    cursor: usize,
    include_all: bool,
}

impl Picker {
    /// Picker for a string dimension, seeded from the current selection.
    /// Carries the `(All)` row at the top.
    pub fn for_selection(title: &str, options: Vec<String>, current: &Selection) -> Self {
        let chosen = match current {
            Selection::All => BTreeSet::new(),
            Selection::Only(set) => set.clone(),
        };
        Self {
            title: title.to_string(),
            options,
            chosen,
            cursor: 0,
            include_all: true,
        }
    }

    /// Picker without an `(All)` row, used for the content-type dimension
    /// where an empty choice is already unrestricted.
    pub fn without_all(title: &str, options: Vec<String>, chosen: BTreeSet<String>) -> Self {
        Self {
            title: title.to_string(),
            options,
            chosen,
            cursor: 0,
            include_all: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn row_count(&self) -> usize {
        self.options.len() + usize::from(self.include_all)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.row_count() {
            self.cursor += 1;
        }
    }

    /// Toggle the row under the cursor. On the `(All)` row this clears the
    /// whole selection, which is the same state as every value deselected.
    pub fn toggle(&mut self) {
        if self.include_all && self.cursor == 0 {
            self.chosen.clear();
            return;
        }
        let index = self.cursor - usize::from(self.include_all);
        if let Some(option) = self.options.get(index) {
            if !self.chosen.remove(option) {
                self.chosen.insert(option.clone());
            }
        }
    }

    /// The selection this picker currently represents.
    pub fn selection(&self) -> Selection {
        if self.chosen.is_empty() {
            Selection::All
        } else {
            Selection::Only(self.chosen.clone())
        }
    }

    /// Raw chosen values, for dimensions without the `All` sentinel.
    pub fn chosen(&self) -> &BTreeSet<String> {
        &self.chosen
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    /// Render the picker as a centered overlay on top of the dashboard.
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = centered_rect(area, 50, 70);
        frame.render_widget(Clear, popup);

        let mut items: Vec<ListItem> = Vec::with_capacity(self.row_count());
        if self.include_all {
            items.push(self.row_item(0, ALL_LABEL, self.chosen.is_empty(), theme));
        }
        let offset = usize::from(self.include_all);
        for (i, option) in self.options.iter().enumerate() {
            items.push(self.row_item(
                i + offset,
                option,
                self.chosen.contains(option),
                theme,
            ));
        }

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.picker_border)
                .title(format!(" {} ", self.title))
                .title_bottom(" Space toggle | Enter apply | Esc cancel "),
        );
        frame.render_widget(list, popup);
    }

    fn row_item<'a>(
        &self,
        row: usize,
        label: &'a str,
        selected: bool,
        theme: &Theme,
    ) -> ListItem<'a> {
        let marker = if selected { "[x] " } else { "[ ] " };
        let style = if row == self.cursor {
            theme.picker_cursor
        } else if selected {
            theme.picker_selected
        } else {
            theme.text
        };
        ListItem::new(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(label, style),
        ]))
    }
}

/// Center a popup of `percent_x` x `percent_y` of `area`.
///
/// Scaling is done in `u32` so wide terminals cannot overflow `u16`.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
