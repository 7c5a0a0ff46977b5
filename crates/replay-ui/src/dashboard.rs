//! Dashboard views for the Replay TUI.
//!
//! Each tab renders one slice of the aggregate report: the summary text,
//! the daily time-series chart, the yearly and hourly bar charts, and the
//! top-artist / top-track tables. All functions draw into a caller-provided
//! area and never touch application state.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span, Text},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType,
        Paragraph, Row, Table, Tabs},
    Frame,
};

use unicode_width::UnicodeWidthChar;

use replay_core::formatting;
use replay_data::aggregator::{AggregateReport, DailyPlay, HourlyPlay, TopArtist, TopTrack,
    YearlyPlay};
use replay_data::ingest::IngestMetadata;

use crate::themes::Theme;

/// Tab titles in display order.
pub const TAB_TITLES: [&str; 5] = ["Summary", "Daily", "Yearly", "Hourly", "Top"];

// ── Header / footer ───────────────────────────────────────────────────────────

/// Render the title bar (with the filtered date span) and tab strip.
pub fn render_header(
    frame: &mut Frame,
    area: Rect,
    active_tab: usize,
    daily: &[DailyPlay],
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let span_text = match (daily.first(), daily.last()) {
        (Some(first), Some(last)) => format!("  {} to {}", first.date, last.date),
        _ => String::new(),
    };
    let title = Line::from(vec![
        Span::styled("♪ REPLAY ", theme.header),
        Span::styled("— streaming history explorer", theme.dim),
        Span::styled(span_text, theme.label),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    let tabs = Tabs::new(TAB_TITLES.iter().map(|t| Line::from(*t)))
        .select(active_tab)
        .style(theme.tab_inactive)
        .highlight_style(theme.tab_active)
        .divider(Span::styled("|", theme.separator));
    frame.render_widget(tabs, chunks[1]);
}

/// Render the key-hint and load-metadata footer line.
pub fn render_footer(
    frame: &mut Frame,
    area: Rect,
    metadata: &IngestMetadata,
    filter_active: bool,
    theme: &Theme,
) {
    let filter_note = if filter_active {
        Span::styled(" [filtered] ", theme.warning)
    } else {
        Span::raw(" ")
    };
    let line = Line::from(vec![
        Span::styled(
            format!(
                "{} records / {} file(s) in {:.2}s",
                metadata.records_read, metadata.files_read, metadata.load_time_seconds
            ),
            theme.dim,
        ),
        filter_note,
        Span::styled(
            "Tab switch | s/d/a/t/c/y filters | [/] {/} dates | r reset | q quit",
            theme.dim,
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Render the headline statistics panel.
pub fn render_summary(frame: &mut Frame, area: Rect, report: &AggregateReport, theme: &Theme) {
    let summary = &report.summary;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            formatting::listening_time_phrase(summary.total_ms),
            theme.value,
        )),
        Line::from(""),
        stat_line("Plays", summary.play_count, theme),
        stat_line("Unique artists", summary.unique_artists, theme),
        stat_line("Unique tracks", summary.unique_tracks, theme),
        stat_line("Unique shows", summary.unique_shows, theme),
        stat_line("Unique episodes", summary.unique_episodes, theme),
    ];
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(" Summary "),
    );
    frame.render_widget(paragraph, area);
}

fn stat_line(label: &str, value: usize, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<18}", label), theme.label),
        Span::styled(formatting::format_number(value as f64, 0), theme.value),
    ])
}

// ── Daily chart ───────────────────────────────────────────────────────────────

/// Render the densified daily time series as a line chart of minutes per day.
pub fn render_daily_chart(frame: &mut Frame, area: Rect, daily: &[DailyPlay], theme: &Theme) {
    if daily.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let points: Vec<(f64, f64)> = daily
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.minutes()))
        .collect();
    let max_minutes = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max).max(1.0);

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.chart_daily)
        .data(&points)];

    // First/last rows always exist here.
    let first = daily[0].date.to_string();
    let last = daily[daily.len() - 1].date.to_string();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Minutes per day "),
        )
        .x_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, (daily.len().max(2) - 1) as f64])
                .labels(vec![Line::from(first), Line::from(last)]),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, max_minutes])
                .labels(vec![
                    Line::from("0"),
                    Line::from(formatting::format_number(max_minutes, 0)),
                ]),
        );
    frame.render_widget(chart, area);
}

// ── Yearly chart ──────────────────────────────────────────────────────────────

/// Render the yearly rollup as a bar chart of hours per year.
pub fn render_yearly_chart(frame: &mut Frame, area: Rect, yearly: &[YearlyPlay], theme: &Theme) {
    if yearly.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let bars: Vec<Bar> = yearly
        .iter()
        .map(|row| {
            Bar::default()
                .label(Line::from(row.year.to_string()))
                // Proportions in whole minutes; display text shows hours.
                .value((row.ms_played / 60_000).max(u64::from(row.ms_played > 0)))
                .text_value(formatting::format_hours(formatting::round2(row.hours())))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Hours per year "),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2)
        .bar_style(theme.chart_yearly)
        .value_style(theme.value);
    frame.render_widget(chart, area);
}

// ── Hourly chart ──────────────────────────────────────────────────────────────

/// Render the hour-of-day histogram. Hours without plays are absent from the
/// input and therefore from the chart.
pub fn render_hourly_chart(frame: &mut Frame, area: Rect, hourly: &[HourlyPlay], theme: &Theme) {
    if hourly.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let bars: Vec<Bar> = hourly
        .iter()
        .map(|row| {
            Bar::default()
                .label(Line::from(format!("{:02}", row.hour)))
                .value((row.ms_played / 60_000).max(u64::from(row.ms_played > 0)))
                .text_value(formatting::format_number(
                    formatting::round2(row.minutes()),
                    0,
                ))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Minutes per hour of day "),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .bar_style(theme.chart_hourly)
        .value_style(theme.value);
    frame.render_widget(chart, area);
}

// ── Top tables ────────────────────────────────────────────────────────────────

/// Maximum display width for a name cell before it is cut with an ellipsis.
const NAME_WIDTH: usize = 40;

/// Cut `s` to `max` display columns, ellipsizing when needed. Width-aware so
/// CJK titles do not overflow their cell.
fn truncate_to_width(s: &str, max: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return s.to_string();
    }
    let mut width = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Render the top-artist table.
pub fn render_top_artists(frame: &mut Frame, area: Rect, rows: &[TopArtist], theme: &Theme) {
    let header = Row::new(
        ["#", "Artist", "Minutes", "Hours"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate_to_width(&row.artist, NAME_WIDTH)),
                Cell::from(formatting::format_number(row.minutes(), 2)),
                Cell::from(formatting::format_number(row.hours(), 2)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(24),
        Constraint::Length(12),
        Constraint::Length(10),
    ];
    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Top artists "),
        )
        .style(theme.text);
    frame.render_widget(table, area);
}

/// Render the top-track table. The third column is the composed label
/// carrying the artist and formatted hours played.
pub fn render_top_tracks(frame: &mut Frame, area: Rect, rows: &[TopTrack], theme: &Theme) {
    let header = Row::new(
        ["#", "Track", "Artist (hours)", "Minutes"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate_to_width(&row.track, NAME_WIDTH)),
                Cell::from(row.label()),
                Cell::from(formatting::format_number(row.minutes(), 2)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(24),
        Constraint::Min(20),
        Constraint::Length(12),
    ];
    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Top tracks "),
        )
        .style(theme.text);
    frame.render_widget(table, area);
}

// ── Empty state ───────────────────────────────────────────────────────────────

/// Render a placeholder when the current filter matches nothing.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No plays match the current filters", theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press 'r' to reset all filters", theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Replay "),
        ),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use replay_data::aggregator::SummaryStats;

    fn make_report() -> AggregateReport {
        AggregateReport {
            summary: SummaryStats {
                total_ms: 7_200_000,
                play_count: 40,
                unique_artists: 5,
                unique_tracks: 12,
                unique_shows: 1,
                unique_episodes: 2,
            },
            daily: vec![
                DailyPlay {
                    date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                    ms_played: 3_600_000,
                },
                DailyPlay {
                    date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
                    ms_played: 0,
                },
                DailyPlay {
                    date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
                    ms_played: 3_600_000,
                },
            ],
            yearly: vec![YearlyPlay {
                year: 2023,
                ms_played: 7_200_000,
            }],
            hourly: vec![
                HourlyPlay {
                    hour: 9,
                    ms_played: 3_600_000,
                },
                HourlyPlay {
                    hour: 22,
                    ms_played: 3_600_000,
                },
            ],
            top_artists: vec![TopArtist {
                artist: "A".to_string(),
                ms_played: 7_200_000,
            }],
            top_tracks: vec![TopTrack {
                artist: "A".to_string(),
                track: "T".to_string(),
                ms_played: 7_200_000,
            }],
        }
    }

    fn draw(f: impl Fn(&mut Frame)) {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| f(frame)).unwrap();
    }

    #[test]
    fn test_render_header_does_not_panic() {
        let theme = Theme::dark();
        let daily = vec![
            DailyPlay {
                date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                ms_played: 120_000,
            },
            DailyPlay {
                date: NaiveDate::from_ymd_opt(2023, 1, 4).unwrap(),
                ms_played: 60_000,
            },
        ];
        draw(|frame| render_header(frame, frame.area(), 2, &daily, &theme));
    }

    #[test]
    fn test_render_footer_does_not_panic() {
        let theme = Theme::dark();
        let metadata = IngestMetadata {
            files_read: 3,
            records_read: 1000,
            records_dropped: 2,
            load_time_seconds: 0.5,
        };
        draw(|frame| {
            let area = Rect::new(0, 0, 120, 1);
            render_footer(frame, area, &metadata, true, &theme);
        });
    }

    #[test]
    fn test_render_summary_does_not_panic() {
        let theme = Theme::dark();
        let report = make_report();
        draw(|frame| render_summary(frame, frame.area(), &report, &theme));
    }

    #[test]
    fn test_render_daily_chart_does_not_panic() {
        let theme = Theme::dark();
        let report = make_report();
        draw(|frame| render_daily_chart(frame, frame.area(), &report.daily, &theme));
    }

    #[test]
    fn test_render_daily_chart_single_day_does_not_panic() {
        let theme = Theme::dark();
        let daily = vec![DailyPlay {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            ms_played: 60_000,
        }];
        draw(|frame| render_daily_chart(frame, frame.area(), &daily, &theme));
    }

    #[test]
    fn test_render_yearly_chart_does_not_panic() {
        let theme = Theme::light();
        let report = make_report();
        draw(|frame| render_yearly_chart(frame, frame.area(), &report.yearly, &theme));
    }

    #[test]
    fn test_render_hourly_chart_does_not_panic() {
        let theme = Theme::classic();
        let report = make_report();
        draw(|frame| render_hourly_chart(frame, frame.area(), &report.hourly, &theme));
    }

    #[test]
    fn test_render_top_tables_do_not_panic() {
        let theme = Theme::dark();
        let report = make_report();
        draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(frame.area());
            render_top_artists(frame, chunks[0], &report.top_artists, &theme);
            render_top_tracks(frame, chunks[1], &report.top_tracks, &theme);
        });
    }

    #[test]
    fn test_render_charts_empty_input_falls_back_to_no_data() {
        let theme = Theme::dark();
        draw(|frame| {
            render_daily_chart(frame, frame.area(), &[], &theme);
        });
        draw(|frame| {
            render_yearly_chart(frame, frame.area(), &[], &theme);
        });
        draw(|frame| {
            render_hourly_chart(frame, frame.area(), &[], &theme);
        });
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("exactly-10", 10), "exactly-10");
        assert_eq!(truncate_to_width("much too long for this", 10), "much too …");
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let theme = Theme::dark();
        draw(|frame| render_no_data(frame, frame.area(), &theme));
    }
}
