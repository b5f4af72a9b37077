use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::app::{App, Mode};
use crate::comparison::Comparison;
use crate::dates::{DateRange, long_date};
use crate::series::SeriesPoint;
use crate::storage::ThemePreference;

const BAR_WIDTH: u16 = 7;
const BAR_GAP: u16 = 1;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let theme = theme_from(app.theme);
    draw_background(frame, size, &theme);
    draw_dashboard(frame, app, size, &theme);

    if app.mode == Mode::DateInput {
        draw_date_input(frame, app, size, &theme);
    }

    if app.mode == Mode::Dashboard && !app.show_help {
        if let Some(toast) = app.active_toast() {
            draw_toast(frame, size, &toast.message, toast.is_error, &theme);
        }
    }

    if app.show_help {
        draw_help(frame, size, &theme);
    }
}

fn draw_dashboard(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let content = area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(content);

    let header_block = Paragraph::new(header_line(app, theme))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(theme.border_style())
                .style(theme.panel_style()),
        );
    frame.render_widget(header_block, chunks[0]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let state = app.state();
    let current_total = state.series.as_ref().map(|series| series.current_total());
    let comparison_total = state.series.as_ref().map(|series| series.comparison_total());

    let selected = Paragraph::new(range_lines(state.current.as_ref(), current_total, theme))
        .block(panel_block("Selected Range", theme));
    frame.render_widget(selected, cards[0]);

    let comparison_lines = match &state.comparison {
        Some(Comparison::Unsupported { reason }) => vec![
            Line::from(Span::styled(
                "No comparison available",
                Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("{reason}."), theme.muted_style())),
        ],
        _ => range_lines(state.comparison_range(), comparison_total, theme),
    };
    let comparison = Paragraph::new(comparison_lines)
        .block(panel_block("Comparison Range", theme))
        .wrap(Wrap { trim: true });
    frame.render_widget(comparison, cards[1]);

    match &state.series {
        Some(series) if !series.is_empty() => {
            let charts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[2]);
            let max = series
                .current
                .iter()
                .chain(series.comparison.iter())
                .map(|point| point.value)
                .max()
                .unwrap_or(0)
                .max(1);
            draw_series_chart(
                frame,
                charts[0],
                "Selected Date Range Trend",
                &series.current,
                app.chart_offset,
                max,
                theme.accent,
                theme,
            );
            draw_series_chart(
                frame,
                charts[1],
                "Comparison Date Range Trend",
                &series.comparison,
                app.chart_offset,
                max,
                theme.success,
                theme,
            );
        }
        _ => {
            let message = if state.current.is_none() {
                "Press d to select a date range."
            } else {
                "No data to chart for this selection."
            };
            let empty = Paragraph::new(Line::from(Span::styled(message, theme.muted_style())))
                .alignment(Alignment::Center)
                .block(panel_block("Trends", theme));
            frame.render_widget(empty, chunks[2]);
        }
    }

    let footer_block = Paragraph::new(footer_line(app, theme))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(theme.border_style())
                .style(theme.panel_style()),
        );
    frame.render_widget(footer_block, chunks[3]);
}

fn range_lines(range: Option<&DateRange>, total: Option<u64>, theme: &Theme) -> Vec<Line<'static>> {
    let (from, to) = match range {
        Some(range) => (long_date(range.start()), long_date(range.end())),
        None => ("Not Selected".to_string(), "Not Selected".to_string()),
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("From: ", theme.muted_style()),
            Span::raw(from),
        ]),
        Line::from(vec![Span::styled("To:   ", theme.muted_style()), Span::raw(to)]),
    ];
    if let (Some(range), Some(total)) = (range, total) {
        lines.push(Line::from(vec![
            Span::styled("Orders: ", theme.muted_style()),
            Span::styled(total.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  ({} days)", range.day_count()), theme.muted_style()),
        ]));
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn draw_series_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    points: &[SeriesPoint],
    offset: usize,
    max: u64,
    color: Color,
    theme: &Theme,
) {
    let inner_width = area.width.saturating_sub(2);
    let visible = usize::from((inner_width / (BAR_WIDTH + BAR_GAP)).max(1));
    let offset = offset.min(points.len().saturating_sub(1));
    let window = &points[offset..points.len().min(offset + visible)];

    let title = match (window.first(), window.last()) {
        (Some(first), Some(last)) => format!(
            "{title} · {} – {} · {}/{}",
            first.display_date,
            last.display_date,
            offset + window.len(),
            points.len()
        ),
        _ => title.to_string(),
    };

    let bars: Vec<Bar> = window
        .iter()
        .map(|point| {
            Bar::default()
                .value(point.value)
                .label(Line::from(point.label.clone()))
                .text_value(point.value.to_string())
        })
        .collect();

    let chart = BarChart::default()
        .block(panel_block(&title, theme))
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .max(max)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().bg(color).fg(theme.accent_contrast()).add_modifier(Modifier::BOLD))
        .label_style(theme.muted_style());
    frame.render_widget(chart, area);
}

fn header_line(app: &App, theme: &Theme) -> Line<'static> {
    let state = app.state();
    let range_label = state
        .current
        .as_ref()
        .map(DateRange::label)
        .unwrap_or_else(|| "Not Selected".to_string());
    Line::from(vec![
        Span::styled("Orders Comparison", theme.title_style()),
        Span::raw("  "),
        Span::styled("Range", theme.muted_style()),
        Span::raw(": "),
        Span::styled(range_label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("Compare", theme.muted_style()),
        Span::raw(": "),
        Span::raw(state.mode.label()),
        Span::raw("  "),
        Span::styled("Data", theme.muted_style()),
        Span::raw(": "),
        Span::raw(format!("{} days", app.controller().orders().len())),
    ])
}

fn footer_line(app: &App, theme: &Theme) -> Line<'static> {
    let status = app.status.clone().unwrap_or_default();
    Line::from(vec![
        Span::styled("d dates", theme.muted_style()),
        Span::raw(" · "),
        Span::styled("m mode", theme.muted_style()),
        Span::raw(" · "),
        Span::styled("y share", theme.muted_style()),
        Span::raw(" · "),
        Span::styled("h help", theme.muted_style()),
        Span::raw(" · "),
        Span::styled("q quit", theme.muted_style()),
        if status.is_empty() {
            Span::raw("")
        } else {
            Span::styled(format!("   |   {}", status), Style::default().fg(theme.error))
        },
    ])
}

fn draw_date_input(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = centered_rect(60, 35, area);
    frame.render_widget(Clear, block);

    let start_value = if app.is_date_start_active() {
        Span::styled(app.date_start_input_value().to_string(), Style::default().fg(theme.accent))
    } else {
        Span::raw(app.date_start_input_value().to_string())
    };
    let end_value = if app.is_date_start_active() {
        Span::raw(app.date_end_input_value().to_string())
    } else {
        Span::styled(app.date_end_input_value().to_string(), Style::default().fg(theme.accent))
    };

    let mut lines = vec![
        Line::from("Select date range (YYYY-MM-DD)"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Start: ", Style::default().add_modifier(Modifier::BOLD)),
            start_value,
        ]),
        Line::from(vec![
            Span::styled("End:   ", Style::default().add_modifier(Modifier::BOLD)),
            end_value,
        ]),
        Line::from(""),
        Line::from("Tab to switch field • Enter apply • Esc cancel"),
        Line::from(Span::styled(
            "Leave both fields empty to clear the selection.",
            theme.muted_style(),
        )),
    ];

    if let Some(status) = &app.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(theme.error),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(panel_block("Date Range", theme))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, block);
}

fn draw_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = centered_rect(60, 60, area);
    frame.render_widget(Clear, block);

    let key_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let rows = [
        ("d", "Select date range"),
        ("m", "Toggle previous month / previous year"),
        ("c", "Clear selection"),
        ("y", "Copy share link"),
        ("Left/Right", "Scroll charts"),
        ("T", "Cycle theme"),
        ("h / Esc", "Close help"),
        ("q", "Quit"),
    ];
    let mut lines = vec![
        Line::from(Span::styled("Keyboard shortcuts", theme.title_style())),
        Line::from(""),
    ];
    lines.extend(rows.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("{key:<12}"), key_style),
            Span::raw(*action),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Previous month compares same-month ranges with the month before; \
         longer ranges in one year compare with the year before.",
        theme.muted_style(),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(panel_block("Help", theme))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, block);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    vertical[1]
}

fn draw_toast(frame: &mut Frame, area: Rect, message: &str, is_error: bool, theme: &Theme) {
    let width = (message.len() as u16 + 6).clamp(20, area.width.saturating_sub(2));
    let height = 3;
    let x = area.x + area.width.saturating_sub(width + 1);
    let y = area.y + area.height.saturating_sub(height + 4);
    let rect = Rect::new(x, y, width, height);

    frame.render_widget(Clear, rect);
    let style = if is_error {
        Style::default().fg(theme.error).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.success).add_modifier(Modifier::BOLD)
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(message.to_string(), style)))
        .alignment(Alignment::Center)
        .block(panel_block("Notice", theme));
    frame.render_widget(paragraph, rect);
}

fn draw_background(frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default().style(Style::default().bg(theme.bg).fg(theme.text));
    frame.render_widget(block, area);
}

fn panel_block(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style())
        .style(theme.panel_style())
        .title(Line::from(Span::styled(
            format!(" {} ", title),
            theme.title_style(),
        )))
}

#[derive(Clone, Copy)]
struct Theme {
    bg: Color,
    panel: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    highlight: Color,
    success: Color,
    error: Color,
    accent_dark: Color,
}

impl Theme {
    fn panel_style(&self) -> Style {
        Style::default().bg(self.panel).fg(self.text)
    }

    fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    fn accent_contrast(&self) -> Color {
        if matches!(self.bg, Color::Rgb(248, 250, 252)) {
            self.accent_dark
        } else {
            Color::Black
        }
    }
}

fn theme_from(pref: ThemePreference) -> Theme {
    match pref {
        ThemePreference::Terminal => Theme {
            bg: Color::Reset,
            panel: Color::Reset,
            border: Color::DarkGray,
            text: Color::Reset,
            muted: Color::DarkGray,
            accent: Color::Blue,
            highlight: Color::Yellow,
            success: Color::Green,
            error: Color::Red,
            accent_dark: Color::Black,
        },
        ThemePreference::Dark => Theme {
            bg: Color::Rgb(15, 23, 42),
            panel: Color::Rgb(30, 41, 59),
            border: Color::Rgb(51, 65, 85),
            text: Color::Rgb(226, 232, 240),
            muted: Color::Rgb(148, 163, 184),
            accent: Color::Rgb(59, 130, 246),
            highlight: Color::Rgb(251, 191, 36),
            success: Color::Rgb(16, 185, 129),
            error: Color::Rgb(248, 113, 113),
            accent_dark: Color::Rgb(30, 58, 138),
        },
        ThemePreference::Light => Theme {
            bg: Color::Rgb(248, 250, 252),
            panel: Color::Rgb(255, 255, 255),
            border: Color::Rgb(226, 232, 240),
            text: Color::Rgb(30, 41, 59),
            muted: Color::Rgb(100, 116, 139),
            accent: Color::Rgb(59, 130, 246),
            highlight: Color::Rgb(217, 119, 6),
            success: Color::Rgb(16, 185, 129),
            error: Color::Rgb(220, 38, 38),
            accent_dark: Color::Rgb(255, 255, 255),
        },
    }
}
