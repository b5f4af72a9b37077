use arboard::Clipboard;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use log::{error, info};
use std::time::{Duration, Instant};

use crate::controller::{Controller, DashboardState};
use crate::dates::{DateRange, iso_date, parse_date};
use crate::error::Result;
use crate::storage::{self, ThemePreference};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Dashboard,
    DateInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

pub struct App {
    pub should_quit: bool,
    pub mode: Mode,
    pub status: Option<String>,
    pub theme: ThemePreference,
    pub show_help: bool,
    pub chart_offset: usize,
    share_base_url: String,
    persist: bool,
    controller: Controller,
    date_field: DateField,
    start_input: String,
    end_input: String,
    toast: Option<Toast>,
}

impl App {
    pub fn new(controller: Controller, persist: bool) -> Self {
        let (theme, share_base_url) = if persist {
            (storage::read_theme(), storage::read_share_base_url())
        } else {
            (
                ThemePreference::default(),
                storage::DEFAULT_SHARE_BASE_URL.to_string(),
            )
        };

        App {
            should_quit: false,
            mode: Mode::Dashboard,
            status: None,
            theme,
            show_help: false,
            chart_offset: 0,
            share_base_url,
            persist,
            controller,
            date_field: DateField::Start,
            start_input: String::new(),
            end_input: String::new(),
            toast: None,
        }
    }

    pub fn state(&self) -> &DashboardState {
        self.controller.state()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn share_link(&self) -> String {
        self.controller.query().share_link(&self.share_base_url)
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::DateInput => self.handle_date_input(key),
            Mode::Dashboard => self.handle_dashboard_input(key),
        }
    }

    fn handle_dashboard_input(&mut self, key: KeyEvent) {
        if self.show_help {
            match key.code {
                KeyCode::Char('h') | KeyCode::Esc => {
                    self.show_help = false;
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') => self.show_help = true,
            KeyCode::Char('d') => self.enter_date_input(),
            KeyCode::Char('m') => self.toggle_mode(),
            KeyCode::Char('c') => self.apply_range(None),
            KeyCode::Char('y') => self.copy_share_link(),
            KeyCode::Char('T') => self.cycle_theme(),
            KeyCode::Left => {
                self.chart_offset = self.chart_offset.saturating_sub(1);
            }
            KeyCode::Right => {
                let max_offset = self
                    .state()
                    .series
                    .as_ref()
                    .map(|series| series.len().saturating_sub(1))
                    .unwrap_or(0);
                self.chart_offset = (self.chart_offset + 1).min(max_offset);
            }
            _ => {}
        }
    }

    fn handle_date_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_date_input(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.date_field = match self.date_field {
                    DateField::Start => DateField::End,
                    DateField::End => DateField::Start,
                };
            }
            KeyCode::Backspace => {
                self.active_input_mut().pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    self.active_input_mut().push(ch);
                }
            }
            KeyCode::Esc => {
                self.mode = Mode::Dashboard;
                self.status = None;
            }
            _ => {}
        }
    }

    fn submit_date_input(&mut self) {
        let parsed = optional_date(&self.start_input).and_then(|start| {
            let end = optional_date(&self.end_input)?;
            DateRange::from_options(start, end)
        });

        match parsed {
            Ok(range) => {
                self.mode = Mode::Dashboard;
                self.apply_range(range.map(|range| (range.start(), range.end())));
            }
            Err(err) => {
                self.status = Some(err.to_string());
            }
        }
    }

    fn apply_range(&mut self, bounds: Option<(NaiveDate, NaiveDate)>) {
        if let Err(err) = self.controller.select_range(bounds) {
            self.status = Some(err.to_string());
            return;
        }
        self.chart_offset = 0;
        self.status = None;
        self.persist_query();
    }

    fn toggle_mode(&mut self) {
        let mode = self.state().mode.toggled();
        self.controller.set_mode(mode);
        self.chart_offset = 0;
        self.set_toast(format!("Comparing with {}", mode.label()), false);
    }

    fn persist_query(&mut self) {
        if !self.persist {
            return;
        }
        let query = self.controller.query().to_string();
        if let Err(err) = storage::write_last_query(&query) {
            error!("failed to save query state: {err}");
            self.status = Some(format!("Failed to save selection: {err}"));
        }
    }

    fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        if !self.persist {
            return;
        }
        if let Err(err) = storage::write_theme(self.theme) {
            self.status = Some(format!("Failed to save theme: {err}"));
        }
    }

    fn enter_date_input(&mut self) {
        let current = self.state().current;
        self.start_input = current
            .map(|range| iso_date(range.start()))
            .unwrap_or_default();
        self.end_input = current
            .map(|range| iso_date(range.end()))
            .unwrap_or_default();
        self.date_field = DateField::Start;
        self.mode = Mode::DateInput;
        self.status = None;
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.date_field {
            DateField::Start => &mut self.start_input,
            DateField::End => &mut self.end_input,
        }
    }

    pub fn is_date_start_active(&self) -> bool {
        self.date_field == DateField::Start
    }

    pub fn date_start_input_value(&self) -> &str {
        &self.start_input
    }

    pub fn date_end_input_value(&self) -> &str {
        &self.end_input
    }

    fn copy_share_link(&mut self) {
        if self.state().current.is_none() {
            self.set_toast("Select a date range first.", true);
            return;
        }

        let link = self.share_link();
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(link.clone())) {
            Ok(_) => {
                info!("copied share link {link}");
                self.set_toast("Copied share link.", false);
            }
            Err(err) => {
                let message = format!("Clipboard error: {err}");
                self.status = Some(message.clone());
                self.set_toast(message, true);
            }
        }
    }

    pub fn active_toast(&mut self) -> Option<ToastView> {
        let toast = self.toast.as_ref()?;
        if toast.created_at.elapsed() > Duration::from_secs(2) {
            self.toast = None;
            return None;
        }
        Some(ToastView {
            message: toast.message.clone(),
            is_error: toast.is_error,
        })
    }

    fn set_toast(&mut self, message: impl Into<String>, is_error: bool) {
        self.toast = Some(Toast {
            message: message.into(),
            created_at: Instant::now(),
            is_error,
        });
    }
}

fn optional_date(value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_date(value).map(Some)
}

struct Toast {
    message: String,
    created_at: Instant,
    is_error: bool,
}

pub struct ToastView {
    pub message: String,
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::ComparisonMode;
    use crate::orders::OrderBook;
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        let controller = Controller::new(OrderBook::default(), ComparisonMode::PreviousMonth);
        App::new(controller, false)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    #[test]
    fn date_input_applies_range_and_updates_share_link() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        type_text(&mut app, "2024-03-05");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2024-03-20");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Dashboard);
        assert_eq!(app.state().series.as_ref().map(|s| s.len()), Some(16));
        assert_eq!(
            app.share_link(),
            "http://localhost:3000/?startDate=2024-03-05&endDate=2024-03-20"
        );
    }

    #[test]
    fn invalid_date_input_keeps_dialog_open() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        type_text(&mut app, "2024-03-20");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2024-03-05");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::DateInput);
        assert!(app.status.is_some());
        assert_eq!(app.state().current, None);
    }

    #[test]
    fn missing_end_date_is_reported() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        type_text(&mut app, "2024-03-20");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::DateInput);
        assert_eq!(
            app.status.as_deref(),
            Some("Start date requires an end date.")
        );
    }

    #[test]
    fn mode_toggle_and_clear() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        type_text(&mut app, "2024-03-05");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2024-03-06");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.state().mode, ComparisonMode::PreviousYear);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.state().current, None);
        assert_eq!(app.share_link(), "http://localhost:3000/");
    }
}
