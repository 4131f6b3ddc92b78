use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::fmt::money;
use crate::preview::ImportSession;
use crate::tui::{
    money_span, truncate, Screen, ScreenAction, DUPLICATE_STYLE, FOOTER_STYLE, HEADER_STYLE,
    SELECTED_STYLE,
};

pub enum PreviewOutcome {
    Commit(ImportSession),
    Cancel,
}

enum Mode {
    Browse,
    EditCategory,
}

/// Review screen shown before an import is committed.
pub struct PreviewScreen {
    session: ImportSession,
    selection: usize,
    scroll_offset: usize,
    last_visible_rows: usize,
    mode: Mode,
    text_input: String,
    confirmed: bool,
    status_message: Option<String>,
}

impl PreviewScreen {
    pub fn new(session: ImportSession) -> Self {
        Self {
            session,
            selection: 0,
            scroll_offset: 0,
            last_visible_rows: 20,
            mode: Mode::Browse,
            text_input: String::new(),
            confirmed: false,
            status_message: None,
        }
    }

    pub fn into_outcome(self) -> PreviewOutcome {
        if self.confirmed {
            PreviewOutcome::Commit(self.session)
        } else {
            PreviewOutcome::Cancel
        }
    }

    fn ensure_visible(&mut self) {
        if self.selection < self.scroll_offset {
            self.scroll_offset = self.selection;
        } else if self.selection >= self.scroll_offset + self.last_visible_rows {
            self.scroll_offset = self.selection + 1 - self.last_visible_rows;
        }
    }

    fn handle_browse_key(&mut self, code: KeyCode) -> ScreenAction {
        self.status_message = None;
        match code {
            KeyCode::Up => {
                self.selection = self.selection.saturating_sub(1);
                self.ensure_visible();
            }
            KeyCode::Down => {
                if !self.session.rows.is_empty() {
                    self.selection = (self.selection + 1).min(self.session.rows.len() - 1);
                    self.ensure_visible();
                }
            }
            KeyCode::Char(' ') => {
                if !self.session.toggle(self.selection) && !self.session.rows.is_empty() {
                    self.status_message = Some("Duplicates cannot be selected".into());
                }
            }
            KeyCode::Char('a') => self.session.select_all(),
            KeyCode::Char('n') => self.session.deselect_all(),
            KeyCode::Char('c') => {
                if let Some(row) = self.session.rows.get(self.selection) {
                    self.text_input = row.category.clone();
                    self.mode = Mode::EditCategory;
                }
            }
            KeyCode::Enter => {
                self.confirmed = true;
                return ScreenAction::Close;
            }
            KeyCode::Char('q') | KeyCode::Esc => return ScreenAction::Close,
            _ => {}
        }
        ScreenAction::Continue
    }

    fn handle_edit_key(&mut self, code: KeyCode) -> ScreenAction {
        match code {
            KeyCode::Enter => {
                if self.session.set_category(self.selection, &self.text_input) {
                    self.mode = Mode::Browse;
                } else {
                    self.status_message = Some("Category cannot be empty".into());
                }
            }
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Backspace => {
                self.text_input.pop();
            }
            KeyCode::Char(c) => self.text_input.push(c),
            _ => {}
        }
        ScreenAction::Continue
    }
}

impl Screen for PreviewScreen {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep, content_area, totals_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(
                " Import preview: {} ({})",
                self.session.file_name, self.session.file_type
            ))
            .style(HEADER_STYLE),
            header_area,
        );
        let sep_line = "\u{2501}".repeat(area.width as usize);
        frame.render_widget(
            Paragraph::new(sep_line.as_str()).style(Style::default().fg(Color::DarkGray)),
            sep,
        );

        // 1 line for the column header
        self.last_visible_rows = (content_area.height as usize).saturating_sub(1).max(1);

        let mut lines = vec![Line::from(Span::styled(
            format!(
                "      {:<10}  {:<36}  {:>14}  {}",
                "Date", "Description", "Amount", "Category"
            ),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ))];

        if self.session.rows.is_empty() {
            lines.push(Line::from("   No transactions found in this file."));
        }

        let end = (self.scroll_offset + self.last_visible_rows).min(self.session.rows.len());
        for i in self.scroll_offset..end {
            let row = &self.session.rows[i];
            let check = if row.is_duplicate {
                "dup"
            } else if row.is_selected {
                "[x]"
            } else {
                "[ ]"
            };
            let marker = if i == self.selection { ">" } else { " " };
            let mut spans = vec![
                Span::raw(format!("{marker} {check} {:<10}  ", row.date.format("%d/%m/%Y"))),
                Span::raw(format!("{:<36}  ", truncate(&row.description, 36))),
                money_span(row.amount, row.direction),
                Span::raw(format!("  {}", row.category)),
            ];
            if row.is_duplicate {
                spans = spans
                    .into_iter()
                    .map(|s| Span::styled(s.content, DUPLICATE_STYLE))
                    .collect();
            }
            let mut line = Line::from(spans);
            if i == self.selection {
                line = line.style(SELECTED_STYLE);
            }
            lines.push(line);
        }
        frame.render_widget(Paragraph::new(lines), content_area);

        let totals = self.session.totals();
        let totals_lines = vec![
            Line::from(format!(
                " {} selected  {} duplicates  {} unreadable rows",
                totals.selected_count,
                self.session.duplicate_count(),
                self.session.skipped.len()
            )),
            Line::from(format!(
                " Entradas {}  Saidas {}  Net {}",
                money(totals.entradas),
                money(totals.saidas),
                money(totals.net())
            )),
        ];
        frame.render_widget(Paragraph::new(totals_lines), totals_area);

        let hints = match (&self.mode, &self.status_message) {
            (Mode::EditCategory, _) => format!(" Category: {}\u{2588}  Enter=save  Esc=cancel", self.text_input),
            (Mode::Browse, Some(msg)) => format!(" {msg}"),
            (Mode::Browse, None) => {
                " Space=toggle  a=all  n=none  c=category  Enter=import  Esc=cancel".to_string()
            }
        };
        let hint_style = match (&self.mode, &self.status_message) {
            (Mode::Browse, Some(_)) => Style::default().fg(Color::Yellow),
            _ => FOOTER_STYLE,
        };
        frame.render_widget(Paragraph::new(hints).style(hint_style), hints_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ScreenAction {
        match self.mode {
            Mode::Browse => self.handle_browse_key(code),
            Mode::EditCategory => self.handle_edit_key(code),
        }
    }
}
