use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;

use crate::error::Result;
use crate::fmt::money;
use crate::models::Direction;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const DUPLICATE_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::CROSSED_OUT);

/// Format an amount as a colored Span (green for entrada, red for saida).
/// Shows the absolute value; color carries the direction.
pub fn money_span(amount: f64, direction: Direction) -> Span<'static> {
    let style = match direction {
        Direction::Entrada => AMOUNT_POS_STYLE,
        Direction::Saida => AMOUNT_NEG_STYLE,
    };
    Span::styled(money(amount.abs()), style)
}

/// Truncate text to `width` display characters with a trailing ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let wrapped = textwrap::wrap(text, width.saturating_sub(1).max(1));
    let first = wrapped.first().map(|l| l.to_string()).unwrap_or_default();
    format!("{first}\u{2026}")
}

pub enum ScreenAction {
    Continue,
    Close,
}

pub trait Screen {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ScreenAction;
}

/// Run an interactive ratatui screen. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_screen(view: &mut dyn Screen) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match view.handle_key(key.code) {
                    ScreenAction::Close => break Ok(()),
                    ScreenAction::Continue => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Padaria", 10), "Padaria");
        assert_eq!(truncate("Supermercado ABC Ltda", 14), "Supermercado\u{2026}");
    }
}
