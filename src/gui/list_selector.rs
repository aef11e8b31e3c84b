use std::io::stdout;

use crate::gui::error::GuideGuiError;

use crossterm::{
    event::{self, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{
        block::{Position, Title},
        *,
    },
    Terminal,
};

/// What a key press did to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    Pending,
    Chosen(usize),
    Cancelled,
}

/// Cursor movement over `len` items, wrapping at both ends.
#[derive(Debug, Clone, Copy)]
pub struct SelectorState {
    cursor: usize,
    len: usize,
}

impl SelectorState {
    pub fn new(len: usize) -> Self {
        Self { cursor: 0, len }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn on_key(&mut self, code: KeyCode) -> SelectorEvent {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => SelectorEvent::Cancelled,
            _ if self.len == 0 => SelectorEvent::Pending,
            KeyCode::Down => {
                self.cursor = (self.cursor + 1) % self.len;
                SelectorEvent::Pending
            }
            KeyCode::Up => {
                self.cursor = (self.cursor + self.len - 1) % self.len;
                SelectorEvent::Pending
            }
            KeyCode::Enter => SelectorEvent::Chosen(self.cursor),
            _ => SelectorEvent::Pending,
        }
    }
}

/// Lets the user pick one of `items` in a full screen list. Returns the
/// index of the chosen item, or `None` if they quit.
pub fn list_selector(title: &str, items: &[String]) -> Result<Option<usize>, GuideGuiError> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut state = SelectorState::new(items.len());
    let mut list_state = ListState::default().with_selected(Some(0));
    let outcome = loop {
        let title = Title::from(format!(" {title} ").magenta().bold());
        let instructions = Title::from(Line::from(vec![
            " Navigate ".into(),
            "<Up>/<Down>".magenta().bold(),
            " Select ".into(),
            "<Enter>".magenta().bold(),
            " Quit ".into(),
            "<Q> ".magenta().bold(),
        ]));
        let block = Block::default()
            .title(title.alignment(Alignment::Center))
            .title(
                instructions
                    .alignment(Alignment::Center)
                    .position(Position::Bottom),
            )
            .borders(Borders::ALL);
        let list = List::new(items.iter().map(String::as_str))
            .style(Style::default().fg(Color::White))
            .highlight_symbol(">>")
            .highlight_style(Style::default().fg(Color::Magenta))
            .block(block);
        list_state.select(Some(state.cursor()));
        terminal.draw(|frame| {
            let area = frame.size();
            frame.render_stateful_widget(list, area, &mut list_state);
        })?;
        if event::poll(std::time::Duration::from_millis(16))? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match state.on_key(key.code) {
                        SelectorEvent::Pending => {}
                        SelectorEvent::Chosen(i) => break Some(i),
                        SelectorEvent::Cancelled => break None,
                    }
                }
            }
        }
    };

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(outcome)
}
