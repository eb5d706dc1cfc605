use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};
use storerate::domain::{AppConfig, Message, StoreError};

use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, StoreError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                // crossterm also reports release and repeat events on some platforms
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key, model.is_rating()));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, rating: bool) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char(c @ '1'..='5'), _) if rating => {
                c.to_digit(10).map(|d| Message::Star(d as u8))
            }
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Some(Message::MoveLeft),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Some(Message::MoveRight),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Tab, _) => Some(Message::NextTab),
            (KeyCode::BackTab, _) => Some(Message::PreviousTab),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('n'), _) => Some(Message::FieldSearch(0)),
            (KeyCode::Char('a'), _) => Some(Message::FieldSearch(1)),
            (KeyCode::Char('c'), _) => Some(Message::ClearFilters),
            (KeyCode::Char('f'), _) => Some(Message::CycleFilter),
            (KeyCode::Char('F'), _) => Some(Message::ClearFilter),
            (KeyCode::Char('s'), _) => Some(Message::Sort),
            (KeyCode::Char('v'), _) => Some(Message::View),
            (KeyCode::Char('e'), _) => Some(Message::Edit),
            (KeyCode::Char('d'), _) => Some(Message::Delete),
            (KeyCode::Char('r'), _) => Some(Message::Rate),
            (KeyCode::Enter, _) => Some(Message::Enter),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
