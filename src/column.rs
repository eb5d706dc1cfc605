use derive_setters::Setters;
use std::collections::BTreeMap;

use crate::rating::stars;
use crate::record::{Record, Value};

/// Colour hint for badge cells; the ui maps it onto a terminal style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Primary,
    Accent,
    Destructive,
}

/// How a column turns a raw value into a display cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Renderer {
    #[default]
    Plain,
    Badge {
        labels: BTreeMap<String, String>,
        tones: BTreeMap<String, Tone>,
    },
    /// Read only star strip, optionally followed by "(N)" read from another field.
    Stars { count_field: Option<String> },
    Composite(Vec<Renderer>),
}

impl Renderer {
    pub fn badge<I, K, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, L, Tone)>,
        K: Into<String>,
        L: Into<String>,
    {
        let mut labels = BTreeMap::new();
        let mut tones = BTreeMap::new();
        for (raw, label, tone) in entries {
            let raw = raw.into();
            labels.insert(raw.clone(), label.into());
            tones.insert(raw, tone);
        }
        Renderer::Badge { labels, tones }
    }

    fn apply(&self, value: &Value, record: &Record) -> Cell {
        match self {
            Renderer::Plain => Cell::Text(value.to_string()),
            Renderer::Badge { labels, tones } => {
                let raw = value.to_string();
                Cell::Badge {
                    text: labels.get(&raw).cloned().unwrap_or_else(|| raw.clone()),
                    tone: tones.get(&raw).copied().unwrap_or_default(),
                }
            }
            Renderer::Stars { count_field } => Cell::Stars {
                value: value.as_number().unwrap_or(0.0),
                suffix: count_field
                    .as_ref()
                    .and_then(|f| record.get_string(f))
                    .map(|count| format!("({count})")),
            },
            Renderer::Composite(parts) => {
                Cell::Composite(parts.iter().map(|p| p.apply(value, record)).collect())
            }
        }
    }
}

/// A rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Badge { text: String, tone: Tone },
    Stars { value: f64, suffix: Option<String> },
    Composite(Vec<Cell>),
}

impl Cell {
    /// Plain text form used by the terminal table.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Badge { text, .. } => text.clone(),
            Cell::Stars { value, suffix } => match suffix {
                Some(s) => format!("{} {s}", stars(*value)),
                None => stars(*value),
            },
            Cell::Composite(parts) => parts
                .iter()
                .map(Cell::text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Cell::Badge { tone, .. } => *tone,
            Cell::Composite(parts) => parts
                .iter()
                .map(Cell::tone)
                .find(|t| *t != Tone::Neutral)
                .unwrap_or_default(),
            _ => Tone::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Setters)]
pub struct Column {
    #[setters(skip)]
    pub key: String,
    #[setters(skip)]
    pub label: String,
    pub sortable: bool,
    pub renderer: Renderer,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            renderer: Renderer::Plain,
        }
    }

    /// Missing fields render as [`Cell::Empty`], never as an error.
    pub fn render(&self, record: &Record) -> Cell {
        match record.get(&self.key) {
            Some(value) => self.renderer.apply(value, record),
            None => Cell::Empty,
        }
    }
}
