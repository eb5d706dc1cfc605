//! Star rating input for one subject: pick 1..=5, then submit or cancel.

use tracing::trace;

use crate::rating::{MAX_RATING, MIN_RATING};

/// 0 means "no rating yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingInputState {
    Idle { committed: u8 },
    Editing { committed: u8, candidate: u8 },
}

#[derive(Debug, Clone)]
pub struct RatingInput {
    subject: String,
    state: RatingInputState,
}

impl RatingInput {
    /// Values above 5 are clamped to "no rating".
    pub fn new(subject: impl Into<String>, existing: Option<u8>) -> Self {
        let committed = existing.filter(|v| *v <= MAX_RATING).unwrap_or(0);
        Self {
            subject: subject.into(),
            state: RatingInputState::Idle { committed },
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn state(&self) -> RatingInputState {
        self.state
    }

    pub fn committed(&self) -> u8 {
        match self.state {
            RatingInputState::Idle { committed } | RatingInputState::Editing { committed, .. } => {
                committed
            }
        }
    }

    pub fn candidate(&self) -> Option<u8> {
        match self.state {
            RatingInputState::Editing { candidate, .. } => Some(candidate),
            RatingInputState::Idle { .. } => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, RatingInputState::Editing { .. })
    }

    pub fn begin_edit(&mut self) {
        if let RatingInputState::Idle { committed } = self.state {
            self.state = RatingInputState::Editing {
                committed,
                candidate: committed,
            };
            trace!("Rating input for {} entered editing", self.subject);
        }
    }

    pub fn select_star(&mut self, star: u8) {
        if !(MIN_RATING..=MAX_RATING).contains(&star) {
            trace!("Ignoring star {star} for {}", self.subject);
            return;
        }
        if let RatingInputState::Editing { candidate, .. } = &mut self.state {
            *candidate = star;
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, RatingInputState::Editing { candidate, .. } if candidate >= MIN_RATING)
    }

    /// Emits the candidate exactly once through `on_rate` and commits it.
    /// Returns the emitted value, or `None` when submitting is not allowed.
    pub fn submit<F>(&mut self, on_rate: F) -> Option<u8>
    where
        F: FnOnce(&str, u8),
    {
        if !self.can_submit() {
            trace!("Submit ignored for {}: nothing selected", self.subject);
            return None;
        }
        let candidate = self.candidate()?;
        on_rate(&self.subject, candidate);
        self.state = RatingInputState::Idle {
            committed: candidate,
        };
        Some(candidate)
    }

    pub fn cancel(&mut self) {
        if let RatingInputState::Editing { committed, .. } = self.state {
            self.state = RatingInputState::Idle { committed };
        }
    }

    /// Stars currently shown: the candidate while editing, otherwise the committed value.
    pub fn shown(&self) -> u8 {
        self.candidate().unwrap_or_else(|| self.committed())
    }

    pub fn prompt_label(&self) -> &'static str {
        if self.committed() > 0 {
            "Update Rating"
        } else {
            "Rate Store"
        }
    }

    pub fn committed_badge(&self) -> Option<String> {
        match self.committed() {
            0 => None,
            1 => Some("1 star".to_string()),
            n => Some(format!("{n} stars")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_emits_once_and_commits() {
        let mut input = RatingInput::new("store-1", None);
        assert_eq!(input.state(), RatingInputState::Idle { committed: 0 });

        let mut emitted = Vec::new();
        input.begin_edit();
        input.select_star(4);
        let value = input.submit(|subject, v| emitted.push((subject.to_string(), v)));

        assert_eq!(value, Some(4));
        assert_eq!(emitted, vec![("store-1".to_string(), 4)]);
        assert_eq!(input.state(), RatingInputState::Idle { committed: 4 });
    }

    #[test]
    fn cancel_discards_candidate() {
        let mut input = RatingInput::new("store-1", Some(3));
        let before = input.state();
        let mut emitted = 0;
        input.begin_edit();
        input.select_star(2);
        input.cancel();
        assert_eq!(input.submit(|_, _| emitted += 1), None);
        assert_eq!(emitted, 0);
        assert_eq!(input.state(), before);
    }

    #[test]
    fn zero_candidate_cannot_submit() {
        let mut input = RatingInput::new("store-1", None);
        input.begin_edit();
        assert!(!input.can_submit());
        let mut emitted = 0;
        assert_eq!(input.submit(|_, _| emitted += 1), None);
        assert_eq!(emitted, 0);
        assert!(input.is_editing());
    }

    #[test]
    fn transitions_outside_editing_are_noops() {
        let mut input = RatingInput::new("store-1", Some(2));
        input.select_star(5);
        input.cancel();
        assert_eq!(input.state(), RatingInputState::Idle { committed: 2 });

        input.begin_edit();
        input.begin_edit();
        input.select_star(7);
        input.select_star(0);
        assert_eq!(input.candidate(), Some(2));
    }

    #[test]
    fn editing_starts_from_committed_value() {
        let mut input = RatingInput::new("store-1", Some(5));
        input.begin_edit();
        assert!(input.can_submit());
        assert_eq!(input.shown(), 5);
        input.select_star(1);
        assert_eq!(input.shown(), 1);
    }

    #[test]
    fn labels_follow_committed_value() {
        let mut input = RatingInput::new("s", None);
        assert_eq!(input.prompt_label(), "Rate Store");
        assert_eq!(input.committed_badge(), None);
        input.begin_edit();
        input.select_star(1);
        input.submit(|_, _| {});
        assert_eq!(input.prompt_label(), "Update Rating");
        assert_eq!(input.committed_badge().as_deref(), Some("1 star"));
        assert_eq!(RatingInput::new("s", Some(4)).committed_badge().as_deref(), Some("4 stars"));
    }
}
