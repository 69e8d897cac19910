//! Practice session state
//!
//! One explicit struct owns everything the original UI kept as ambient
//! component state: active category, current index, per-item results, and
//! the turn phase. All mutation goes through methods here; the sequencer
//! shares it behind an `Arc<Mutex>`.

use std::collections::HashMap;

use crate::catalog::Category;

/// Result of a completed turn for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
}

/// Phase of the turn state machine
///
/// The turn-lock is derived from this tag: a new recording may only start
/// in `Idle`, and only while no prompt audio is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// No turn in flight
    Idle,
    /// Microphone capture active
    Recording,
    /// Clip uploaded, waiting for transcription
    Transcribing,
    /// Waiting for the spoken reply and its playback
    AwaitingReply,
}

/// Session state for one practice run
#[derive(Debug)]
pub struct Session {
    category: Category,
    index: usize,
    progress: HashMap<usize, Outcome>,
    phase: TurnPhase,
    prompt_playing: bool,
    epoch: u64,
}

impl Session {
    /// Create a session starting at the first item of `category`
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            index: 0,
            progress: HashMap::new(),
            phase: TurnPhase::Idle,
            prompt_playing: false,
            epoch: 0,
        }
    }

    /// Active category
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Current item index
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The item currently shown and prompted
    #[must_use]
    pub fn current_item(&self) -> &'static str {
        self.category.items()[self.index]
    }

    /// Ordered items of the active category
    #[must_use]
    pub const fn items(&self) -> &'static [&'static str] {
        self.category.items()
    }

    /// Epoch counter, bumped on every category change
    ///
    /// The sequencer captures the epoch when a turn starts and aborts the
    /// remainder of the turn if it observes a different value after a
    /// suspension point.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Switch category: no-op if unchanged, otherwise reset index and
    /// clear all progress
    pub fn select_category(&mut self, category: Category) {
        if category == self.category {
            return;
        }
        tracing::info!(category = %category, "category selected");
        self.category = category;
        self.index = 0;
        self.progress.clear();
        self.epoch += 1;
    }

    /// Manual navigation: step back, clamped at the first item
    pub fn go_prev(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    /// Manual navigation: step forward, clamped at the last item
    pub fn go_next(&mut self) {
        if self.index < self.items().len() - 1 {
            self.index += 1;
        }
    }

    /// Whether the "previous" control is enabled
    #[must_use]
    pub const fn can_go_prev(&self) -> bool {
        self.index > 0
    }

    /// Whether the "next" control is enabled
    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.index < self.items().len() - 1
    }

    /// Automatic advancement after a correct answer: moves to the item
    /// after the one the turn was started on, wrapping past the end
    ///
    /// Uses the captured turn index `from`, not the visible index, so
    /// manual navigation during the turn cannot skew the landing spot.
    pub fn advance_from(&mut self, from: usize) {
        self.index = (from + 1) % self.items().len();
    }

    /// Record the outcome for the item a turn was started on
    pub fn record_outcome(&mut self, index: usize, outcome: Outcome) {
        self.progress.insert(index, outcome);
    }

    /// Outcome recorded for `index`, if any
    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<Outcome> {
        self.progress.get(&index).copied()
    }

    /// Current turn phase
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Whether the turn-lock is held (transcription or reply pending)
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self.phase, TurnPhase::Transcribing | TurnPhase::AwaitingReply)
    }

    /// Whether prompt audio is currently playing
    #[must_use]
    pub const fn is_prompt_playing(&self) -> bool {
        self.prompt_playing
    }

    /// Mark prompt audio as playing or stopped
    pub const fn set_prompt_playing(&mut self, playing: bool) {
        self.prompt_playing = playing;
    }

    /// Whether a new recording may start right now
    #[must_use]
    pub const fn can_start_recording(&self) -> bool {
        matches!(self.phase, TurnPhase::Idle) && !self.prompt_playing
    }

    /// The single authoritative phase transition
    ///
    /// Returns false and leaves the phase untouched for edges the turn
    /// state machine does not allow. Any phase may fall back to `Idle`
    /// (turn abandoned on error).
    pub const fn try_transition(&mut self, to: TurnPhase) -> bool {
        let allowed = match (self.phase, to) {
            (_, TurnPhase::Idle) => true,
            (TurnPhase::Idle, TurnPhase::Recording) => !self.prompt_playing,
            (TurnPhase::Recording, TurnPhase::Transcribing)
            | (TurnPhase::Transcribing, TurnPhase::AwaitingReply) => true,
            _ => false,
        };
        if allowed {
            self.phase = to;
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_category_resets() {
        let mut session = Session::new(Category::Animals);
        session.go_next();
        session.record_outcome(0, Outcome::Correct);

        session.select_category(Category::Fruits);
        assert_eq!(session.category(), Category::Fruits);
        assert_eq!(session.index(), 0);
        assert_eq!(session.outcome(0), None);
        assert_eq!(session.epoch(), 1);
    }

    #[test]
    fn test_select_same_category_is_noop() {
        let mut session = Session::new(Category::Animals);
        session.go_next();
        session.record_outcome(0, Outcome::Wrong);

        session.select_category(Category::Animals);
        assert_eq!(session.index(), 1);
        assert_eq!(session.outcome(0), Some(Outcome::Wrong));
        assert_eq!(session.epoch(), 0);
    }

    #[test]
    fn test_manual_navigation_clamps() {
        let mut session = Session::new(Category::Shapes);
        assert!(!session.can_go_prev());
        session.go_prev();
        assert_eq!(session.index(), 0);

        for _ in 0..10 {
            session.go_next();
        }
        assert_eq!(session.index(), Category::Shapes.len() - 1);
        assert!(!session.can_go_next());
    }

    #[test]
    fn test_advance_wraps() {
        let mut session = Session::new(Category::Shapes);
        let last = Category::Shapes.len() - 1;
        session.advance_from(last);
        assert_eq!(session.index(), 0);

        session.advance_from(1);
        assert_eq!(session.index(), 2);
    }

    #[test]
    fn test_transitions() {
        let mut session = Session::new(Category::Animals);
        assert!(session.try_transition(TurnPhase::Recording));
        assert!(!session.try_transition(TurnPhase::AwaitingReply));
        assert!(session.try_transition(TurnPhase::Transcribing));
        assert!(session.is_locked());
        assert!(session.try_transition(TurnPhase::AwaitingReply));
        assert!(session.is_locked());
        assert!(session.try_transition(TurnPhase::Idle));
        assert!(!session.is_locked());
    }

    #[test]
    fn test_recording_blocked_by_prompt() {
        let mut session = Session::new(Category::Animals);
        session.set_prompt_playing(true);
        assert!(!session.can_start_recording());
        assert!(!session.try_transition(TurnPhase::Recording));

        session.set_prompt_playing(false);
        assert!(session.can_start_recording());
        assert!(session.try_transition(TurnPhase::Recording));
    }
}
