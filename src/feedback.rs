//! Transient correct/wrong feedback signal
//!
//! Drives the colored flash the front end shows after a turn: ease-in,
//! hold, fade-out. Retriggering restarts the envelope instead of stacking,
//! and a hard timeout clears the signal even if the renderer never polls
//! the envelope to its end.

use std::time::{Duration, Instant};

/// Ease-in duration
const FADE_IN: Duration = Duration::from_millis(500);

/// Default hold at peak before fading
const DEFAULT_HOLD: Duration = Duration::from_millis(1000);

/// Fade-out duration
const FADE_OUT: Duration = Duration::from_millis(1000);

/// Peak intensity of the flash
const PEAK: f32 = 0.8;

/// Signal is force-cleared this long after triggering, regardless of
/// where the envelope is
const AUTO_CLEAR: Duration = Duration::from_millis(3000);

/// Kind of feedback to flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Wrong,
}

/// One-shot feedback flash with an ease-in / hold / fade-out envelope
#[derive(Debug, Default)]
pub struct Feedback {
    active: Option<(FeedbackKind, Instant, Duration)>,
}

impl Feedback {
    /// Create an inactive signal
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Trigger a flash, cancelling any flash still in progress
    pub fn trigger(&mut self, kind: FeedbackKind) {
        self.trigger_with_hold(kind, DEFAULT_HOLD);
    }

    /// Trigger with a caller-chosen hold duration
    pub fn trigger_with_hold(&mut self, kind: FeedbackKind, hold: Duration) {
        self.active = Some((kind, Instant::now(), hold));
    }

    /// Clear the signal immediately
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The kind currently flashing, if the signal is still live at `now`
    #[must_use]
    pub fn kind_at(&self, now: Instant) -> Option<FeedbackKind> {
        let (kind, started, hold) = self.active?;
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= AUTO_CLEAR || elapsed >= FADE_IN + hold + FADE_OUT {
            return None;
        }
        Some(kind)
    }

    /// Envelope intensity in `[0, PEAK]` at `now`
    #[must_use]
    pub fn level_at(&self, now: Instant) -> f32 {
        let Some((_, started, hold)) = self.active else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= AUTO_CLEAR {
            return 0.0;
        }

        if elapsed < FADE_IN {
            // Quadratic ease-out toward the peak
            let t = elapsed.as_secs_f32() / FADE_IN.as_secs_f32();
            return PEAK * (1.0 - (1.0 - t) * (1.0 - t));
        }
        if elapsed < FADE_IN + hold {
            return PEAK;
        }
        let fading = elapsed - FADE_IN - hold;
        if fading < FADE_OUT {
            let t = fading.as_secs_f32() / FADE_OUT.as_secs_f32();
            return PEAK * (1.0 - t);
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_is_silent() {
        let feedback = Feedback::new();
        assert_eq!(feedback.kind_at(Instant::now()), None);
        assert!(feedback.level_at(Instant::now()) < f32::EPSILON);
    }

    #[test]
    fn test_envelope_shape() {
        let mut feedback = Feedback::new();
        feedback.trigger(FeedbackKind::Correct);
        let start = feedback.active.unwrap().1;

        // Rising during ease-in
        let early = feedback.level_at(start + Duration::from_millis(100));
        let later = feedback.level_at(start + Duration::from_millis(400));
        assert!(early > 0.0 && later > early);

        // At peak during hold
        let held = feedback.level_at(start + Duration::from_millis(900));
        assert!((held - 0.8).abs() < 0.01);

        // Falling during fade-out
        let fading = feedback.level_at(start + Duration::from_millis(2000));
        assert!(fading > 0.0 && fading < 0.8);

        // Gone after the envelope
        assert!(feedback.level_at(start + Duration::from_millis(2600)) < f32::EPSILON);
    }

    #[test]
    fn test_retrigger_resets() {
        let mut feedback = Feedback::new();
        feedback.trigger(FeedbackKind::Wrong);
        feedback.trigger(FeedbackKind::Correct);

        let start = feedback.active.unwrap().1;
        assert_eq!(
            feedback.kind_at(start + Duration::from_millis(100)),
            Some(FeedbackKind::Correct)
        );
        // Fresh envelope: still ramping, not mid-fade of the old one
        assert!(feedback.level_at(start + Duration::from_millis(100)) < 0.8);
    }

    #[test]
    fn test_auto_clear_bounds_lifetime() {
        let mut feedback = Feedback::new();
        // A very long hold would outlive the auto-clear deadline
        feedback.trigger_with_hold(FeedbackKind::Correct, Duration::from_secs(60));
        let start = feedback.active.unwrap().1;

        assert_eq!(
            feedback.kind_at(start + Duration::from_secs(2)),
            Some(FeedbackKind::Correct)
        );
        assert_eq!(feedback.kind_at(start + Duration::from_secs(4)), None);
        assert!(feedback.level_at(start + Duration::from_secs(4)) < f32::EPSILON);
    }

    #[test]
    fn test_shorter_hold() {
        let mut feedback = Feedback::new();
        feedback.trigger_with_hold(FeedbackKind::Wrong, Duration::from_millis(100));
        let start = feedback.active.unwrap().1;

        // Envelope ends at 500 + 100 + 1000 ms
        assert!(feedback.kind_at(start + Duration::from_millis(1500)).is_some());
        assert_eq!(feedback.kind_at(start + Duration::from_millis(1700)), None);
    }
}
