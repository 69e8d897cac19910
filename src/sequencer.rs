//! Practice turn sequencer
//!
//! Coordinates one turn end to end: stop recording, transcribe, compare,
//! fetch the spoken reply, play it, then advance or retry. Steps run
//! strictly in order; the turn-lock is held from the moment capture stops
//! until reply playback settles, and every failure drops the session back
//! to `Idle` with the lock released.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::audio::{AudioSink, Recorder};
use crate::backend::SpeechBackend;
use crate::catalog::Category;
use crate::feedback::{Feedback, FeedbackKind};
use crate::session::{Outcome, Session, TurnPhase};
use crate::{Error, Result};

/// Cache file for the current prompt audio, most recent wins
const TTS_CACHE_FILE: &str = "tts.wav";

/// Cache file for the current reply audio, most recent wins
const REPLY_CACHE_FILE: &str = "airesponse.wav";

/// What one completed turn resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Index the turn was started on
    pub index: usize,
    /// Trimmed transcript of the attempt
    pub heard: String,
    /// Whether the normalized attempt matched the target
    pub correct: bool,
}

/// Runs the record, verify, respond, advance sequence for one session
pub struct TurnSequencer<B, R, P> {
    session: Arc<Mutex<Session>>,
    backend: B,
    recorder: R,
    player: P,
    feedback: Feedback,
    cache_dir: PathBuf,
    last_prompt_key: Option<(Category, usize)>,
}

impl<B, R, P> TurnSequencer<B, R, P>
where
    B: SpeechBackend,
    R: Recorder,
    P: AudioSink,
{
    /// Create a sequencer over a shared session
    pub fn new(
        session: Arc<Mutex<Session>>,
        backend: B,
        recorder: R,
        player: P,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            backend,
            recorder,
            player,
            feedback: Feedback::new(),
            cache_dir,
            last_prompt_key: None,
        }
    }

    /// Handle to the shared session state
    #[must_use]
    pub fn session(&self) -> Arc<Mutex<Session>> {
        Arc::clone(&self.session)
    }

    /// The feedback signal for the front end to render
    #[must_use]
    pub const fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// Speak the current item
    ///
    /// Keyed by (category, index): a repeated call for the same visible
    /// item is skipped so re-renders never duplicate network traffic.
    /// `force` bypasses the key check (the explicit repeat control).
    /// Failures are logged by the caller; playback is simply skipped and
    /// the prompt-playing flag always ends cleared.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis, caching, or playback fails
    pub async fn speak_current(&mut self, force: bool) -> Result<()> {
        let (key, item) = {
            let session = self.lock_session();
            ((session.category(), session.index()), session.current_item())
        };

        if !force && self.last_prompt_key == Some(key) {
            tracing::trace!(item, "prompt already spoken for this item");
            return Ok(());
        }
        self.last_prompt_key = Some(key);

        tracing::debug!(item, "speaking prompt");
        let audio = self.backend.synthesize(item).await?;
        self.write_cache(TTS_CACHE_FILE, &audio)?;

        self.lock_session().set_prompt_playing(true);
        let played = self.player.play_to_end(&audio).await;
        self.lock_session().set_prompt_playing(false);
        played
    }

    /// Start capturing an attempt
    ///
    /// Returns false without touching any state when a turn is in flight
    /// or prompt audio is still playing.
    ///
    /// # Errors
    ///
    /// Returns error if the microphone is unavailable or capture fails;
    /// the session stays `Idle`.
    pub fn start_recording(&mut self) -> Result<bool> {
        {
            let mut session = self.lock_session();
            if !session.can_start_recording() {
                tracing::debug!(phase = ?session.phase(), "recording rejected");
                return Ok(false);
            }
            session.try_transition(TurnPhase::Recording);
        }

        if let Err(e) = self.recorder.start() {
            self.lock_session().try_transition(TurnPhase::Idle);
            return Err(e);
        }

        tracing::info!("recording started");
        Ok(true)
    }

    /// Stop capturing and run the turn to completion
    ///
    /// Returns `Ok(None)` if no recording was active. The lock is taken
    /// before any network I/O and released when the reply finishes playing
    /// or any step fails.
    ///
    /// # Errors
    ///
    /// Returns error if any step of the turn fails; the session is reset
    /// to `Idle` first
    pub async fn finish_turn(&mut self) -> Result<Option<TurnReport>> {
        if !self.recorder.is_recording() {
            return Ok(None);
        }
        let clip = self.recorder.stop();

        // Lock the turn before any network I/O so a second recording
        // cannot start mid-flight. Capture index, target, and epoch now:
        // the visible index may change while we await.
        let (turn_index, target, epoch) = {
            let mut session = self.lock_session();
            session.try_transition(TurnPhase::Transcribing);
            (session.index(), session.current_item(), session.epoch())
        };

        let result = match clip {
            Ok(clip) => self.evaluate(clip, turn_index, target, epoch).await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.lock_session().try_transition(TurnPhase::Idle);
        }
        result
    }

    /// The evaluation pipeline; assumes the lock is already held
    async fn evaluate(
        &mut self,
        clip: Vec<u8>,
        turn_index: usize,
        target: &str,
        epoch: u64,
    ) -> Result<Option<TurnReport>> {
        let heard = self.backend.transcribe(clip).await?;
        if self.aborted(epoch) {
            return Ok(None);
        }

        let normalized = normalize_heard(&heard);
        let correct = normalized == target.to_lowercase();
        tracing::info!(heard = %heard, target, correct, "attempt evaluated");

        self.feedback.trigger(if correct {
            FeedbackKind::Correct
        } else {
            FeedbackKind::Wrong
        });

        {
            let mut session = self.lock_session();
            session.record_outcome(
                turn_index,
                if correct { Outcome::Correct } else { Outcome::Wrong },
            );
            session.try_transition(TurnPhase::AwaitingReply);
        }

        let reply = self.backend.reply(&normalized, target).await?;
        if self.aborted(epoch) {
            return Ok(None);
        }
        self.write_cache(REPLY_CACHE_FILE, &reply)?;

        let played = self.player.play_to_end(&reply).await;

        {
            let mut session = self.lock_session();
            session.try_transition(TurnPhase::Idle);
            played?;
            if correct && session.epoch() == epoch {
                session.advance_from(turn_index);
            }
        }

        Ok(Some(TurnReport {
            index: turn_index,
            heard,
            correct,
        }))
    }

    /// Whether the category was switched away since the turn began;
    /// if so, abandon the rest of the turn and release the lock
    fn aborted(&self, epoch: u64) -> bool {
        let mut session = self.lock_session();
        if session.epoch() == epoch {
            return false;
        }
        tracing::debug!("category changed mid-turn, aborting");
        session.try_transition(TurnPhase::Idle);
        true
    }

    fn write_cache(&self, name: &str, audio: &[u8]) -> Result<()> {
        let path = self.cache_dir.join(name);
        std::fs::write(&path, audio).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "cache write failed");
            Error::Io(e)
        })
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Session> {
        // A poisoned lock means a panic elsewhere; propagate it
        self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Normalize a transcript for comparison: lowercase, strip everything
/// that is not a word character
///
/// Targets are plain alphanumeric tokens and are only lowercased.
#[must_use]
pub fn normalize_heard(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
