//! Shared test doubles for sequencer tests
//!
//! Scripted stand-ins for the speech backend, microphone, and speaker so
//! turns can run without a network or audio hardware.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wordica::audio::{AudioSink, Recorder};
use wordica::{Error, Result, SpeechBackend};

/// Callback a test can run inside a backend call (mid-turn mutation,
/// lock assertions)
pub type Hook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct BackendState {
    transcript: Mutex<String>,
    fail_stt: AtomicBool,
    fail_chat: AtomicBool,
    synth_count: AtomicUsize,
    stt_count: AtomicUsize,
    chat_count: AtomicUsize,
    last_reply_args: Mutex<Option<(String, String)>>,
    on_transcribe: Mutex<Option<Hook>>,
    on_reply: Mutex<Option<Hook>>,
}

/// Scripted speech backend
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<BackendState>,
}

impl MockBackend {
    #[must_use]
    pub fn new(transcript: &str) -> Self {
        let backend = Self::default();
        *backend.state.transcript.lock().unwrap() = transcript.to_string();
        backend
    }

    pub fn fail_stt(&self) {
        self.state.fail_stt.store(true, Ordering::SeqCst);
    }

    pub fn fail_chat(&self) {
        self.state.fail_chat.store(true, Ordering::SeqCst);
    }

    /// Run `hook` once, inside the next transcription call
    pub fn on_transcribe(&self, hook: Hook) {
        *self.state.on_transcribe.lock().unwrap() = Some(hook);
    }

    /// Run `hook` once, inside the next chat reply call
    pub fn on_reply(&self, hook: Hook) {
        *self.state.on_reply.lock().unwrap() = Some(hook);
    }

    #[must_use]
    pub fn synth_count(&self) -> usize {
        self.state.synth_count.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stt_count(&self) -> usize {
        self.state.stt_count.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn chat_count(&self) -> usize {
        self.state.chat_count.load(Ordering::SeqCst)
    }

    /// (message, correct_word) of the last reply request
    #[must_use]
    pub fn last_reply_args(&self) -> Option<(String, String)> {
        self.state.last_reply_args.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechBackend for MockBackend {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.state.synth_count.fetch_add(1, Ordering::SeqCst);
        Ok(b"prompt-audio".to_vec())
    }

    async fn transcribe(&self, _audio: Vec<u8>) -> Result<String> {
        self.state.stt_count.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.state.on_transcribe.lock().unwrap().take() {
            hook();
        }
        if self.state.fail_stt.load(Ordering::SeqCst) {
            return Err(Error::Stt("STT error 500: unavailable".to_string()));
        }
        Ok(self.state.transcript.lock().unwrap().clone())
    }

    async fn reply(&self, message: &str, correct_word: &str) -> Result<Vec<u8>> {
        self.state.chat_count.fetch_add(1, Ordering::SeqCst);
        *self.state.last_reply_args.lock().unwrap() =
            Some((message.to_string(), correct_word.to_string()));
        if let Some(hook) = self.state.on_reply.lock().unwrap().take() {
            hook();
        }
        if self.state.fail_chat.load(Ordering::SeqCst) {
            return Err(Error::Chat("chat error 500: unavailable".to_string()));
        }
        Ok(b"reply-audio".to_vec())
    }
}

/// Microphone stand-in producing a canned clip
#[derive(Clone, Default)]
pub struct MockRecorder {
    active: Arc<AtomicBool>,
    starts: Arc<AtomicUsize>,
}

impl MockRecorder {
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Recorder for MockRecorder {
    fn start(&mut self) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<Vec<u8>> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(Error::Audio("no capture active".to_string()));
        }
        Ok(b"RIFFclip".to_vec())
    }

    fn is_recording(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Speaker stand-in that swallows audio and counts plays
#[derive(Clone, Default)]
pub struct NullSink {
    plays: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl NullSink {
    #[must_use]
    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AudioSink for NullSink {
    async fn play_to_end(&mut self, _wav: &[u8]) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Audio("playback stream error".to_string()));
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
