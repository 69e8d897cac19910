//! Wordica - voice-driven vocabulary practice trainer
//!
//! The user hears the current item spoken, records an attempt, and gets
//! correct/wrong feedback plus a spoken reply. The core is the practice
//! turn sequencer; speech work is delegated to a remote backend.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │              Front end (CLI)               │
//! └──────────────────┬─────────────────────────┘
//!                    │
//! ┌──────────────────▼─────────────────────────┐
//! │            Turn sequencer                   │
//! │  Session │ Feedback │ Capture │ Playback   │
//! └──────────────────┬─────────────────────────┘
//!                    │
//! ┌──────────────────▼─────────────────────────┐
//! │        Speech backend (HTTP+JSON)           │
//! │     /tts    │    /stt    │    /chat        │
//! └────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feedback;
pub mod session;
pub mod sequencer;

pub use backend::{ApiClient, SpeechBackend};
pub use catalog::Category;
pub use config::Config;
pub use error::{Error, Result};
pub use feedback::{Feedback, FeedbackKind};
pub use sequencer::{TurnReport, TurnSequencer, normalize_heard};
pub use session::{Outcome, Session, TurnPhase};
