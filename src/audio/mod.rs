//! Audio capture and playback
//!
//! One recording handle and one playback handle exist at any instant;
//! acquiring a new one releases the old one first.

mod capture;
mod playback;

pub use capture::{MicRecorder, Recorder, SAMPLE_RATE, samples_to_wav};
pub use playback::{AudioSink, SpeakerSink};
