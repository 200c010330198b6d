//! Speech synthesis client library for the sanad workspace
//!
//! Provides a remote generative-TTS backend, an on-device fallback voice,
//! and an orchestrator that degrades between the two. Remote quota
//! exhaustion is latched for the rest of the session so later requests skip
//! the doomed network call. Decoded audio plays detached; callers only ever
//! await the spoken duration.

pub mod backend;
pub mod backends;
pub mod error;
pub mod orchestrator;
pub mod playback;

pub use backend::{SpeechAudio, SpeechBackend, SpeechRequest, SpeechResult, SpeechSource};
pub use backends::local::LocalSpeech;
pub use backends::{KNOWN_BACKENDS, create_backend};
pub use error::{Result, SpeechError};
pub use orchestrator::{QuotaState, SpeechOrchestrator};
