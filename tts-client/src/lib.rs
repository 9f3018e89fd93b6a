//! Remote text-to-speech client library
//!
//! Wraps a speech synthesis service behind the `SpeechProvider` trait so the
//! podcast pipeline can be driven by the real service or by a test double.

pub mod error;
pub mod format;
pub mod provider;
pub mod providers;

pub use error::{Result, TtsError};
pub use format::AudioFormat;
pub use provider::{AudioStream, SpeechProvider, SpeechRequest};
pub use providers::{MockSpeechProvider, get_provider};
