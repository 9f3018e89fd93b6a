//! Podcast-style audio from text or from AI-generated conversations
//!
//! Turns are resolved to voices, sanitized into speech markup, synthesized
//! one by one through a `SpeechProvider` and joined with ffmpeg into a
//! single file.

pub mod chunk;
pub mod concat;
pub mod config;
pub mod error;
pub mod markup;
pub mod resolver;
pub mod script;
pub mod synth;
pub mod turn;
pub mod voices;
pub mod workflow;

pub use concat::{Concatenator, FfmpegConcatenator};
pub use config::PodcastConfig;
pub use error::{PodcastError, Result};
pub use resolver::VoiceResolver;
pub use script::{ScriptGenerator, ScriptOptions};
pub use synth::SynthesisClient;
pub use turn::{ConversationFile, ConversationTurn, Emotion, GenerateRequest, SpeakRequest};
pub use voices::{DEFAULT_VOICE_ID, Gender, Voice, VoiceRegistry};
pub use workflow::{ConversationRenderer, RenderOptions, RenderSummary};
