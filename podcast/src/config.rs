// podcast configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tts_client::AudioFormat;

use crate::chunk::CHAR_LIMIT;
use crate::error::{PodcastError, Result};
use crate::markup::DEFAULT_PAUSE_MS;
use crate::script::{DEFAULT_LENGTH, DEFAULT_SPEAKERS, DEFAULT_TURNS, ScriptOptions};
use crate::voices::{DEFAULT_VOICE_ID, VoiceRegistry};
use crate::workflow::RenderOptions;

const DEFAULT_FFMPEG: &str = "ffmpeg";
const DEFAULT_SPEECH_PROVIDER: &str = "speechify";
const DEFAULT_SPEECH_KEY_ENV: &str = "SPEECHIFY_API_KEY";
const DEFAULT_GENERATION_PROVIDER: &str = "gemini";
const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GENERATION_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastConfig {
    /// Voice used when a turn has none and the registry is exhausted
    #[serde(default = "default_voice")]
    pub default_voice: String,

    #[serde(default)]
    pub audio_format: AudioFormat,

    /// Maximum characters per synthesis request
    #[serde(default = "default_char_limit")]
    pub char_limit: usize,

    /// Length of the pause an ellipsis turns into
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u32,

    /// ffmpeg binary, looked up on PATH unless it is a path
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    #[serde(default)]
    pub speech: SpeechSettings,

    #[serde(default)]
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    #[serde(default = "default_speech_provider")]
    pub provider: String,

    /// Environment variable holding the API key
    #[serde(default = "default_speech_key_env")]
    pub api_key_env: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    #[serde(default = "default_generation_key_env")]
    pub api_key_env: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_turns")]
    pub turns: u32,

    #[serde(default = "default_speakers")]
    pub speakers: u32,

    /// Character budget for a whole generated conversation
    #[serde(default = "default_length")]
    pub length: u32,
}

fn default_voice() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_char_limit() -> usize {
    CHAR_LIMIT
}

fn default_pause_ms() -> u32 {
    DEFAULT_PAUSE_MS
}

fn default_ffmpeg() -> String {
    DEFAULT_FFMPEG.to_string()
}

fn default_speech_provider() -> String {
    DEFAULT_SPEECH_PROVIDER.to_string()
}

fn default_speech_key_env() -> String {
    DEFAULT_SPEECH_KEY_ENV.to_string()
}

fn default_generation_provider() -> String {
    DEFAULT_GENERATION_PROVIDER.to_string()
}

fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_generation_key_env() -> String {
    DEFAULT_GENERATION_KEY_ENV.to_string()
}

fn default_turns() -> u32 {
    DEFAULT_TURNS
}

fn default_speakers() -> u32 {
    DEFAULT_SPEAKERS
}

fn default_length() -> u32 {
    DEFAULT_LENGTH
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            audio_format: AudioFormat::default(),
            char_limit: default_char_limit(),
            pause_ms: default_pause_ms(),
            ffmpeg_path: default_ffmpeg(),
            speech: SpeechSettings::default(),
            generation: GenerationSettings::default(),
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            provider: default_speech_provider(),
            api_key_env: default_speech_key_env(),
            base_url: None,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            model: default_generation_model(),
            api_key_env: default_generation_key_env(),
            base_url: None,
            turns: default_turns(),
            speakers: default_speakers(),
            length: default_length(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PodcastError::Config(format!("{} must be a whole number, got '{}'", key, value)))
}

fn optional(value: &str) -> Option<String> {
    match value.trim() {
        "" => None,
        v => Some(v.to_string()),
    }
}

impl PodcastConfig {
    /// Keys accepted by `set`
    pub const KEYS: [&'static str; 15] = [
        "default_voice",
        "audio_format",
        "char_limit",
        "pause_ms",
        "ffmpeg_path",
        "speech.provider",
        "speech.api_key_env",
        "speech.base_url",
        "generation.provider",
        "generation.model",
        "generation.api_key_env",
        "generation.base_url",
        "generation.turns",
        "generation.speakers",
        "generation.length",
    ];

    /// Get the config file path: ~/.config/cli-programs/podcast.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| PodcastError::Config("HOME is not set".to_string()))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("podcast.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| PodcastError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| PodcastError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Update one setting by its dotted key, validating the value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_voice" => {
                let voice = VoiceRegistry::builtin().get(value.trim()).ok_or_else(|| {
                    PodcastError::Config(format!("unknown voice '{}'", value))
                })?;
                self.default_voice = voice.id.to_string();
            }
            "audio_format" => {
                self.audio_format = value.parse().map_err(PodcastError::Config)?;
            }
            "char_limit" => {
                let limit: usize = parse_number(key, value)?;
                if limit == 0 {
                    return Err(PodcastError::Config(
                        "char_limit must be greater than zero".to_string(),
                    ));
                }
                self.char_limit = limit;
            }
            "pause_ms" => self.pause_ms = parse_number(key, value)?,
            "ffmpeg_path" => self.ffmpeg_path = value.trim().to_string(),
            "speech.provider" => self.speech.provider = value.trim().to_lowercase(),
            "speech.api_key_env" => self.speech.api_key_env = value.trim().to_string(),
            "speech.base_url" => self.speech.base_url = optional(value),
            "generation.provider" => self.generation.provider = value.trim().to_lowercase(),
            "generation.model" => self.generation.model = value.trim().to_string(),
            "generation.api_key_env" => self.generation.api_key_env = value.trim().to_string(),
            "generation.base_url" => self.generation.base_url = optional(value),
            "generation.turns" => self.generation.turns = parse_number(key, value)?,
            "generation.speakers" => self.generation.speakers = parse_number(key, value)?,
            "generation.length" => self.generation.length = parse_number(key, value)?,
            _ => {
                return Err(PodcastError::Config(format!(
                    "unknown key '{}'. Known keys: {}",
                    key,
                    Self::KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Options for one render, with an optional format override
    pub fn render_options(&self, format: Option<AudioFormat>) -> Result<RenderOptions> {
        let registry = VoiceRegistry::builtin();
        if !registry.contains(&self.default_voice) {
            return Err(PodcastError::Config(format!(
                "default_voice '{}' is not a known voice",
                self.default_voice
            )));
        }
        if self.char_limit == 0 {
            return Err(PodcastError::Config(
                "char_limit must be greater than zero".to_string(),
            ));
        }

        Ok(RenderOptions {
            format: format.unwrap_or(self.audio_format),
            char_limit: self.char_limit,
            pause_ms: self.pause_ms,
            default_voice: self.default_voice.clone(),
        })
    }

    pub fn script_options(&self) -> ScriptOptions {
        ScriptOptions {
            turns: self.generation.turns,
            speakers: self.generation.speakers,
            length: self.generation.length,
        }
    }
}
