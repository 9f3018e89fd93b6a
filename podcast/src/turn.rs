//! Conversation data model and the JSON shapes it arrives in.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tts_client::AudioFormat;

/// Label meaning "no emotion"
pub const NO_EMOTION: &str = "none";

/// Expressive styles the speech service recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Cheerful,
    Sad,
    Terrified,
    Relaxed,
    Fearful,
    Assertive,
    Energetic,
    Warm,
    Direct,
    Bright,
}

impl Emotion {
    pub const ALL: [Emotion; 11] = [
        Emotion::Angry,
        Emotion::Cheerful,
        Emotion::Sad,
        Emotion::Terrified,
        Emotion::Relaxed,
        Emotion::Fearful,
        Emotion::Assertive,
        Emotion::Energetic,
        Emotion::Warm,
        Emotion::Direct,
        Emotion::Bright,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Cheerful => "cheerful",
            Emotion::Sad => "sad",
            Emotion::Terrified => "terrified",
            Emotion::Relaxed => "relaxed",
            Emotion::Fearful => "fearful",
            Emotion::Assertive => "assertive",
            Emotion::Energetic => "energetic",
            Emotion::Warm => "warm",
            Emotion::Direct => "direct",
            Emotion::Bright => "bright",
        }
    }

    /// Parse a label; `None` for the "none" sentinel, empty or unknown labels
    pub fn parse(label: &str) -> Option<Emotion> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(label))
    }

    /// Whether a label is a supported emotion or the "none" sentinel
    pub fn is_known_label(label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(NO_EMOTION) || Self::parse(label).is_some()
    }

    /// `parse`, logging a warning for labels that are neither an emotion nor "none"
    pub fn parse_or_warn(label: &str, context: &str) -> Option<Emotion> {
        let emotion = Self::parse(label);
        if emotion.is_none() && !label.trim().is_empty() && !Self::is_known_label(label) {
            log::warn!("Unsupported emotion \"{}\" for {}. Ignoring it.", label, context);
        }
        emotion
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treat an explicit JSON `null` like a missing string field
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One utterance as supplied by a caller or the script generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub speaker: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

impl ConversationTurn {
    pub fn new(speaker: &str, text: &str, voice_id: &str) -> Self {
        Self {
            speaker: speaker.to_string(),
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            emotion: None,
        }
    }

    pub fn with_emotion(mut self, emotion: &str) -> Self {
        self.emotion = Some(emotion.to_string());
        self
    }
}

/// A turn after voice assignment: every field is valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTurn {
    pub speaker: String,
    pub text: String,
    pub voice_id: &'static str,
    pub emotion: Option<Emotion>,
}

/// Single-text synthesis body: `{ text, voiceId?, audioFormat? }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakRequest {
    pub text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub audio_format: Option<AudioFormat>,
}

/// Multi-turn body: `{ conversation: Turn[], audioFormat? }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    pub conversation: Vec<ConversationTurn>,
    #[serde(default)]
    pub audio_format: Option<AudioFormat>,
}

/// AI generation body: `{ input, turns?, speakers?, length? }`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub input: String,
    #[serde(default)]
    pub turns: Option<u32>,
    #[serde(default)]
    pub speakers: Option<u32>,
    #[serde(default)]
    pub length: Option<u32>,
}

/// A conversation file: either a bare turn array or a request body
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConversationFile {
    Turns(Vec<ConversationTurn>),
    Request(ConversationRequest),
}

impl ConversationFile {
    pub fn into_parts(self) -> (Vec<ConversationTurn>, Option<AudioFormat>) {
        match self {
            ConversationFile::Turns(turns) => (turns, None),
            ConversationFile::Request(request) => (request.conversation, request.audio_format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_parse() {
        assert_eq!(Emotion::parse("cheerful"), Some(Emotion::Cheerful));
        assert_eq!(Emotion::parse(" Warm "), Some(Emotion::Warm));
        assert_eq!(Emotion::parse("none"), None);
        assert_eq!(Emotion::parse(""), None);
        assert_eq!(Emotion::parse("sarcastic"), None);
    }

    #[test]
    fn test_known_labels() {
        assert!(Emotion::is_known_label("None"));
        assert!(Emotion::is_known_label("bright"));
        assert!(!Emotion::is_known_label("sarcastic"));
    }

    #[test]
    fn test_turn_uses_camel_case() {
        let turn: ConversationTurn = serde_json::from_str(
            r#"{"speaker": "Lisa", "text": "Hi there", "voiceId": "lisa", "emotion": "warm"}"#,
        )
        .unwrap();
        assert_eq!(turn.voice_id, "lisa");
        assert_eq!(turn.emotion.as_deref(), Some("warm"));

        let json = serde_json::to_value(ConversationTurn::new("George", "Hello", "george")).unwrap();
        assert_eq!(json["voiceId"], "george");
        assert!(json.get("emotion").is_none());
    }

    #[test]
    fn test_turn_missing_fields_default() {
        let turn: ConversationTurn = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
        assert_eq!(turn.speaker, "");
        assert_eq!(turn.voice_id, "");
        assert!(turn.emotion.is_none());
    }

    #[test]
    fn test_turn_null_fields_default() {
        let turn: ConversationTurn = serde_json::from_str(
            r#"{"speaker": null, "text": "Hi", "voiceId": null, "emotion": null}"#,
        )
        .unwrap();
        assert_eq!(turn, ConversationTurn::new("", "Hi", ""));
    }

    #[test]
    fn test_parse_or_warn_matches_parse() {
        assert_eq!(Emotion::parse_or_warn("Sad", "test"), Some(Emotion::Sad));
        assert_eq!(Emotion::parse_or_warn("none", "test"), None);
        assert_eq!(Emotion::parse_or_warn("smug", "test"), None);
    }

    #[test]
    fn test_conversation_file_shapes() {
        let bare: ConversationFile =
            serde_json::from_str(r#"[{"speaker": "Lisa", "text": "Hi", "voiceId": "lisa"}]"#)
                .unwrap();
        let (turns, format) = bare.into_parts();
        assert_eq!(turns.len(), 1);
        assert!(format.is_none());

        let body: ConversationFile = serde_json::from_str(
            r#"{"conversation": [{"speaker": "Lisa", "text": "Hi", "voiceId": "lisa"}], "audioFormat": "ogg"}"#,
        )
        .unwrap();
        let (turns, format) = body.into_parts();
        assert_eq!(turns[0].speaker, "Lisa");
        assert_eq!(format, Some(AudioFormat::Ogg));
    }

    #[test]
    fn test_speak_and_generate_bodies() {
        let speak: SpeakRequest =
            serde_json::from_str(r#"{"text": "Hello", "voiceId": "george"}"#).unwrap();
        assert_eq!(speak.voice_id.as_deref(), Some("george"));
        assert!(speak.audio_format.is_none());

        let generate: GenerateRequest =
            serde_json::from_str(r#"{"input": "bees", "speakers": 1}"#).unwrap();
        assert_eq!(generate.speakers, Some(1));
        assert!(generate.turns.is_none());
    }
}
