//! AI script generation: ask a generative text provider for a conversation.

use llm_client::{LlmProvider, LlmRequest};
use serde_json::Deserializer;
use std::time::Duration;

use crate::error::{PodcastError, Result};
use crate::resolver::VoiceResolver;
use crate::turn::{ConversationTurn, Emotion, GenerateRequest, NO_EMOTION};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

pub const DEFAULT_TURNS: u32 = 4;
pub const DEFAULT_SPEAKERS: u32 = 2;
pub const DEFAULT_LENGTH: u32 = 600;

const SYSTEM_PROMPT: &str = "You write natural, engaging podcast dialogue and answer with JSON only.";

/// Shape of the requested conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptOptions {
    pub turns: u32,
    pub speakers: u32,
    /// Total character budget across all turns
    pub length: u32,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            turns: DEFAULT_TURNS,
            speakers: DEFAULT_SPEAKERS,
            length: DEFAULT_LENGTH,
        }
    }
}

impl ScriptOptions {
    /// Fill unset request fields from `defaults`
    pub fn from_request(request: &GenerateRequest, defaults: ScriptOptions) -> Self {
        Self {
            turns: request.turns.unwrap_or(defaults.turns),
            speakers: request.speakers.unwrap_or(defaults.speakers),
            length: request.length.unwrap_or(defaults.length),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.turns == 0 || self.speakers == 0 || self.length == 0 {
            return Err(PodcastError::Validation(
                "turns, speakers and length must all be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Produces conversation turns from a topic
pub struct ScriptGenerator {
    provider: Box<dyn LlmProvider>,
    voices: VoiceResolver,
    backoff: Duration,
}

impl ScriptGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, voices: VoiceResolver) -> Self {
        Self {
            provider,
            voices,
            backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }

    /// Initial delay before retrying a transient failure; doubles per attempt
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn build_prompt(&self, topic: &str, options: &ScriptOptions) -> String {
        let voice_ids: Vec<&str> = self.voices.registry().ids().collect();
        let emotions: Vec<&str> = Emotion::ALL
            .iter()
            .map(|e| e.as_str())
            .chain(std::iter::once(NO_EMOTION))
            .collect();

        format!(
            r#"Generate a podcast-style conversation on the following topic or content.

Input: {topic}

Requirements:
- Number of turns: {turns}
- Number of speakers: {speakers}
- Length limit: {length} characters total.
- Use realistic, natural dialogue.
- Give each speaker a unique name and one voiceId, used for all of that speaker's turns.
- voiceId must be one of: {voices}
- emotion must be one of: {emotions}
- Use "..." for a natural pause and *word* to emphasise a word.

Output only a JSON array of objects:
[{{"speaker": "Name", "text": "What they say", "voiceId": "{default}", "emotion": "none"}}]"#,
            topic = topic.trim(),
            turns = options.turns,
            speakers = options.speakers,
            length = options.length,
            voices = voice_ids.join(", "),
            emotions = emotions.join(", "),
            default = self.voices.default_voice().id,
        )
    }

    pub async fn generate(&self, topic: &str, options: &ScriptOptions) -> Result<Vec<ConversationTurn>> {
        if topic.trim().is_empty() {
            return Err(PodcastError::Validation("topic must not be empty".to_string()));
        }
        options.validate()?;

        let request = LlmRequest {
            prompt: self.build_prompt(topic, options),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: None,
            temperature: None,
        };

        log::info!(
            "Generating {} turns for {} speakers with {}",
            options.turns,
            options.speakers,
            self.provider.name()
        );
        let content = self.complete_with_retry(request).await?;

        let turns = extract_turns(&content)?;
        self.repair_turns(turns, options.speakers)
    }

    async fn complete_with_retry(&self, request: LlmRequest) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.provider.complete(request.clone()).await {
                Ok(response) => {
                    if let Some(usage) = &response.usage {
                        log::debug!(
                            "Tokens: {} in, {} out",
                            usage.input_tokens,
                            usage.output_tokens
                        );
                    }
                    return Ok(response.content);
                }
                Err(e) if e.is_transient() && attempt + 1 < MAX_RETRIES => {
                    let backoff = self.backoff * 2u32.pow(attempt);
                    log::warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        e,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Coerce generated turns into ones the renderer accepts.
    ///
    /// Unknown emotions become "none", unknown voices become the default
    /// voice, unnamed speakers take their voice's label and empty turns are
    /// dropped. With a single requested speaker every turn takes the first
    /// turn's speaker and voice.
    pub fn repair_turns(
        &self,
        turns: Vec<ConversationTurn>,
        speakers: u32,
    ) -> Result<Vec<ConversationTurn>> {
        let registry = self.voices.registry();
        let default_voice = self.voices.default_voice();

        let mut repaired: Vec<ConversationTurn> = Vec::with_capacity(turns.len());
        for (i, turn) in turns.into_iter().enumerate() {
            let text = turn.text.trim();
            if text.is_empty() {
                log::debug!("Dropping generated turn {} with no text", i);
                continue;
            }

            let voice = match registry.get(turn.voice_id.trim()) {
                Some(voice) => voice,
                None => {
                    log::debug!(
                        "Generated turn {} uses unknown voice \"{}\", using \"{}\"",
                        i,
                        turn.voice_id,
                        default_voice.id
                    );
                    default_voice
                }
            };

            let emotion = turn
                .emotion
                .as_deref()
                .and_then(Emotion::parse)
                .map_or(NO_EMOTION, |e| e.as_str());

            let speaker = match turn.speaker.trim() {
                "" => voice.label,
                name => name,
            };

            repaired.push(ConversationTurn::new(speaker, text, voice.id).with_emotion(emotion));
        }

        if repaired.is_empty() {
            return Err(PodcastError::GenerationParse(
                "generated conversation has no usable turns".to_string(),
            ));
        }

        if speakers == 1 {
            let speaker = repaired[0].speaker.clone();
            let voice_id = repaired[0].voice_id.clone();
            for turn in repaired.iter_mut().skip(1) {
                turn.speaker.clone_from(&speaker);
                turn.voice_id.clone_from(&voice_id);
            }
        }

        Ok(repaired)
    }
}

/// Pull the first JSON array of turns out of free-form model output
pub fn extract_turns(content: &str) -> Result<Vec<ConversationTurn>> {
    for (start, _) in content.match_indices('[') {
        let mut values = Deserializer::from_str(&content[start..]).into_iter::<Vec<ConversationTurn>>();
        if let Some(Ok(turns)) = values.next() {
            if turns.is_empty() {
                return Err(PodcastError::GenerationParse(
                    "generated conversation is empty".to_string(),
                ));
            }
            return Ok(turns);
        }
    }

    Err(PodcastError::GenerationParse(
        "no JSON array of turns found in the response".to_string(),
    ))
}
