//! Deterministic voice assignment: one valid, preferably unique voice per speaker.

use std::collections::{HashMap, HashSet};

use crate::error::{PodcastError, Result};
use crate::turn::{ConversationTurn, Emotion, ResolvedTurn};
use crate::voices::{Voice, VoiceRegistry};

/// Identity of a speaker across turns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SpeakerKey {
    Named(String),
    /// Unnamed turn that asked for a specific valid voice
    Voice(&'static str),
    /// Unnamed turn with no usable voice; all such turns are one speaker
    Anonymous,
}

fn speaker_key(turn: &ConversationTurn, own_voice: Option<&'static Voice>) -> SpeakerKey {
    let name = turn.speaker.trim();
    if !name.is_empty() {
        return SpeakerKey::Named(name.to_lowercase());
    }
    match own_voice {
        Some(voice) => SpeakerKey::Voice(voice.id),
        None => SpeakerKey::Anonymous,
    }
}

/// Assigns registry voices to conversation turns.
///
/// A speaker's first turn keeps its own voice if that voice is registered;
/// otherwise the first registry voice not yet used by another speaker is
/// taken, or the default voice once the registry is exhausted. Every later
/// turn of that speaker reuses the same voice, whatever it asks for.
#[derive(Debug, Clone, Copy)]
pub struct VoiceResolver {
    registry: VoiceRegistry,
    default_voice: &'static Voice,
}

impl VoiceResolver {
    pub fn new(registry: VoiceRegistry, default_voice: &str) -> Result<Self> {
        let default_voice = registry.get(default_voice).ok_or_else(|| {
            PodcastError::Config(format!("default voice '{}' is not a known voice", default_voice))
        })?;
        Ok(Self {
            registry,
            default_voice,
        })
    }

    pub fn registry(&self) -> VoiceRegistry {
        self.registry
    }

    pub fn default_voice(&self) -> &'static Voice {
        self.default_voice
    }

    fn next_unused(&self, used: &HashSet<&'static str>) -> &'static Voice {
        self.registry
            .voices()
            .iter()
            .find(|v| !used.contains(v.id))
            .unwrap_or(self.default_voice)
    }

    pub fn resolve(&self, turns: &[ConversationTurn]) -> Vec<ResolvedTurn> {
        let mut assigned: HashMap<SpeakerKey, &'static Voice> = HashMap::new();
        let mut used: HashSet<&'static str> = HashSet::new();
        let mut resolved = Vec::with_capacity(turns.len());

        for (i, turn) in turns.iter().enumerate() {
            let own_voice = self.registry.get(turn.voice_id.trim());
            let key = speaker_key(turn, own_voice);

            let voice = match assigned.get(&key) {
                Some(&voice) => {
                    if let Some(own) = own_voice.filter(|own| own.id != voice.id) {
                        log::debug!(
                            "Turn {}: keeping speaker voice '{}' over requested '{}'",
                            i,
                            voice.id,
                            own.id
                        );
                    }
                    voice
                }
                None => {
                    let voice = match own_voice {
                        Some(voice) => voice,
                        None => {
                            let voice = self.next_unused(&used);
                            if !turn.voice_id.trim().is_empty() {
                                log::warn!(
                                    "Invalid voiceId \"{}\" for turn {}. Using \"{}\".",
                                    turn.voice_id,
                                    i,
                                    voice.id
                                );
                            }
                            voice
                        }
                    };
                    assigned.insert(key, voice);
                    used.insert(voice.id);
                    voice
                }
            };

            let speaker = match turn.speaker.trim() {
                "" => voice.label.to_string(),
                name => name.to_string(),
            };

            resolved.push(ResolvedTurn {
                speaker,
                text: turn.text.clone(),
                voice_id: voice.id,
                emotion: resolve_emotion(turn.emotion.as_deref(), i),
            });
        }

        resolved
    }
}

fn resolve_emotion(label: Option<&str>, turn: usize) -> Option<Emotion> {
    Emotion::parse_or_warn(label?, &format!("turn {}", turn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices::{DEFAULT_VOICE_ID, Gender};

    static SMALL: [Voice; 2] = [
        Voice {
            id: "ana",
            label: "Ana",
            gender: Gender::Female,
        },
        Voice {
            id: "ben",
            label: "Ben",
            gender: Gender::Male,
        },
    ];

    fn builtin() -> VoiceResolver {
        VoiceResolver::new(VoiceRegistry::builtin(), DEFAULT_VOICE_ID).unwrap()
    }

    fn voices(resolved: &[ResolvedTurn]) -> Vec<&'static str> {
        resolved.iter().map(|t| t.voice_id).collect()
    }

    #[test]
    fn test_unknown_default_voice_is_rejected() {
        assert!(matches!(
            VoiceResolver::new(VoiceRegistry::builtin(), "nobody"),
            Err(PodcastError::Config(_))
        ));
    }

    #[test]
    fn test_valid_voices_are_kept() {
        let turns = vec![
            ConversationTurn::new("Lisa", "Hi there", "lisa"),
            ConversationTurn::new("George", "Hello", "george"),
        ];
        let resolved = builtin().resolve(&turns);
        assert_eq!(voices(&resolved), vec!["lisa", "george"]);
        assert_eq!(resolved[0].speaker, "Lisa");
    }

    #[test]
    fn test_distinct_speakers_get_distinct_voices() {
        let turns = vec![
            ConversationTurn::new("Host", "Welcome", "bogus"),
            ConversationTurn::new("Guest", "Thanks", ""),
            ConversationTurn::new("Caller", "Hi", "also-bogus"),
            ConversationTurn::new("host", "Back to you", "nope"),
        ];
        let resolved = builtin().resolve(&turns);
        // Registry order: monica, bwyneth, carly
        assert_eq!(voices(&resolved), vec!["monica", "bwyneth", "carly", "monica"]);
    }

    #[test]
    fn test_unassigned_voice_skips_ones_already_taken() {
        let turns = vec![
            ConversationTurn::new("A", "one", "monica"),
            ConversationTurn::new("B", "two", "???"),
        ];
        let resolved = builtin().resolve(&turns);
        assert_eq!(voices(&resolved), vec!["monica", "bwyneth"]);
    }

    #[test]
    fn test_speaker_voice_wins_over_later_override() {
        let turns = vec![
            ConversationTurn::new("Lisa", "First", "lisa"),
            ConversationTurn::new("Lisa", "Second", "george"),
        ];
        let resolved = builtin().resolve(&turns);
        assert_eq!(voices(&resolved), vec!["lisa", "lisa"]);
    }

    #[test]
    fn test_speaker_names_compare_trimmed_and_case_insensitive() {
        let turns = vec![
            ConversationTurn::new("  Lisa ", "First", "lisa"),
            ConversationTurn::new("LISA", "Second", ""),
        ];
        let resolved = builtin().resolve(&turns);
        assert_eq!(voices(&resolved), vec!["lisa", "lisa"]);
        assert_eq!(resolved[0].speaker, "Lisa");
        assert_eq!(resolved[1].speaker, "LISA");
    }

    #[test]
    fn test_empty_speaker_takes_voice_label() {
        let turns = vec![
            ConversationTurn::new("", "Hello", "george"),
            ConversationTurn::new("", "Anyone?", ""),
            ConversationTurn::new(" ", "Still me", "x"),
        ];
        let resolved = builtin().resolve(&turns);
        assert_eq!(resolved[0].speaker, "George");
        assert_eq!(resolved[0].voice_id, "george");
        assert_eq!(resolved[1].speaker, "Monica");
        assert_eq!(resolved[2].voice_id, "monica");
    }

    #[test]
    fn test_exhausted_registry_falls_back_to_default() {
        let resolver = VoiceResolver::new(VoiceRegistry::from_static(&SMALL), "ben").unwrap();
        let turns = vec![
            ConversationTurn::new("One", "a", ""),
            ConversationTurn::new("Two", "b", ""),
            ConversationTurn::new("Three", "c", ""),
        ];
        let resolved = resolver.resolve(&turns);
        assert_eq!(voices(&resolved), vec!["ana", "ben", "ben"]);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let turns = vec![
            ConversationTurn::new("Zed", "a", ""),
            ConversationTurn::new("Amy", "b", "bad"),
            ConversationTurn::new("Kim", "c", "oliver"),
            ConversationTurn::new("Amy", "d", ""),
        ];
        let resolver = builtin();
        let first = resolver.resolve(&turns);
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&turns), first);
        }
    }

    #[test]
    fn test_emotions() {
        let turns = vec![
            ConversationTurn::new("Lisa", "a", "lisa").with_emotion("cheerful"),
            ConversationTurn::new("Lisa", "b", "lisa").with_emotion("None"),
            ConversationTurn::new("Lisa", "c", "lisa").with_emotion("smug"),
            ConversationTurn::new("Lisa", "d", "lisa"),
        ];
        let emotions: Vec<_> = builtin().resolve(&turns).into_iter().map(|t| t.emotion).collect();
        assert_eq!(emotions, vec![Some(Emotion::Cheerful), None, None, None]);
    }
}
