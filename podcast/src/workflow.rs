//! Conversation rendering: voices, markup, per-turn synthesis, concatenation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tts_client::{AudioFormat, SpeechProvider};

use crate::chunk::CHAR_LIMIT;
use crate::concat::Concatenator;
use crate::error::{PodcastError, Result};
use crate::markup::{DEFAULT_PAUSE_MS, to_speech_markup};
use crate::resolver::VoiceResolver;
use crate::synth::SynthesisClient;
use crate::turn::{ConversationTurn, ResolvedTurn};
use crate::voices::{DEFAULT_VOICE_ID, VoiceRegistry};

/// Every option a render depends on, resolved before the render starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: AudioFormat,
    pub char_limit: usize,
    pub pause_ms: u32,
    pub default_voice: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            char_limit: CHAR_LIMIT,
            pause_ms: DEFAULT_PAUSE_MS,
            default_voice: DEFAULT_VOICE_ID.to_string(),
        }
    }
}

/// What a finished render produced
#[derive(Debug, Clone)]
pub struct RenderSummary {
    pub output: PathBuf,
    pub bytes: u64,
    pub turns: Vec<ResolvedTurn>,
}

/// Renders a list of turns into one audio file.
///
/// Turns are synthesized strictly in order. All intermediate files live in a
/// private `.podcast-*` directory next to the output, which is removed on
/// success, on failure and when the render future is dropped. The output
/// path is only ever written by a final rename, so it either holds the
/// complete audio or does not exist.
pub struct ConversationRenderer {
    synth: SynthesisClient,
    concatenator: Arc<dyn Concatenator>,
    resolver: VoiceResolver,
    options: RenderOptions,
}

impl ConversationRenderer {
    pub fn new(
        speech: Arc<dyn SpeechProvider>,
        concatenator: Arc<dyn Concatenator>,
        registry: VoiceRegistry,
        options: RenderOptions,
    ) -> Result<Self> {
        if options.char_limit == 0 {
            return Err(PodcastError::Config(
                "char_limit must be greater than zero".to_string(),
            ));
        }
        let resolver = VoiceResolver::new(registry, &options.default_voice)?;
        let synth = SynthesisClient::new(speech).with_char_limit(options.char_limit);

        Ok(Self {
            synth,
            concatenator,
            resolver,
            options,
        })
    }

    fn validate(&self, turns: &[ConversationTurn], output: &Path) -> Result<()> {
        if turns.is_empty() {
            return Err(PodcastError::Validation(
                "conversation must contain at least one turn".to_string(),
            ));
        }
        if let Some(i) = turns.iter().position(|t| t.text.trim().is_empty()) {
            return Err(PodcastError::Validation(format!("turn {} has no text", i)));
        }

        let format = self.options.format;
        if AudioFormat::from_path(output) != Some(format) {
            return Err(PodcastError::Validation(format!(
                "output {} must have a .{} extension for {} audio",
                output.display(),
                format.extension(),
                format
            )));
        }
        Ok(())
    }

    pub async fn render(&self, turns: &[ConversationTurn], output: &Path) -> Result<RenderSummary> {
        self.validate(turns, output)?;
        let resolved = self.resolver.resolve(turns);

        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let work_dir = tempfile::Builder::new()
            .prefix(".podcast-")
            .tempdir_in(parent)?;
        let work_path = work_dir.path().to_path_buf();

        let result = self.render_in(&resolved, &work_path, output).await;

        if let Err(e) = work_dir.close() {
            log::warn!("Failed to remove work directory {}: {}", work_path.display(), e);
        }

        let bytes = result?;
        log::info!(
            "Rendered {} turns into {} ({} bytes)",
            resolved.len(),
            output.display(),
            bytes
        );

        Ok(RenderSummary {
            output: output.to_path_buf(),
            bytes,
            turns: resolved,
        })
    }

    async fn render_in(&self, turns: &[ResolvedTurn], work_dir: &Path, output: &Path) -> Result<u64> {
        let format = self.options.format;
        let mut files = Vec::with_capacity(turns.len());

        for (i, turn) in turns.iter().enumerate() {
            log::info!(
                "Synthesizing turn {}/{}: {} ({})",
                i + 1,
                turns.len(),
                turn.speaker,
                turn.voice_id
            );

            let markup = to_speech_markup(&turn.text, turn.emotion, self.options.pause_ms);
            let audio = self
                .synth
                .synthesize(&markup, turn.voice_id, format)
                .await
                .map_err(|e| match e {
                    PodcastError::Synthesis { context, source } => PodcastError::synthesis(
                        format!("turn {} ({}), {}", i, turn.speaker, context),
                        source,
                    ),
                    other => other,
                })?;

            let path = work_dir.join(format!("turn_{}.{}", i, format.extension()));
            tokio::fs::write(&path, &audio).await?;
            files.push(path);
        }

        let staged = match files.as_slice() {
            [single] => single.clone(),
            _ => {
                let combined = work_dir.join(format!("combined.{}", format.extension()));
                self.concatenator.concat(&files, &combined).await?;
                combined
            }
        };

        tokio::fs::rename(&staged, output).await?;
        Ok(tokio::fs::metadata(output).await?.len())
    }
}
