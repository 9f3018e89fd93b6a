// podcast - Turn text or an AI-expanded topic into spoken, podcast-style audio

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tts_client::{AudioFormat, SpeechProvider};

use podcast::markup::to_speech_markup;
use podcast::{
    ConversationFile, ConversationRenderer, ConversationTurn, Emotion, FfmpegConcatenator,
    Gender, GenerateRequest, PodcastConfig, RenderOptions, ScriptGenerator, ScriptOptions,
    SpeakRequest, SynthesisClient, VoiceRegistry, VoiceResolver,
};

#[derive(Parser, Debug)]
#[command(name = "podcast")]
#[command(about = "Turn text or an AI-expanded topic into spoken, podcast-style audio", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize a single text file (plain text, or JSON {text, voiceId?, audioFormat?})
    Speak {
        /// Input file
        input: PathBuf,

        /// Output file path (default: output.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Voice id (see `podcast voices`)
        #[arg(short, long)]
        voice: Option<String>,

        /// Audio format: mp3, wav, ogg or aac
        #[arg(short, long)]
        format: Option<AudioFormat>,

        /// Speak with an emotion; also applies pauses and emphasis markup
        #[arg(long)]
        emotion: Option<String>,

        /// Write audio as it streams in (not available for wav)
        #[arg(long)]
        stream: bool,
    },

    /// Render a conversation JSON file into one audio file
    Render {
        /// Turn array, or {conversation, audioFormat?}
        conversation: PathBuf,

        /// Output file path (default: output.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Audio format: mp3, wav, ogg or aac
        #[arg(short, long)]
        format: Option<AudioFormat>,
    },

    /// Generate a conversation about a topic with AI
    Generate {
        /// Topic or content to talk about
        topic: String,

        /// Number of turns
        #[arg(long)]
        turns: Option<u32>,

        /// Number of speakers
        #[arg(long)]
        speakers: Option<u32>,

        /// Total character budget
        #[arg(long)]
        length: Option<u32>,

        /// Write the script here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also render the script to this audio file
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Audio format for --audio (default: from its extension)
        #[arg(short, long)]
        format: Option<AudioFormat>,
    },

    /// List available voices
    Voices {
        /// Only show voices of this gender (female or male)
        #[arg(long)]
        gender: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value (e.g. default_voice, generation.model)
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Commands::Config { action } => handle_config_command(&action),
        Commands::Voices { gender } => list_voices(gender.as_deref()),
        Commands::Speak {
            input,
            output,
            voice,
            format,
            emotion,
            stream,
        } => speak(&input, output, voice, format, emotion.as_deref(), stream).await,
        Commands::Render {
            conversation,
            output,
            format,
        } => render_file(&conversation, output, format).await,
        Commands::Generate {
            topic,
            turns,
            speakers,
            length,
            output,
            audio,
            format,
        } => {
            let request = GenerateRequest {
                input: topic,
                turns,
                speakers,
                length,
            };
            generate(&request, output, audio, format).await
        }
    }
}

fn load_config() -> Result<PodcastConfig> {
    PodcastConfig::load().context("Failed to load configuration")
}

fn speech_provider(config: &PodcastConfig) -> Result<Arc<dyn SpeechProvider>> {
    let provider = tts_client::get_provider(
        &config.speech.provider,
        &config.speech.api_key_env,
        config.speech.base_url.as_deref(),
    )
    .context("Failed to initialize speech provider")?;
    provider
        .is_available()
        .with_context(|| format!("{} is not available", provider.name()))?;
    Ok(Arc::from(provider))
}

fn default_output(format: AudioFormat) -> PathBuf {
    PathBuf::from(format!("output.{}", format.extension()))
}

fn check_extension(output: &Path, format: AudioFormat) -> Result<()> {
    if AudioFormat::from_path(output) != Some(format) {
        bail!(
            "Output {} must have a .{} extension for {} audio",
            output.display(),
            format.extension(),
            format
        );
    }
    Ok(())
}

/// Temp file next to `output`, renamed over it once complete
fn staging_file(output: &Path) -> Result<tempfile::NamedTempFile> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(".podcast-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create a temp file in {}", dir.display()))
}

async fn speak(
    input: &Path,
    output: Option<PathBuf>,
    voice: Option<String>,
    format: Option<AudioFormat>,
    emotion: Option<&str>,
    stream: bool,
) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let request = if input.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        serde_json::from_str::<SpeakRequest>(&content)
            .with_context(|| format!("Invalid request JSON in {}", input.display()))?
    } else {
        SpeakRequest {
            text: content,
            voice_id: None,
            audio_format: None,
        }
    };

    if request.text.trim().is_empty() {
        bail!("No text to speak in {}", input.display());
    }

    let config = load_config()?;
    let options = config.render_options(format.or(request.audio_format))?;
    let output = output.unwrap_or_else(|| default_output(options.format));
    check_extension(&output, options.format)?;

    let registry = VoiceRegistry::builtin();
    let requested = voice.or(request.voice_id);
    let voice_id = match requested.as_deref().map(str::trim) {
        Some(id) if registry.contains(id) => id.to_string(),
        Some(id) => {
            log::warn!("Unknown voice \"{}\". Using \"{}\".", id, options.default_voice);
            options.default_voice.clone()
        }
        None => options.default_voice.clone(),
    };

    let payload = match emotion {
        Some(label) => to_speech_markup(
            &request.text,
            Emotion::parse_or_warn(label, "speak"),
            options.pause_ms,
        ),
        None => request.text.trim().to_string(),
    };

    let client = SynthesisClient::new(speech_provider(&config)?).with_char_limit(options.char_limit);
    log::info!(
        "Speaking {} chars with {} ({}) into {}",
        payload.chars().count(),
        voice_id,
        client.provider_name(),
        output.display()
    );

    let mut staged = staging_file(&output)?;
    if stream {
        let mut file = tokio::fs::File::from_std(staged.as_file().try_clone()?);
        client
            .stream_to(&payload, &voice_id, options.format, &mut file)
            .await
            .context("Failed to stream speech")?;
    } else {
        let audio = client
            .synthesize(&payload, &voice_id, options.format)
            .await
            .context("Failed to synthesize speech")?;
        staged.as_file_mut().write_all(&audio)?;
    }
    staged
        .persist(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let size = fs::metadata(&output)?.len();
    eprintln!("Output: {} ({} bytes)", output.display(), size);
    Ok(())
}

fn renderer(
    config: &PodcastConfig,
    options: RenderOptions,
    turns: &[ConversationTurn],
) -> Result<ConversationRenderer> {
    let speech = speech_provider(config)?;
    // A single turn never reaches ffmpeg
    let concatenator = if turns.len() > 1 {
        FfmpegConcatenator::locate(&config.ffmpeg_path)?
    } else {
        FfmpegConcatenator::new(&config.ffmpeg_path)
    };

    Ok(ConversationRenderer::new(
        speech,
        Arc::new(concatenator),
        VoiceRegistry::builtin(),
        options,
    )?)
}

async fn render_turns(
    config: &PodcastConfig,
    turns: &[ConversationTurn],
    output: Option<PathBuf>,
    format: Option<AudioFormat>,
) -> Result<()> {
    let options = config.render_options(format)?;
    let output = output.unwrap_or_else(|| default_output(options.format));

    let renderer = renderer(config, options, turns)?;
    let summary = renderer
        .render(turns, &output)
        .await
        .context("Failed to render conversation")?;

    let mut seen = Vec::new();
    for turn in &summary.turns {
        if !seen.contains(&turn.speaker) {
            eprintln!("  {} -> {}", turn.speaker, turn.voice_id);
            seen.push(turn.speaker.clone());
        }
    }
    eprintln!("Output: {} ({} bytes)", summary.output.display(), summary.bytes);
    Ok(())
}

async fn render_file(
    path: &Path,
    output: Option<PathBuf>,
    format: Option<AudioFormat>,
) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file: ConversationFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid conversation JSON in {}", path.display()))?;
    let (turns, body_format) = file.into_parts();

    let config = load_config()?;
    render_turns(&config, &turns, output, format.or(body_format)).await
}

async fn generate(
    request: &GenerateRequest,
    output: Option<PathBuf>,
    audio: Option<PathBuf>,
    format: Option<AudioFormat>,
) -> Result<()> {
    let config = load_config()?;
    let options = ScriptOptions::from_request(request, config.script_options());

    let llm = llm_client::get_provider(
        &config.generation.provider,
        &config.generation.model,
        &config.generation.api_key_env,
        config.generation.base_url.as_deref(),
    )
    .context("Failed to initialize generation provider")?;
    llm.is_available()
        .with_context(|| format!("{} is not available", llm.name()))?;
    let resolver = VoiceResolver::new(VoiceRegistry::builtin(), &config.default_voice)?;

    let turns = ScriptGenerator::new(llm, resolver)
        .generate(&request.input, &options)
        .await
        .context("Failed to generate conversation")?;

    let json = serde_json::to_string_pretty(&turns)?;
    match &output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Script: {} ({} turns)", path.display(), turns.len());
        }
        None => println!("{}", json),
    }

    if let Some(audio) = audio {
        let format = format.or_else(|| AudioFormat::from_path(&audio));
        render_turns(&config, &turns, Some(audio), format).await?;
    }
    Ok(())
}

fn list_voices(gender: Option<&str>) -> Result<()> {
    let registry = VoiceRegistry::builtin();
    let voices: Vec<_> = match gender.map(|g| g.trim().to_lowercase()).as_deref() {
        None => registry.voices().iter().collect(),
        Some("female") => registry.by_gender(Gender::Female).collect(),
        Some("male") => registry.by_gender(Gender::Male).collect(),
        Some(other) => bail!("Unknown gender '{}'. Use female or male", other),
    };

    let config = load_config()?;
    for voice in voices {
        let marker = if voice.id == config.default_voice { " (default)" } else { "" };
        println!("  {:<14} {:<14} {}{}", voice.id, voice.label, voice.gender, marker);
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config()?;
            println!("Configuration file: {:?}", PodcastConfig::config_path()?);
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_config()?;
            config.set(key, value)?;
            config.save()?;
            println!("{} set to: {}", key, value);
        }
    }
    Ok(())
}
