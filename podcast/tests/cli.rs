use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config and API keys
fn podcast_cmd(home: &TempDir) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("podcast").into();
    cmd.env("HOME", home.path())
        .env_remove("SPEECHIFY_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .current_dir(home.path());
    cmd
}

// ============================================================================
// CLI Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("podcast-style audio"))
        .stdout(predicate::str::contains("speak"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("voices"));
}

#[test]
fn test_version_displays() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("podcast"));
}

// ============================================================================
// Voices
// ============================================================================

#[test]
fn test_voices_lists_default() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .arg("voices")
        .assert()
        .success()
        .stdout(predicate::str::contains("lisa"))
        .stdout(predicate::str::contains("(default)"))
        .stdout(predicate::str::contains("george"));
}

#[test]
fn test_voices_filter_by_gender() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .args(["voices", "--gender", "female"])
        .assert()
        .success()
        .stdout(predicate::str::contains("monica"))
        .stdout(predicate::str::contains("george").not());
}

#[test]
fn test_voices_unknown_gender() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .args(["voices", "--gender", "robot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown gender"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("podcast.toml"))
        .stdout(predicate::str::contains("default_voice = \"lisa\""))
        .stdout(predicate::str::contains("model = \"gemini-1.5-flash\""));
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .args(["config", "set", "default_voice", "george"])
        .assert()
        .success();

    let saved = fs::read_to_string(
        home.path()
            .join(".config")
            .join("cli-programs")
            .join("podcast.toml"),
    )
    .unwrap();
    assert!(saved.contains("default_voice = \"george\""));

    podcast_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_voice = \"george\""));
}

#[test]
fn test_config_set_rejects_unknown_voice() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .args(["config", "set", "default_voice", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown voice"));
}

// ============================================================================
// Speak / Render / Generate failures (no network)
// ============================================================================

#[test]
fn test_speak_requires_api_key() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("hello.txt");
    fs::write(&input, "Hello there").unwrap();

    podcast_cmd(&home)
        .arg("speak")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPEECHIFY_API_KEY"));

    assert!(!home.path().join("output.mp3").exists());
}

#[test]
fn test_speak_warns_on_unknown_emotion() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("hello.txt");
    fs::write(&input, "Hello there").unwrap();

    podcast_cmd(&home)
        .arg("speak")
        .arg(&input)
        .args(["--emotion", "smug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported emotion \"smug\" for speak"))
        .stderr(predicate::str::contains("SPEECHIFY_API_KEY"));
}

#[test]
fn test_speak_empty_text() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("empty.txt");
    fs::write(&input, "  \n").unwrap();

    podcast_cmd(&home)
        .arg("speak")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No text to speak"));
}

#[test]
fn test_speak_output_extension_must_match_format() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("hello.txt");
    fs::write(&input, "Hello there").unwrap();

    podcast_cmd(&home)
        .arg("speak")
        .arg(&input)
        .args(["-o", "out.wav", "-f", "mp3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".mp3 extension"));
}

#[test]
fn test_speak_rejects_unknown_format() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("hello.txt");
    fs::write(&input, "Hello there").unwrap();

    podcast_cmd(&home)
        .arg("speak")
        .arg(&input)
        .args(["-f", "flac"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported audio format"));
}

#[test]
fn test_render_missing_file() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .args(["render", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_render_invalid_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("conversation.json");
    fs::write(&input, "{ not json").unwrap();

    podcast_cmd(&home)
        .arg("render")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid conversation JSON"));
}

#[test]
fn test_render_requires_api_key() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("conversation.json");
    fs::write(
        &input,
        r#"{"conversation": [{"speaker": "Lisa", "text": "Hi there", "voiceId": "lisa"}]}"#,
    )
    .unwrap();

    podcast_cmd(&home)
        .arg("render")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPEECHIFY_API_KEY"));
}

#[test]
fn test_render_empty_conversation() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("conversation.json");
    fs::write(&input, "[]").unwrap();

    podcast_cmd(&home)
        .env("SPEECHIFY_API_KEY", "test-key")
        .arg("render")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one turn"));

    assert!(!home.path().join("output.mp3").exists());
}

#[test]
fn test_generate_requires_api_key() {
    let home = TempDir::new().unwrap();
    podcast_cmd(&home)
        .args(["generate", "The history of tea"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}
