//! Stream-copy concatenation of encoded audio files through ffmpeg.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::{PodcastError, Result};

/// Joins already-encoded audio files, in order, into one file
#[async_trait]
pub trait Concatenator: Send + Sync {
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// Concatenator backed by ffmpeg's concat demuxer (`-c copy`, no re-encoding)
#[derive(Debug, Clone)]
pub struct FfmpegConcatenator {
    ffmpeg: PathBuf,
}

impl FfmpegConcatenator {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Resolve a configured binary: paths are used as-is, bare names via PATH
    pub fn locate(configured: &str) -> Result<Self> {
        let path = PathBuf::from(configured);
        if path.components().count() > 1 {
            if !path.exists() {
                return Err(PodcastError::Config(format!(
                    "ffmpeg not found at: {}",
                    path.display()
                )));
            }
            return Ok(Self::new(path));
        }

        which::which(configured).map(Self::new).map_err(|_| {
            PodcastError::Config(format!(
                "'{}' not found on PATH. Is ffmpeg installed?",
                configured
            ))
        })
    }

    pub fn binary(&self) -> &Path {
        &self.ffmpeg
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Inputs must share one container so stream-copy cannot silently mix codecs
fn check_inputs(inputs: &[PathBuf], output: &Path) -> Result<()> {
    if inputs.len() < 2 {
        return Err(PodcastError::Validation(
            "Need at least two files to concatenate.".to_string(),
        ));
    }

    let expected = extension_of(output);
    if let Some(mismatch) = inputs.iter().find(|p| extension_of(p) != expected) {
        return Err(PodcastError::Validation(format!(
            "cannot stream-copy {} into {}: formats differ",
            mismatch.display(),
            output.display()
        )));
    }
    Ok(())
}

/// Concat demuxer list: one `file '<absolute path>'` line per input
fn manifest_contents(inputs: &[PathBuf]) -> Result<String> {
    let mut lines = Vec::with_capacity(inputs.len());
    for input in inputs {
        let absolute = std::path::absolute(input)?;
        let quoted = absolute.to_string_lossy().replace('\'', r"'\''");
        lines.push(format!("file '{}'", quoted));
    }
    Ok(lines.join("\n") + "\n")
}

async fn remove_partial_output(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => log::debug!("Removed partial output {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(
            "Failed to remove partial output {}: {}",
            output.display(),
            e
        ),
    }
}

#[async_trait]
impl Concatenator for FfmpegConcatenator {
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        check_inputs(inputs, output)?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let manifest = tempfile::Builder::new()
            .prefix("concat-")
            .suffix(".txt")
            .tempfile_in(dir)?;
        tokio::fs::write(manifest.path(), manifest_contents(inputs)?).await?;

        log::debug!(
            "Concatenating {} files into {} with {}",
            inputs.len(),
            output.display(),
            self.ffmpeg.display()
        );

        let result = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-loglevel", "error"])
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(manifest.path())
            .args(["-c", "copy", "-y"])
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await;

        // The manifest goes away whatever ffmpeg did
        let manifest_path = manifest.path().to_path_buf();
        if let Err(e) = manifest.close() {
            log::warn!(
                "Failed to delete concat manifest {}: {}",
                manifest_path.display(),
                e
            );
        }

        let output_status = match result {
            Ok(out) => out,
            Err(e) => {
                return Err(PodcastError::Concatenation(format!(
                    "failed to run {}: {}. Is ffmpeg installed?",
                    self.ffmpeg.display(),
                    e
                )));
            }
        };

        if !output_status.status.success() {
            remove_partial_output(output).await;
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            return Err(PodcastError::Concatenation(format!(
                "ffmpeg exited with {}: {}",
                output_status.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    // Stand-in for `ffmpeg -f concat ... -i LIST -c copy -y OUT`: byte-joins the listed files
    #[cfg(unix)]
    const JOINING_TOOL: &str = r#"
list=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) list="$2"; shift ;;
  esac
  out="$1"
  shift
done
: > "$out"
sed -e "s/^file '//" -e "s/'\$//" "$list" | while IFS= read -r f; do cat "$f" >> "$out"; done
"#;

    fn write_inputs(dir: &Path, ext: &str, contents: &[&str]) -> Vec<PathBuf> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let path = dir.join(format!("turn_{}.{}", i, ext));
                std::fs::write(&path, c).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_manifest_contents() {
        let inputs = vec![
            PathBuf::from("/tmp/a.mp3"),
            PathBuf::from("/tmp/it's.mp3"),
        ];
        assert_eq!(
            manifest_contents(&inputs).unwrap(),
            "file '/tmp/a.mp3'\nfile '/tmp/it'\\''s.mp3'\n"
        );
    }

    #[test]
    fn test_manifest_uses_absolute_paths() {
        let contents = manifest_contents(&[PathBuf::from("relative.mp3")]).unwrap();
        let path = contents
            .trim_end()
            .trim_start_matches("file '")
            .trim_end_matches('\'');
        assert!(Path::new(path).is_absolute());
        assert!(path.ends_with("relative.mp3"));
    }

    #[tokio::test]
    async fn test_requires_two_inputs() {
        let temp = TempDir::new().unwrap();
        let concatenator = FfmpegConcatenator::new(temp.path().join("never-run"));
        let output = temp.path().join("out.mp3");

        for count in [0, 1] {
            let inputs = write_inputs(temp.path(), "mp3", &vec!["x"; count]);
            let result = concatenator.concat(&inputs, &output).await;
            assert!(matches!(result, Err(PodcastError::Validation(_))));
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_rejects_mixed_formats() {
        let temp = TempDir::new().unwrap();
        let concatenator = FfmpegConcatenator::new(temp.path().join("never-run"));
        let mut inputs = write_inputs(temp.path(), "mp3", &["a"]);
        inputs.extend(write_inputs(temp.path(), "wav", &["b", "c"]).into_iter().skip(1));

        let result = concatenator
            .concat(&inputs, &temp.path().join("out.mp3"))
            .await;
        assert!(matches!(result, Err(PodcastError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_tool_is_concatenation_failure() {
        let temp = TempDir::new().unwrap();
        let concatenator = FfmpegConcatenator::new(temp.path().join("no-such-ffmpeg"));
        let inputs = write_inputs(temp.path(), "mp3", &["a", "b"]);

        let result = concatenator
            .concat(&inputs, &temp.path().join("out.mp3"))
            .await;

        assert!(matches!(result, Err(PodcastError::Concatenation(_))));
        assert_eq!(file_names(temp.path()), vec!["turn_0.mp3", "turn_1.mp3"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_joins_in_order_and_removes_manifest() {
        let tools = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let concatenator = FfmpegConcatenator::new(fake_ffmpeg(tools.path(), JOINING_TOOL));
        let inputs = write_inputs(temp.path(), "mp3", &["one|", "two|", "three"]);
        let output = temp.path().join("show.mp3");

        concatenator.concat(&inputs, &output).await.unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "one|two|three");
        assert_eq!(
            file_names(temp.path()),
            vec!["show.mp3", "turn_0.mp3", "turn_1.mp3", "turn_2.mp3"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_failure_removes_manifest_and_partial_output() {
        let tools = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let failing = r#"for last; do :; done
echo "partial" > "$last"
echo "Invalid data found when processing input" >&2
exit 1"#;
        let concatenator = FfmpegConcatenator::new(fake_ffmpeg(tools.path(), failing));
        let inputs = write_inputs(temp.path(), "mp3", &["a", "b"]);
        let output = temp.path().join("show.mp3");

        let err = concatenator.concat(&inputs, &output).await.unwrap_err();

        match err {
            PodcastError::Concatenation(message) => {
                assert!(message.contains("Invalid data found"))
            }
            other => panic!("expected concatenation failure, got {}", other),
        }
        assert!(!output.exists());
        assert_eq!(file_names(temp.path()), vec!["turn_0.mp3", "turn_1.mp3"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dropped_concat_kills_the_tool() {
        let tools = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let slow = r#"for last; do :; done
sleep 1
echo "late" > "$last""#;
        let concatenator = FfmpegConcatenator::new(fake_ffmpeg(tools.path(), slow));
        let inputs = write_inputs(temp.path(), "mp3", &["a", "b"]);
        let output = temp.path().join("show.mp3");

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            concatenator.concat(&inputs, &output),
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(!output.exists());
    }

    #[test]
    fn test_locate_explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("ffmpeg");
        assert!(matches!(
            FfmpegConcatenator::locate(missing.to_str().unwrap()),
            Err(PodcastError::Config(_))
        ));
    }

    #[test]
    fn test_locate_unknown_name_on_path() {
        assert!(matches!(
            FfmpegConcatenator::locate("__podcast_test_no_such_binary__"),
            Err(PodcastError::Config(_))
        ));
    }
}
