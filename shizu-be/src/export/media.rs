//! Video resolution probing

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Probe binary could not be started
    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// Probe ran but rejected the file
    #[error("Probe failed for {path}: {stderr}")]
    Rejected { path: String, stderr: String },

    /// Probe output was not the expected JSON
    #[error("Unreadable probe output for {path}: {reason}")]
    Output { path: String, reason: String },
}

/// Reads the dimensions of the first video stream of a media file
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// `None` when the file has no video stream (or the path is empty)
    async fn video_resolution(&self, path: &Path) -> Result<Option<(u32, u32)>, ProbeError>;
}

/// [`MediaProbe`] backed by the `ffprobe` binary
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: String,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProbe {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

fn parse_output(path: &Path, stdout: &[u8]) -> Result<Option<(u32, u32)>, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| ProbeError::Output {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(output
        .streams
        .into_iter()
        .find_map(|stream| match (stream.width, stream.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }))
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn video_resolution(&self, path: &Path) -> Result<Option<(u32, u32)>, ProbeError> {
        if path.as_os_str().is_empty() {
            return Ok(None);
        }

        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Rejected {
                path: path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(path, &output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_stream() {
        let stdout = br#"{"programs": [], "streams": [{"width": 1920, "height": 1080}]}"#;
        assert_eq!(
            parse_output(Path::new("set.mp4"), stdout).unwrap(),
            Some((1920, 1080))
        );
    }

    #[test]
    fn test_parse_audio_only() {
        assert_eq!(parse_output(Path::new("set.mp3"), br#"{"streams": []}"#).unwrap(), None);
        assert_eq!(parse_output(Path::new("set.mp3"), b"{}").unwrap(), None);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_output(Path::new("set.mp4"), b"not json"),
            Err(ProbeError::Output { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_path_is_no_video() {
        let probe = FfprobeProbe::new("/nonexistent/ffprobe");
        assert_eq!(probe.video_resolution(Path::new("")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let probe = FfprobeProbe::new("/nonexistent/ffprobe");
        let err = probe.video_resolution(Path::new("set.mp4")).await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
