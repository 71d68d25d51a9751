//! The media operations thumbnails are built from, and their `ffmpeg` implementation.

use crate::ffmpeg::{max_width_filter, run_tool, seconds_to_timestamp};
use crate::ffprobe::get_video_duration;
use crate::sprite_sheet::append_horizontally;
use async_trait::async_trait;
use color_eyre::eyre::{WrapErr, bail, eyre};
use std::path::{Path, PathBuf};
use temp_dir::TempDir;
use tokio::fs;
use tracing::debug;

/// Frame extraction and sprite composition for a single source video.
///
/// Implementations must be shareable between concurrently running jobs.
#[async_trait]
pub trait MediaOperations: Send + Sync {
    /// Length of `source` in seconds.
    async fn duration(&self, source: &Path) -> color_eyre::Result<f64>;

    /// Writes the frame found `skip_seconds` into `source` to `output`.
    /// A `max_width` of 0 keeps the natural width of the video.
    async fn extract_frame(
        &self,
        source: &Path,
        skip_seconds: u64,
        max_width: u32,
        output: &Path,
    ) -> color_eyre::Result<()>;

    /// Samples one frame every `interval_seconds` (starting `skip_seconds` in), scales each
    /// to at most `max_width` and appends them left to right into `output`.
    async fn extract_sprite(
        &self,
        source: &Path,
        skip_seconds: u64,
        interval_seconds: u64,
        max_width: u32,
        output: &Path,
    ) -> color_eyre::Result<()>;
}

/// [`MediaOperations`] backed by the `ffmpeg` and `ffprobe` executables.
#[derive(Clone, Debug)]
pub struct Ffmpeg {
    ffmpeg: String,
    ffprobe: String,
}

impl Ffmpeg {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

async fn ensure_parent_dir(output: &Path) -> color_eyre::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

async fn list_frames(dir: &Path) -> color_eyre::Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("jpg") {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

#[async_trait]
impl MediaOperations for Ffmpeg {
    async fn duration(&self, source: &Path) -> color_eyre::Result<f64> {
        get_video_duration(&self.ffprobe, source).await
    }

    async fn extract_frame(
        &self,
        source: &Path,
        skip_seconds: u64,
        max_width: u32,
        output: &Path,
    ) -> color_eyre::Result<()> {
        ensure_parent_dir(output).await?;

        let timestamp = seconds_to_timestamp(skip_seconds);
        let mut args = vec![
            "-y".to_string(),
            "-ss".into(),
            timestamp.clone(),
            "-i".into(),
            source.to_string_lossy().to_string(),
            "-f".into(),
            "image2".into(),
            "-vframes".into(),
            "1".into(),
        ];
        if max_width != 0 {
            args.extend(["-vf".into(), max_width_filter(max_width)]);
        }
        args.push(output.to_string_lossy().to_string());

        run_tool(&self.ffmpeg, &args).await?;

        // ffmpeg exits 0 without writing anything when seeking past the end.
        let written = fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            bail!(
                "ffmpeg produced no frame for {} at {timestamp}",
                source.display()
            );
        }
        Ok(())
    }

    async fn extract_sprite(
        &self,
        source: &Path,
        skip_seconds: u64,
        interval_seconds: u64,
        max_width: u32,
        output: &Path,
    ) -> color_eyre::Result<()> {
        if interval_seconds == 0 {
            return Err(eyre!("sprite interval must be at least one second"));
        }
        ensure_parent_dir(output).await?;

        let temp_dir = TempDir::with_prefix("thumb")?;
        let pattern = temp_dir.path().join("frames%04d.jpg");
        let filters = [
            format!("fps=fps=1/{interval_seconds}"),
            max_width_filter(max_width),
        ];
        let args = vec![
            "-y".to_string(),
            "-ss".into(),
            seconds_to_timestamp(skip_seconds),
            "-i".into(),
            source.to_string_lossy().to_string(),
            "-f".into(),
            "image2".into(),
            "-vf".into(),
            filters.join(","),
            pattern.to_string_lossy().to_string(),
        ];
        run_tool(&self.ffmpeg, &args).await?;

        let frames = list_frames(temp_dir.path()).await?;
        debug!(frames = frames.len(), source = %source.display(), "composing sprite");
        let output = output.to_path_buf();
        tokio::task::spawn_blocking(move || append_horizontally(&frames, &output))
            .await
            .wrap_err("sprite composition task failed")??;

        temp_dir.cleanup()?;
        Ok(())
    }
}
