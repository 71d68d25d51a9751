use crate::ffmpeg::run_tool;
use color_eyre::eyre::{WrapErr, eyre};
use std::path::Path;

/// Asks `ffprobe` for the container duration of `input`, in seconds.
pub async fn get_video_duration(ffprobe: &str, input: &Path) -> color_eyre::Result<f64> {
    let input_str = input.to_string_lossy().into_owned();
    let stdout = run_tool(
        ffprobe,
        &[
            "-v",
            "quiet",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
            "-i",
            input_str.as_str(),
        ],
    )
    .await?;

    parse_duration(&stdout).wrap_err_with(|| format!("could not read duration of {input_str}"))
}

fn parse_duration(stdout: &str) -> color_eyre::Result<f64> {
    let trimmed = stdout.trim();
    let duration: f64 = trimmed
        .parse()
        .map_err(|_| eyre!("unparseable duration {trimmed:?}"))?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(eyre!("invalid duration {duration}"));
    }
    Ok(duration)
}
