use color_eyre::eyre::{WrapErr, bail};
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `program` with `args` and returns its stdout.
///
/// A non-zero exit status becomes an error carrying the trimmed stderr of the tool.
pub async fn run_tool<S: AsRef<OsStr>>(program: &str, args: &[S]) -> color_eyre::Result<String> {
    debug!(
        program,
        args = ?args.iter().map(|a| a.as_ref().to_string_lossy()).collect::<Vec<_>>(),
        "running external tool"
    );
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .wrap_err_with(|| format!("failed to run {program}"))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{program} failed ({}): {}", output.status, stderr.trim());
    }
}

/// Formats whole seconds as `HH:MM:SS`, the form handed to `-ss`.
pub fn seconds_to_timestamp(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// The `scale` filter that caps the width at `width` while keeping the aspect ratio.
pub fn max_width_filter(width: u32) -> String {
    format!("scale='min({width}\\,iw)':-1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_timestamps() {
        assert_eq!(seconds_to_timestamp(0), "00:00:00");
        assert_eq!(seconds_to_timestamp(59), "00:00:59");
        assert_eq!(seconds_to_timestamp(61), "00:01:01");
        assert_eq!(seconds_to_timestamp(3600 + 120 + 5), "01:02:05");
    }

    #[test]
    fn width_filter_escapes_comma() {
        assert_eq!(max_width_filter(180), "scale='min(180\\,iw)':-1");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let err = run_tool("thumbnailer-no-such-binary", &["-version"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }
}
