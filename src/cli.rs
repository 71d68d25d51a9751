//! The command line front-end: flags, option loading and batch runs.

use crate::config::{ConfigError, Mode, Options, discover_config_file};
use crate::dispatch::Dispatcher;
use crate::media::MediaOperations;
use crate::thumbnails::{VARIANT_NAMES, default_variants};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::Arc;

const AFTER_HELP: &str = "\
Options can also be set in a configuration file of key=value lines. Without --conf the file is
read from ~/.thumbnailer.conf, then /etc/thumbnailer.conf. Flags override the file.

The output path may contain {name} (input file name without extension), {type} (simple or
sprite) and %d (position of the input in the list, e.g. %02d for zero padding).

Examples:
  thumbnailer -t sprite -i source.mp4 -o thumb.jpg
  thumbnailer -i source1.mp4,source2.mp4 -o out%02d.jpg
  thumbnailer -t sprite -i source.mp4 -o thumb-{name}-{type}.jpg
  thumbnailer -m http -h 127.0.0.1 -p 3366";

#[derive(Debug, Parser)]
#[command(
    name = "thumbnailer",
    version,
    about = "Generate thumbnails from videos, from the command line or over HTTP",
    after_help = AFTER_HELP,
    disable_help_flag = true
)]
pub struct Args {
    /// Path to a configuration file.
    #[arg(long, value_name = "PATH")]
    pub conf: Option<PathBuf>,

    /// Running mode.
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// The type of thumbnail to generate, simple or sprite.
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub thumb_type: Option<String>,

    /// The input video file. Separate multiple files with a comma.
    #[arg(short, long, value_name = "FILES")]
    pub input: Option<String>,

    /// The output image file template.
    #[arg(short, long, value_name = "TEMPLATE")]
    pub output: Option<String>,

    /// The thumbnail width. Overrides the built in defaults.
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Skip this number of seconds into the video before thumbnailing.
    #[arg(short, long, value_name = "SECONDS")]
    pub skip: Option<u64>,

    /// Number of frames in a sprite.
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,

    /// The host name to listen on.
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// The port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seconds a failed batch waits for its other jobs before exiting.
    #[arg(long, value_name = "SECONDS")]
    pub grace: Option<u64>,

    /// The ffmpeg executable.
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<String>,

    /// The ffprobe executable.
    #[arg(long, value_name = "PATH")]
    pub ffprobe: Option<String>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Args {
    /// Overrides `options` with every flag that was given.
    pub fn apply(&self, options: &mut Options) {
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if let Some(thumb_type) = &self.thumb_type {
            options.thumb_type = thumb_type.clone();
        }
        if let Some(input) = &self.input {
            options.in_file = input.clone();
        }
        if let Some(output) = &self.output {
            options.out_file = output.clone();
        }
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(skip) = self.skip {
            options.skip_seconds = skip;
        }
        if let Some(count) = self.count {
            options.count = count;
        }
        if self.quiet {
            options.quiet = true;
        }
        if self.verbose {
            options.verbose = true;
        }
        if let Some(host) = &self.host {
            options.host = host.clone();
        }
        if let Some(port) = self.port {
            options.port = port;
        }
        if let Some(grace) = self.grace {
            options.grace_seconds = grace;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            options.ffmpeg = ffmpeg.clone();
        }
        if let Some(ffprobe) = &self.ffprobe {
            options.ffprobe = ffprobe.clone();
        }
    }
}

/// Defaults, then the configuration file, then the flags in `args`.
pub fn load_options(args: &Args) -> Result<Options, ConfigError> {
    let mut options = Options::default();
    if let Some(path) = discover_config_file(args.conf.as_deref()) {
        options.load_config_file(&path)?;
    }
    args.apply(&mut options);
    Ok(options)
}

/// Generates one thumbnail per input file listed in `options`.
///
/// Configuration problems are reported before any job starts. Otherwise the first job failure
/// is returned; jobs still running at that point are handled per `options.grace_seconds`.
pub async fn run_batch(
    options: Arc<Options>,
    media: Arc<dyn MediaOperations>,
) -> color_eyre::Result<()> {
    let inputs = options.validate_cli(&VARIANT_NAMES)?;

    let mut dispatcher = Dispatcher::new(inputs, options.out_file.clone())
        .with_straggler_policy(options.straggler_policy());
    for variant in default_variants(options.clone(), media) {
        dispatcher.register(variant);
    }

    dispatcher.dispatch(&options.thumb_type).await?;
    Ok(())
}
