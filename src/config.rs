//! Run options and the `key=value` configuration file they can be loaded from.

use crate::dispatch::StragglerPolicy;
use crate::thumbnails::SpriteThumbnail;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Number of frames in a sprite when nothing else is configured.
pub const DEFAULT_SPRITE_COUNT: u32 = 30;
/// Sprite width used when no explicit width is configured.
pub const DEFAULT_SPRITE_WIDTH: u32 = 180;
/// Upload limit of the HTTP server, 512 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;
/// Name of the configuration file looked up in the home directory.
pub const HOME_CONFIG_FILE: &str = ".thumbnailer.conf";
/// System wide configuration file.
pub const ETC_CONFIG_FILE: &str = "/etc/thumbnailer.conf";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration at line {line}: {text:?}")]
    InvalidLine { line: usize, text: String },

    #[error("invalid configuration at line {line}, expecting integer: {text:?}")]
    InvalidInteger { line: usize, text: String },

    #[error("invalid mode {0:?}, expected 'cli' or 'http'")]
    InvalidMode(String),

    #[error("missing required option: {0}")]
    Missing(&'static str),

    #[error("invalid thumbnail type {0:?}")]
    UnknownVariant(String),

    #[error("the input file {0:?} does not exist")]
    MissingInputFile(PathBuf),

    #[error("the sprite count must be greater than zero")]
    ZeroCount,
}

/// Whether a run processes files once or serves thumbnails over HTTP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Cli,
    Http,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cli" => Ok(Mode::Cli),
            "http" => Ok(Mode::Http),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Cli => write!(f, "cli"),
            Mode::Http => write!(f, "http"),
        }
    }
}

/// Everything a run needs to know. Built once at startup and only read afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// Host name the HTTP server listens on.
    pub host: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    pub mode: Mode,
    /// The thumbnail variant, `simple` or `sprite`.
    pub thumb_type: String,
    /// One or more input videos separated by commas.
    pub in_file: String,
    /// Output path template, see [`crate::template`].
    pub out_file: String,
    /// Thumbnail width in pixels. 0 means the variant default.
    pub width: u32,
    /// Seconds to skip into the video before thumbnailing.
    pub skip_seconds: u64,
    /// Number of frames in a sprite.
    pub count: u32,
    pub quiet: bool,
    pub verbose: bool,
    /// The `ffmpeg` executable.
    pub ffmpeg: String,
    /// The `ffprobe` executable.
    pub ffprobe: String,
    /// Largest request body the HTTP server accepts.
    pub max_upload_bytes: usize,
    /// Seconds a failed batch keeps waiting for its remaining jobs. 0 detaches them at once.
    pub grace_seconds: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            mode: Mode::Cli,
            thumb_type: "simple".to_string(),
            in_file: String::new(),
            out_file: String::new(),
            width: 0,
            skip_seconds: 0,
            count: DEFAULT_SPRITE_COUNT,
            quiet: false,
            verbose: false,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            grace_seconds: 0,
        }
    }
}

type Setter = fn(&mut Options, &str) -> Result<(), ValueError>;

enum ValueError {
    Integer,
    Mode(ConfigError),
}

fn int<T: FromStr>(value: &str) -> Result<T, ValueError> {
    value.trim().parse().map_err(|_| ValueError::Integer)
}

fn boolean(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "yes" | "1")
}

/// Configuration keys and how each one is applied. Keys are compared case-insensitively with
/// underscores removed, so `SkipSeconds` and `skip_seconds` are the same key.
const SETTERS: &[(&str, Setter)] = &[
    ("host", |o, v| {
        o.host = v.to_string();
        Ok(())
    }),
    ("port", |o, v| {
        o.port = int(v)?;
        Ok(())
    }),
    ("mode", |o, v| {
        o.mode = v.parse().map_err(ValueError::Mode)?;
        Ok(())
    }),
    ("thumbtype", |o, v| {
        o.thumb_type = v.to_string();
        Ok(())
    }),
    ("infile", |o, v| {
        o.in_file = v.to_string();
        Ok(())
    }),
    ("outfile", |o, v| {
        o.out_file = v.to_string();
        Ok(())
    }),
    ("width", |o, v| {
        o.width = int(v)?;
        Ok(())
    }),
    ("skipseconds", |o, v| {
        o.skip_seconds = int(v)?;
        Ok(())
    }),
    ("count", |o, v| {
        o.count = int(v)?;
        Ok(())
    }),
    ("quiet", |o, v| {
        o.quiet = boolean(v);
        Ok(())
    }),
    ("verbose", |o, v| {
        o.verbose = boolean(v);
        Ok(())
    }),
    ("ffmpeg", |o, v| {
        o.ffmpeg = v.to_string();
        Ok(())
    }),
    ("ffprobe", |o, v| {
        o.ffprobe = v.to_string();
        Ok(())
    }),
    ("maxuploadbytes", |o, v| {
        o.max_upload_bytes = int(v)?;
        Ok(())
    }),
    ("graceseconds", |o, v| {
        o.grace_seconds = int(v)?;
        Ok(())
    }),
];

fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl Options {
    /// How a failed batch treats the jobs still running.
    pub fn straggler_policy(&self) -> StragglerPolicy {
        match self.grace_seconds {
            0 => StragglerPolicy::Detach,
            secs => StragglerPolicy::Wait(Duration::from_secs(secs)),
        }
    }

    /// Applies the `key=value` lines of `contents` on top of `self`.
    ///
    /// Blank lines and lines starting with `#` are skipped. Unknown keys are ignored.
    pub fn apply_config(&mut self, contents: &str) -> Result<(), ConfigError> {
        for (idx, raw) in contents.lines().enumerate() {
            let line = idx + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let Some((key, value)) = text.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line,
                    text: text.to_string(),
                });
            };

            let key = normalize_key(key);
            let Some((_, setter)) = SETTERS.iter().find(|(name, _)| *name == key) else {
                warn!(line, key = %key, "ignoring unknown configuration key");
                continue;
            };
            setter(self, value.trim()).map_err(|e| match e {
                ValueError::Integer => ConfigError::InvalidInteger {
                    line,
                    text: text.to_string(),
                },
                ValueError::Mode(err) => err,
            })?;
        }
        Ok(())
    }

    /// Reads `path` and applies it with [`Options::apply_config`].
    pub fn load_config_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading configuration file");
        self.apply_config(&contents)
    }

    /// The input files listed in `in_file`, trimmed, with empty entries dropped.
    pub fn input_files(&self) -> Vec<PathBuf> {
        self.in_file
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// Checks the options needed for a command line run and returns the input files.
    pub fn validate_cli(&self, variants: &[&str]) -> Result<Vec<PathBuf>, ConfigError> {
        let files = self.input_files();
        if files.is_empty() {
            return Err(ConfigError::Missing("input file (-i)"));
        }
        if self.out_file.trim().is_empty() {
            return Err(ConfigError::Missing("output file (-o)"));
        }
        if self.thumb_type.trim().is_empty() {
            return Err(ConfigError::Missing("thumbnail type (-t)"));
        }
        if !variants.contains(&self.thumb_type.as_str()) {
            return Err(ConfigError::UnknownVariant(self.thumb_type.clone()));
        }
        if self.thumb_type == SpriteThumbnail::NAME && self.count == 0 {
            return Err(ConfigError::ZeroCount);
        }
        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(ConfigError::MissingInputFile(missing.clone()));
        }
        Ok(files)
    }
}

/// The configuration file to load: the explicit one if given, otherwise the first existing
/// file among `$HOME/.thumbnailer.conf` and `/etc/thumbnailer.conf`.
pub fn discover_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let home = std::env::var_os("HOME").map(|h| PathBuf::from(h).join(HOME_CONFIG_FILE));
    home.into_iter()
        .chain(std::iter::once(PathBuf::from(ETC_CONFIG_FILE)))
        .find(|p| p.is_file())
}
