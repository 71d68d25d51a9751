//! # Thumbnailer
//!
//! Generates thumbnails from video files using FFmpeg and FFprobe, either for a batch of files
//! given on the command line or for single uploads over HTTP.
//!
//! Two kinds of thumbnail are supported:
//! - `simple`: one frame, taken a configurable number of seconds into the video.
//! - `sprite`: frames sampled evenly across the video, appended into one horizontal strip.
//!
//! A [`Dispatcher`] runs one job per input file concurrently and reports the first failure,
//! or success once every job has finished. Output paths are built from a template, see
//! [`template`].
//!
//! ## Requirements
//!
//! - **FFmpeg**: Must be installed and accessible in the system's `PATH`.
//! - **FFprobe**: Must be installed and accessible in the system's `PATH`.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use thumbnailer::{Dispatcher, Ffmpeg, Options, default_variants};
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let options = Arc::new(Options {
//!         count: 20,
//!         ..Options::default()
//!     });
//!
//!     let mut dispatcher = Dispatcher::new(
//!         vec![PathBuf::from("one.mp4"), PathBuf::from("two.mp4")],
//!         "thumbs/{name}-{type}.jpg",
//!     );
//!     for variant in default_variants(options, Arc::new(Ffmpeg::default())) {
//!         dispatcher.register(variant);
//!     }
//!     dispatcher.dispatch("sprite").await?;
//!     Ok(())
//! }
//! ```

// Running the ffmpeg executable.
mod ffmpeg;
// Querying media duration with ffprobe.
mod ffprobe;
// Appending extracted frames into a sprite.
mod sprite_sheet;

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod media;
pub mod server;
pub mod template;
pub mod thumbnails;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, Mode, Options};
pub use dispatch::{DispatchError, Dispatcher, StragglerPolicy};
pub use media::{Ffmpeg, MediaOperations};
pub use thumbnails::{Job, SimpleThumbnail, SpriteThumbnail, Variant, default_variants};
