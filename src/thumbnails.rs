//! Thumbnail variants and the jobs they execute.

mod simple_thumbnails;
mod sprite_thumbnails;

use crate::config::Options;
use crate::media::MediaOperations;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub use simple_thumbnails::SimpleThumbnail;
pub use sprite_thumbnails::{SpriteThumbnail, sprite_interval};

/// One input video and the image to produce from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Name of the variant the job was dispatched to.
    pub variant: String,
}

/// A kind of thumbnail, registered with a [`crate::Dispatcher`] under [`Variant::name`].
#[async_trait]
pub trait Variant: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produces `job.output` from `job.input`. Called once per job, possibly concurrently.
    async fn execute(&self, job: &Job) -> color_eyre::Result<()>;
}

/// The `simple` and `sprite` variants, sharing `options` and `media`.
pub fn default_variants(
    options: Arc<Options>,
    media: Arc<dyn MediaOperations>,
) -> Vec<Arc<dyn Variant>> {
    let simple: Arc<dyn Variant> = Arc::new(SimpleThumbnail::new(options.clone(), media.clone()));
    let sprite: Arc<dyn Variant> = Arc::new(SpriteThumbnail::new(options, media));
    vec![simple, sprite]
}

/// Names of the variants returned by [`default_variants`].
pub const VARIANT_NAMES: [&str; 2] = [SimpleThumbnail::NAME, SpriteThumbnail::NAME];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMedia, MediaCall};
    use std::path::Path;

    fn job(variant: &str, output: &Path) -> Job {
        Job {
            input: PathBuf::from("/videos/movie.mp4"),
            output: output.to_path_buf(),
            variant: variant.to_string(),
        }
    }

    #[tokio::test]
    async fn simple_uses_skip_and_width() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("movie.jpg");
        let media = Arc::new(FakeMedia::new(90.0));
        let options = Arc::new(Options {
            skip_seconds: 7,
            width: 640,
            ..Options::default()
        });

        SimpleThumbnail::new(options, media.clone())
            .execute(&job("simple", &out))
            .await
            .unwrap();

        assert_eq!(
            media.calls(),
            vec![MediaCall::Frame {
                source: PathBuf::from("/videos/movie.mp4"),
                skip_seconds: 7,
                max_width: 640,
                output: out.clone(),
            }]
        );
        assert!(out.is_file());
    }

    #[tokio::test]
    async fn sprite_derives_interval_and_default_width() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("movie-sprite.jpg");
        let media = Arc::new(FakeMedia::new(300.7));
        let options = Arc::new(Options::default());

        SpriteThumbnail::new(options, media.clone())
            .execute(&job("sprite", &out))
            .await
            .unwrap();

        assert_eq!(
            media.calls(),
            vec![MediaCall::Sprite {
                source: PathBuf::from("/videos/movie.mp4"),
                skip_seconds: 0,
                interval_seconds: 10,
                max_width: 180,
                output: out,
            }]
        );
    }

    #[tokio::test]
    async fn sprite_of_short_video_keeps_explicit_width() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("short.jpg");
        let media = Arc::new(FakeMedia::new(5.2));
        let options = Arc::new(Options {
            width: 320,
            ..Options::default()
        });

        SpriteThumbnail::new(options, media.clone())
            .execute(&job("sprite", &out))
            .await
            .unwrap();

        match &media.calls()[..] {
            [MediaCall::Sprite {
                interval_seconds,
                max_width,
                ..
            }] => {
                assert_eq!(*interval_seconds, 5);
                assert_eq!(*max_width, 320);
            }
            calls => panic!("unexpected calls {calls:?}"),
        }
    }

    #[tokio::test]
    async fn sprite_of_zero_length_media_fails() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(FakeMedia::new(0.4));

        let err = SpriteThumbnail::new(Arc::new(Options::default()), media.clone())
            .execute(&job("sprite", &dir.path().join("x.jpg")))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("zero-length"));
        assert!(media.calls().is_empty());
    }

    #[tokio::test]
    async fn sprite_with_zero_count_fails() {
        let media = Arc::new(FakeMedia::new(60.0));
        let options = Arc::new(Options {
            count: 0,
            ..Options::default()
        });

        let result = SpriteThumbnail::new(options, media.clone())
            .execute(&job("sprite", Path::new("x.jpg")))
            .await;

        assert!(result.is_err());
        assert!(media.calls().is_empty());
    }

    #[tokio::test]
    async fn media_failure_is_returned() {
        let media = Arc::new(FakeMedia::failing("ffmpeg failed: no video stream"));
        let err = SimpleThumbnail::new(Arc::new(Options::default()), media)
            .execute(&job("simple", Path::new("x.jpg")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ffmpeg failed: no video stream");
    }

    #[test]
    fn default_variant_names() {
        let variants = default_variants(
            Arc::new(Options::default()),
            Arc::new(FakeMedia::new(1.0)),
        );
        let names: Vec<_> = variants.iter().map(|v| v.name()).collect();
        assert_eq!(names, VARIANT_NAMES);
    }
}
