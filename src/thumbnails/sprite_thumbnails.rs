use crate::config::{DEFAULT_SPRITE_WIDTH, Options};
use crate::media::MediaOperations;
use crate::thumbnails::{Job, Variant};
use async_trait::async_trait;
use color_eyre::eyre::bail;
use std::sync::Arc;
use tracing::{debug, info};

/// Seconds between sampled frames so that a video of `duration` seconds yields about `count`
/// frames. Videos shorter than `count` seconds are sampled once, at an interval of the whole
/// duration. Returns `None` when `count` is 0.
pub fn sprite_interval(duration: u64, count: u32) -> Option<u64> {
    let count = u64::from(count);
    if count == 0 {
        None
    } else if duration < count {
        Some(duration)
    } else {
        Some(duration / count)
    }
}

/// Frames sampled across the whole video, appended into one horizontal strip.
pub struct SpriteThumbnail {
    options: Arc<Options>,
    media: Arc<dyn MediaOperations>,
}

impl SpriteThumbnail {
    pub const NAME: &'static str = "sprite";

    pub fn new(options: Arc<Options>, media: Arc<dyn MediaOperations>) -> Self {
        Self { options, media }
    }

    fn width(&self) -> u32 {
        match self.options.width {
            0 => DEFAULT_SPRITE_WIDTH,
            w => w,
        }
    }
}

#[async_trait]
impl Variant for SpriteThumbnail {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute(&self, job: &Job) -> color_eyre::Result<()> {
        let duration = self.media.duration(&job.input).await?.trunc() as u64;
        let Some(interval) = sprite_interval(duration, self.options.count) else {
            bail!("the sprite count must be greater than zero");
        };
        debug!(duration, interval, input = %job.input.display(), "sprite sampling");
        if interval == 0 {
            bail!(
                "cannot build a sprite from zero-length media {}",
                job.input.display()
            );
        }

        self.media
            .extract_sprite(
                &job.input,
                self.options.skip_seconds,
                interval,
                self.width(),
                &job.output,
            )
            .await?;

        info!(
            input = %job.input.display(),
            output = %job.output.display(),
            "sprite thumbnail written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_divides_duration() {
        assert_eq!(sprite_interval(300, 30), Some(10));
        assert_eq!(sprite_interval(301, 30), Some(10));
        assert_eq!(sprite_interval(30, 30), Some(1));
    }

    #[test]
    fn short_videos_are_sampled_once() {
        assert_eq!(sprite_interval(5, 30), Some(5));
        assert_eq!(sprite_interval(29, 30), Some(29));
    }

    #[test]
    fn zero_duration_gives_zero_interval() {
        assert_eq!(sprite_interval(0, 30), Some(0));
    }

    #[test]
    fn zero_count_has_no_interval() {
        assert_eq!(sprite_interval(10, 0), None);
        assert_eq!(sprite_interval(0, 0), None);
    }
}
