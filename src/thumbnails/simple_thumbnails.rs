use crate::config::Options;
use crate::media::MediaOperations;
use crate::thumbnails::{Job, Variant};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// A single frame taken `skip_seconds` into the video.
pub struct SimpleThumbnail {
    options: Arc<Options>,
    media: Arc<dyn MediaOperations>,
}

impl SimpleThumbnail {
    pub const NAME: &'static str = "simple";

    pub fn new(options: Arc<Options>, media: Arc<dyn MediaOperations>) -> Self {
        Self { options, media }
    }
}

#[async_trait]
impl Variant for SimpleThumbnail {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute(&self, job: &Job) -> color_eyre::Result<()> {
        self.media
            .extract_frame(
                &job.input,
                self.options.skip_seconds,
                self.options.width,
                &job.output,
            )
            .await?;

        info!(
            input = %job.input.display(),
            output = %job.output.display(),
            "simple thumbnail written"
        );
        Ok(())
    }
}
