use crate::config::Options;
use crate::dispatch::Dispatcher;
use crate::server::AppState;
use crate::server::error::{AppError, AppResult};
use crate::thumbnails::{SimpleThumbnail, SpriteThumbnail, default_variants};
use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use temp_dir::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Query parameters accepted by the thumbnail endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ThumbnailParams {
    pub width: Option<u32>,
    pub skip: Option<u64>,
    pub count: Option<u32>,
}

impl ThumbnailParams {
    fn apply(&self, base: &Options) -> Options {
        let mut options = base.clone();
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(skip) = self.skip {
            options.skip_seconds = skip;
        }
        if let Some(count) = self.count {
            options.count = count;
        }
        options
    }
}

#[derive(Debug)]
struct Upload {
    name: String,
    size: u64,
    content_type: Option<String>,
    path: PathBuf,
}

/// Streams the single uploaded file of `multipart` into `dir`.
async fn receive_upload(multipart: &mut Multipart, dir: &Path) -> AppResult<Upload> {
    let mut upload = None;
    let mut files = 0;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        files += 1;
        if files > 1 {
            continue;
        }

        let extension = Path::new(&name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let path = dir.join(format!("upload{extension}"));
        let content_type = field.content_type().map(str::to_string);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;
        let mut size = 0u64;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            size += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;
        }
        file.flush()
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

        upload = Some(Upload {
            name,
            size,
            content_type,
            path,
        });
    }

    match (files, upload) {
        (1, Some(upload)) => Ok(upload),
        (0, _) => Err(AppError::BadRequest("No files uploaded.".to_string())),
        _ => Err(AppError::BadRequest("Only a single file allowed.".to_string())),
    }
}

/// Runs the uploaded video through `variant` and answers with the image.
async fn render_thumbnail(
    state: AppState,
    variant: &str,
    params: ThumbnailParams,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let options = params.apply(&state.options);
    if variant == SpriteThumbnail::NAME && options.count == 0 {
        return Err(AppError::BadRequest(
            "count must be greater than zero".to_string(),
        ));
    }

    let workdir = TempDir::with_prefix("thumbnailer")
        .map_err(|e| AppError::Internal(format!("failed to create work directory: {e}")))?;
    let upload = receive_upload(&mut multipart, workdir.path()).await?;
    debug!(
        name = %upload.name,
        size = upload.size,
        content_type = ?upload.content_type,
        "received upload"
    );

    let output = workdir.path().join("thumbnail.jpg");
    let mut dispatcher = Dispatcher::new(
        vec![upload.path.clone()],
        output.to_string_lossy().into_owned(),
    );
    for v in default_variants(Arc::new(options), state.media.clone()) {
        dispatcher.register(v);
    }
    dispatcher.dispatch(variant).await?;

    let image = tokio::fs::read(&output)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read thumbnail: {e}")))?;

    Ok((
        [
            (CONTENT_DISPOSITION, "attachment; filename=thumbnail.jpg"),
            (CONTENT_TYPE, "image/jpeg"),
        ],
        image,
    )
        .into_response())
}

/// POST /thumbnail/simple
pub async fn simple_thumbnail(
    State(state): State<AppState>,
    Query(params): Query<ThumbnailParams>,
    multipart: Multipart,
) -> AppResult<Response> {
    render_thumbnail(state, SimpleThumbnail::NAME, params, multipart).await
}

/// POST /thumbnail/sprite
pub async fn sprite_thumbnail(
    State(state): State<AppState>,
    Query(params): Query<ThumbnailParams>,
    multipart: Multipart,
) -> AppResult<Response> {
    render_thumbnail(state, SpriteThumbnail::NAME, params, multipart).await
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PulseResponse {
    pub status: String,
    pub version: String,
    pub num_requests: u64,
    pub num_errors: u64,
}

/// GET /pulse
pub async fn pulse(State(state): State<AppState>) -> Json<PulseResponse> {
    Json(PulseResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        num_requests: state.stats.requests.load(Ordering::Relaxed),
        num_errors: state.stats.errors.load(Ordering::Relaxed),
    })
}

/// GET /help
pub async fn help(State(state): State<AppState>) -> Html<String> {
    Html(render_help(&state.options))
}

fn render_help(options: &Options) -> String {
    let skip = options.skip_seconds;
    let count = options.count;
    let simple_width = match options.width {
        0 => "the width of the video".to_string(),
        w => format!("{w}px wide maintaining aspect ratio"),
    };
    let sprite_width = match options.width {
        0 => crate::config::DEFAULT_SPRITE_WIDTH,
        w => w,
    };
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>Help</title>
    </head>
    <body>
        <h1>Thumbnailer Help</h1>
        <p>End Points:</p>
        <ul>
            <li>
                POST <a href="/thumbnail/simple">/thumbnail/simple</a>
                <p>
                    Generates a simple thumbnail from an uploaded video. A single video must be uploaded.
                    <br/>Possible query arguments:
                    <ul>
                        <li>width - The width of the thumbnail. Defaults to {simple_width}.</li>
                        <li>skip - Skip this number of seconds into the video. Defaults to {skip}.</li>
                    </ul>
                </p>
            </li>
            <li>
                POST <a href="/thumbnail/sprite">/thumbnail/sprite</a>
                <p>
                    Generates a sprite thumbnail from an uploaded video. A single video must be uploaded.
                    <br/>Possible query arguments:
                    <ul>
                        <li>width - The width of each frame. Defaults to {sprite_width}px wide maintaining aspect ratio.</li>
                        <li>skip - Skip this number of seconds into the video. Defaults to {skip}.</li>
                        <li>count - The number of frames to include in the sprite. Defaults to {count}.</li>
                    </ul>
                </p>
            </li>
            <li>
                GET <a href="/help">/help</a>
                <p>Returns this help page.</p>
            </li>
            <li>
                GET <a href="/pulse">/pulse</a>
                <p>Returns the version and request counters of the server.</p>
            </li>
        </ul>
    </body>
</html>
"#
    )
}
