use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::VideoResponse;
use tubely_processing::{ValidationError, VideoUpload};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/upload",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "ID of an existing video record owned by the caller")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Form part `video` with an MP4 file"),
    responses(
        (status = 200, description = "Video uploaded and URL persisted", body = VideoResponse),
        (status = 400, description = "Invalid ID, missing form file or wrong content type", body = ErrorResponse),
        (status = 401, description = "Missing token or caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size ceiling", body = ErrorResponse),
        (status = 500, description = "Processing, storage or database failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, video_id = %video_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)
        .map_err(|_| HttpAppError::from(ValidationError::InvalidVideoId(video_id.clone())))?;

    let video = state.pipeline.authorize(video_id, user.user_id).await?;

    tracing::info!(video_id = %video_id, "Uploading video");

    let mut multipart = multipart?;
    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(VIDEO_FORM_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(ValidationError::MissingField(VIDEO_FORM_FIELD.to_string()).into())
            }
        }
    };

    let content_type = field.content_type().map(str::to_string);
    let body = StreamReader::new(Box::pin(field.map_err(std::io::Error::other)));

    let video = state
        .pipeline
        .process(video, VideoUpload::new(content_type, body))
        .await?;

    Ok(Json(VideoResponse::from(video)))
}
