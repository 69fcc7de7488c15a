//! Upload endpoint integration tests.
//!
//! Run with: `cargo test -p tubely-api --test video_upload_test`

mod helpers;

use axum::body::Body;
use axum::http::{header::CONTENT_LENGTH, Request, StatusCode};
use helpers::{
    chunked_upload_request, dir_is_empty, setup_test_app, upload_path, video_form, RawPart,
    TestAppBuilder, LOCAL_BASE_URL,
};
use serde_json::Value;
use tower::ServiceExt;
use tubely_processing::test_helpers::{FakeProber, FakeRemuxer, RecordingStorage};
use tubely_storage::keys::is_video_storage_key;
use uuid::Uuid;

const MP4_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42fake video payload";

#[tokio::test]
async fn test_upload_persists_bucketed_s3_url() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let url = body["video_url"].as_str().expect("video_url in response");
    let key = url
        .strip_prefix("https://tubely-test.s3.us-east-2.amazonaws.com/")
        .expect("virtual-hosted S3 URL");
    assert!(key.starts_with("landscape/"));
    assert!(is_video_storage_key(key));
    assert_eq!(body["id"], video.id.to_string());

    let uploads = app.storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].key, key);
    assert_eq!(uploads[0].content_type, "video/mp4");
    assert_eq!(uploads[0].bytes, MP4_BYTES);

    let stored = app.videos.get(video.id).await.unwrap();
    assert_eq!(stored.video_url.as_deref(), Some(url));
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_portrait_and_square_videos_use_their_prefixes() {
    for (prober, prefix) in [
        (FakeProber::new(1080, 1920), "/portrait/"),
        (FakeProber::new(1000, 1000), "/other/"),
    ] {
        let app = TestAppBuilder::default().prober(prober).build().await;
        let owner = Uuid::new_v4();
        let video = app.seed_video(owner).await;

        let response = app
            .client()
            .post(&upload_path(video.id))
            .add_header("Authorization", app.bearer(owner))
            .multipart(video_form(MP4_BYTES, "video/mp4"))
            .await;

        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        assert!(body["video_url"].as_str().unwrap().contains(prefix));
    }
}

#[tokio::test]
async fn test_two_uploads_get_distinct_keys() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    for _ in 0..2 {
        let response = app
            .client()
            .post(&upload_path(video.id))
            .add_header("Authorization", app.bearer(owner))
            .multipart(video_form(MP4_BYTES, "video/mp4"))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let uploads = app.storage.uploads();
    assert_eq!(uploads.len(), 2);
    assert_ne!(uploads[0].key, uploads[1].key);
}

#[tokio::test]
async fn test_non_owner_is_unauthorized_and_nothing_changes() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(Uuid::new_v4()))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");

    assert!(app.storage.uploads().is_empty());
    assert_eq!(app.prober.calls(), 0);
    assert_eq!(app.videos.update_count(), 0);
    assert_eq!(app.videos.get(video.id).await.unwrap().video_url, None);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = setup_test_app().await;
    let video = app.seed_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 401);
    assert!(app.storage.uploads().is_empty());
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let forged = tubely_api::auth::jwt::create_token(
        owner,
        "another-secret-another-secret-0123456789",
        chrono::Duration::hours(1),
    )
    .unwrap();

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", format!("Bearer {}", forged))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let app = setup_test_app().await;
    let user = Uuid::new_v4();

    let response = app
        .client()
        .post(&upload_path(Uuid::new_v4()))
        .add_header("Authorization", app.bearer(user))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_video_id_is_bad_request() {
    let app = setup_test_app().await;
    let user = Uuid::new_v4();

    let response = app
        .client()
        .post(&upload_path("not-a-uuid"))
        .add_header("Authorization", app.bearer(user))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid ID");
}

#[tokio::test]
async fn test_wrong_mime_rejected_before_probe() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(MP4_BYTES, "video/quicktime"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(app.prober.calls(), 0);
    assert!(app.storage.uploads().is_empty());
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_missing_video_field_is_bad_request() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let form = axum_test::multipart::MultipartForm::new().add_text("title", "no file here");
    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.prober.calls(), 0);
}

#[tokio::test]
async fn test_declared_oversize_rejected_before_staging() {
    let app = TestAppBuilder::default()
        .max_video_size_bytes(1024)
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(&vec![0u8; 4096], "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.prober.calls(), 0);
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_declared_oversize_checked_before_auth() {
    let app = TestAppBuilder::default()
        .max_video_size_bytes(1024)
        .build()
        .await;

    // No token and no body: only the declared length is inspected
    let request = Request::builder()
        .method("POST")
        .uri(upload_path(Uuid::new_v4()))
        .header(CONTENT_LENGTH, "4096")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chunked_upload_without_length_succeeds() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let request = chunked_upload_request(
        &upload_path(video.id),
        &app.bearer(owner),
        vec![
            RawPart {
                name: "title",
                mime: None,
                bytes: b"Boots".to_vec(),
            },
            RawPart {
                name: "video",
                mime: Some("video/mp4"),
                bytes: vec![3u8; 20 * 1024],
            },
        ],
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let uploads = app.storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].bytes.len(), 20 * 1024);
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_streamed_video_over_ceiling_is_too_large() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let request = chunked_upload_request(
        &upload_path(video.id),
        &app.bearer(owner),
        vec![RawPart {
            name: "video",
            mime: Some("video/mp4"),
            bytes: vec![0u8; 200 * 1024],
        }],
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.prober.calls(), 0);
    assert!(app.storage.uploads().is_empty());
    assert!(app.videos.get(video.id).await.unwrap().video_url.is_none());
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_streamed_padding_fields_count_against_ceiling() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    for padding in [900 * 1024, 1200 * 1024] {
        let request = chunked_upload_request(
            &upload_path(video.id),
            &app.bearer(owner),
            vec![
                RawPart {
                    name: "notes",
                    mime: None,
                    bytes: vec![b'x'; padding],
                },
                RawPart {
                    name: "video",
                    mime: Some("video/mp4"),
                    bytes: vec![1u8; 100],
                },
            ],
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    assert!(app.storage.uploads().is_empty());
    assert_eq!(app.videos.update_count(), 0);
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_zero_stream_file_fails_without_upload() {
    let app = TestAppBuilder::default()
        .prober(FakeProber::no_streams())
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["code"], "MEDIA_PROCESSING_ERROR");
    assert_eq!(body["error"], "Failed to process video");
    assert!(app.storage.uploads().is_empty());
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_remux_failure_cleans_staging() {
    let app = TestAppBuilder::default()
        .remuxer(FakeRemuxer::failing_after_partial_write())
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["code"], "MEDIA_PROCESSING_ERROR");
    assert!(app.storage.uploads().is_empty());
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_storage_failure_leaves_record_untouched() {
    let app = TestAppBuilder::default()
        .storage(RecordingStorage::failing())
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert_eq!(app.videos.update_count(), 0);
    assert_eq!(app.videos.get(video.id).await.unwrap().video_url, None);
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_persist_failure_reports_database_error() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    app.videos.fail_updates();

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 500);
    // The object was stored before the write failed
    assert_eq!(app.storage.uploads().len(), 1);
    assert!(dir_is_empty(app.staging_dir.path()));
}

#[tokio::test]
async fn test_local_storage_upload_is_served_back() {
    let app = TestAppBuilder::default().local_storage().build().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let url = body["video_url"].as_str().unwrap();
    let key = url
        .strip_prefix(&format!("{}/", LOCAL_BASE_URL))
        .expect("local base URL");
    assert!(key.starts_with("landscape/"));
    assert!(app.media_dir.path().join(key).exists());

    let served = app.client().get(&format!("/media/{}", key)).await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.as_bytes().as_ref(), MP4_BYTES);
}
