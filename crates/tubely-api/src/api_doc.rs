//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tubely_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video upload service. Uploaded MP4s are remuxed for fast start, filed under an aspect-ratio prefix in object storage, and the public URL is stored on the video record."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::health::health_check,
        handlers::health::liveness_check,
    ),
    components(schemas(
        models::VideoResponse,
        models::AspectBucket,
        error::ErrorResponse,
        handlers::health::HealthCheckResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video upload"),
        (name = "health", description = "Liveness and dependency checks")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
