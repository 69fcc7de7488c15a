use std::sync::Arc;

use tubely_db::VideoStore;
use tubely_processing::VideoUploadPipeline;
use tubely_storage::Storage;

use crate::auth::jwt::JwtService;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtService,
    pub videos: Arc<dyn VideoStore>,
    pub storage: Arc<dyn Storage>,
    pub pipeline: VideoUploadPipeline,
}
