//! On-disk staging for uploaded and remuxed media.
//!
//! Every staged path is held by a `TempPath`, which removes the file when
//! dropped. Returning early, failing, or having the request future dropped
//! all clean up the same way.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::validator::ValidationError;

const COPY_BUFFER_SIZE: usize = 64 * 1024;
const REMUX_SUFFIX: &str = ".processing";

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The client body could not be read
    #[error("Failed to read upload body: {0}")]
    Read(#[source] std::io::Error),

    /// Local disk failure
    #[error("Staging I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A staged file that is deleted when dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Guard for the fast-start copy of this file (`<path>.processing`).
    ///
    /// Nothing is created on disk; whatever the remuxer writes there is
    /// removed when the guard drops.
    pub fn remux_output(&self) -> std::io::Result<TempPath> {
        let mut path: OsString = self.path.as_os_str().to_owned();
        path.push(REMUX_SUFFIX);
        TempPath::try_from_path(PathBuf::from(path))
    }
}

/// Directory where uploads are staged.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stream `reader` into a new staged file, stopping as soon as more than
    /// `max_bytes` have been read.
    pub async fn stage<R>(&self, mut reader: R, max_bytes: u64) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead + Unpin,
    {
        tokio::fs::create_dir_all(&self.dir).await?;

        let (file, path) = tempfile::Builder::new()
            .prefix("tubely-upload-")
            .suffix(".mp4")
            .tempfile_in(&self.dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut size: u64 = 0;
        loop {
            let n = reader.read(&mut buf).await.map_err(StagingError::Read)?;
            if n == 0 {
                break;
            }
            size += n as u64;
            if size > max_bytes {
                // `path` drops here and takes the partial file with it
                return Err(ValidationError::BodyTooLarge { max: max_bytes }.into());
            }
            file.write_all(&buf[..n]).await?;
        }

        if size == 0 {
            return Err(ValidationError::EmptyFile.into());
        }

        file.flush().await?;
        file.sync_all().await?;

        tracing::debug!(path = %path.display(), size_bytes = size, "Upload staged");

        Ok(StagedFile { path, size })
    }
}
