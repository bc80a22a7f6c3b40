use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::AssetConfig;
use crate::error::{LingocrError, Result};
use crate::languages::ModelId;

/// Local cache of language model files, one `<id>.<ext>` file per model.
///
/// Writes go to a uniquely named `.part` file in the same directory and are
/// renamed into place only after the stream completed, so a reader never sees
/// a truncated model under its final name.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    extension: String,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(&config.cache_dir, &config.extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn path(&self, id: ModelId) -> PathBuf {
        self.root.join(format!("{}.{}", id, self.extension))
    }

    /// Present and non-empty. A zero-byte file counts as absent.
    pub async fn exists(&self, id: ModelId) -> bool {
        match fs::metadata(self.path(id)).await {
            Ok(meta) => meta.is_file() && meta.len() > 0,
            Err(_) => false,
        }
    }

    /// Stream `chunks` into the slot for `id`. Returns the number of bytes written.
    pub async fn write<S, B, E>(&self, id: ModelId, chunks: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        self.ensure_root().await?;

        let final_path = self.path(id);
        let tmp_path = self.root.join(format!(
            "{}.{}.{}.part",
            id,
            self.extension,
            uuid::Uuid::new_v4().simple()
        ));

        match self.write_tmp(&tmp_path, chunks).await {
            Ok(0) => {
                discard(&tmp_path).await;
                Err(LingocrError::Fetch(format!("empty body for model {id}")))
            }
            Ok(written) => {
                if let Err(e) = fs::rename(&tmp_path, &final_path).await {
                    discard(&tmp_path).await;
                    return Err(e.into());
                }
                debug!(model = %id, bytes = written, path = %final_path.display(), "Stored model");
                Ok(written)
            }
            Err(e) => {
                discard(&tmp_path).await;
                Err(e)
            }
        }
    }

    async fn write_tmp<S, B, E>(&self, tmp_path: &Path, mut chunks: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let mut file = fs::File::create(tmp_path).await?;
        let mut written = 0u64;

        while let Some(chunk) = chunks.next().await {
            let chunk =
                chunk.map_err(|e| LingocrError::Fetch(format!("download interrupted: {e}")))?;
            let bytes = chunk.as_ref();
            file.write_all(bytes).await?;
            written += bytes.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }

    /// Models currently usable from the cache, sorted by id.
    pub async fn list(&self) -> Result<Vec<ModelId>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let suffix = format!(".{}", self.extension);
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(code) = name.to_str().and_then(|n| n.strip_suffix(&suffix)) else {
                continue;
            };
            if let Some(id) = ModelId::from_code(code) {
                if self.exists(id).await {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), "Failed to remove partial download: {}", e);
        }
    }
}
