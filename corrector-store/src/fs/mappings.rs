use std::path::{Path, PathBuf};

use async_trait::async_trait;

use corrector_core::{parse_mapping_str, DocumentFormat, MappingConfig};

use crate::store::{is_valid_key, MappingStore, StoreError};

const EXTENSIONS: [(&str, DocumentFormat); 3] = [
    ("json", DocumentFormat::Json),
    ("yaml", DocumentFormat::Yaml),
    ("yml", DocumentFormat::Yaml),
];

/// Reads `<dir>/<key>.json|yaml|yml` on every lookup, so edits on disk are
/// picked up by the next call.
#[derive(Debug, Clone)]
pub struct FsMappingStore {
    dir: PathBuf,
}

impl FsMappingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl MappingStore for FsMappingStore {
    async fn find_mapping(&self, key: &str) -> Result<Option<MappingConfig>, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        for (ext, format) in EXTENSIONS {
            let path = self.dir.join(format!("{key}.{ext}"));
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            tracing::debug!(path = %path.display(), "loaded mapping document");
            let parsed = parse_mapping_str(&raw, format).map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })?;
            return Ok(Some(parsed.mapping));
        }

        Ok(None)
    }
}
