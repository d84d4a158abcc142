use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {source_name}: {message}")]
    Fetch {
        source_name: String,
        message: String,
    },
}

/// Produces the raw payload of one feed. Parsers only ever see the returned text.
pub trait FeedSource: Send + Sync {
    fn name(&self) -> String;
    fn fetch(&self) -> Result<String, SourceError>;
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// An in-memory payload.
#[derive(Debug, Clone)]
pub struct StringSource {
    name: String,
    payload: String,
}

impl StringSource {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

impl FeedSource for StringSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn fetch(&self) -> Result<String, SourceError> {
        Ok(self.payload.clone())
    }
}
