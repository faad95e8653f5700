use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// A handle to binary content of known size and MIME type, as handed over by an upload form.
#[async_trait]
pub trait Blob: Send + Sync {
    fn name(&self) -> &str;
    fn mime_type(&self) -> &str;
    fn size(&self) -> u64;
    /// Milliseconds since the Unix epoch
    fn last_modified(&self) -> i64;
    async fn read(&self) -> Result<Bytes, std::io::Error>;
}

/// Content that is already in memory.
#[derive(Debug, Clone)]
pub struct MemoryBlob {
    name: String,
    mime_type: String,
    data: Bytes,
    last_modified: i64,
}

impl MemoryBlob {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
            last_modified: Utc::now().timestamp_millis(),
        }
    }

    pub fn with_last_modified(mut self, last_modified: i64) -> Self {
        self.last_modified = last_modified;
        self
    }
}

#[async_trait]
impl Blob for MemoryBlob {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    async fn read(&self) -> Result<Bytes, std::io::Error> {
        Ok(self.data.clone())
    }
}

/// A file on the local filesystem. Metadata is captured at open time, content at read time.
#[derive(Debug, Clone)]
pub struct FileBlob {
    path: PathBuf,
    name: String,
    mime_type: String,
    size: u64,
    last_modified: i64,
}

impl FileBlob {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Unknown extensions get an empty type, same as a browser File
        let mime_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or("")
            .to_string();

        let last_modified = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
            .unwrap_or_else(|_| Utc::now().timestamp_millis());

        Ok(Self {
            path,
            name,
            mime_type,
            size: metadata.len(),
            last_modified,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Blob for FileBlob {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    async fn read(&self) -> Result<Bytes, std::io::Error> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(Bytes::from(data))
    }
}

#[async_trait]
impl<T: Blob + ?Sized> Blob for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn mime_type(&self) -> &str {
        (**self).mime_type()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn last_modified(&self) -> i64 {
        (**self).last_modified()
    }

    async fn read(&self) -> Result<Bytes, std::io::Error> {
        (**self).read().await
    }
}
