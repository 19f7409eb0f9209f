use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no page named {0:?}")]
    Missing(String),
    #[error("reading page {name:?}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },
    #[error("html manipulation failed: {0}")]
    Html(String),
}

/// Source of install-page HTML, keyed by page name.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn load(&self, name: &str) -> Result<String, PageError>;
}

/// Store that reads `{name}.html` under a fixed root directory.
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.html"))
    }
}

#[async_trait]
impl PageStore for FsPageStore {
    async fn load(&self, name: &str) -> Result<String, PageError> {
        let path = self.path_for(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(html),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(?path, "page file not found");
                Err(PageError::Missing(name.to_string()))
            }
            Err(err) => Err(PageError::Io {
                name: name.to_string(),
                source: err,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_existing_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<html></html>").expect("write");
        let store = FsPageStore::new(dir.path().to_path_buf());
        let html = store.load("index").await.expect("load");
        assert_eq!(html, "<html></html>");
    }

    #[tokio::test]
    async fn missing_page_is_distinguished_from_io_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsPageStore::new(dir.path().to_path_buf());
        match store.load("nope").await {
            Err(PageError::Missing(name)) => assert_eq!(name, "nope"),
            other => panic!("expected Missing, got {other:?}"),
        }
    }
}
