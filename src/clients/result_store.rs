use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tokio::io::AsyncWriteExt;

use crate::clients::errors::Result;

/// Line-delimited file of links that grows across runs.
///
/// Existing lines are never rewritten. A link is appended only when no line of
/// the file (and no earlier link of the same batch) already holds it.
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ResultStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Read every stored link, trimmed. A missing file reads as empty.
    pub async fn read_links(&self) -> Result<Vec<String>> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!("No result file found in {:?}", self.path);
            return Ok(vec![]);
        }
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Ok(contents.lines().map(|l| l.trim().to_string()).collect())
    }

    /// Append the links not seen yet and return how many lines were written.
    pub async fn append_links(&self, links: &[String]) -> Result<usize> {
        let exists = tokio::fs::try_exists(&self.path).await?;
        let existing = if exists {
            info!("{:?} already exists! Appending to file...", self.path);
            tokio::fs::read_to_string(&self.path).await?
        } else {
            String::new()
        };

        let mut seen: HashSet<&str> = existing.lines().map(str::trim).collect();
        let mut buf = String::new();
        let mut written = 0;
        for link in links {
            let link = link.trim();
            if link.is_empty() || !seen.insert(link) {
                continue;
            }
            buf.push_str(link);
            buf.push('\n');
            written += 1;
        }

        if written == 0 {
            debug!("Nothing new to append to {:?}", self.path);
            return Ok(0);
        }

        // Keep the last stored line from merging with the first new one
        if !existing.is_empty() && !existing.ends_with('\n') {
            buf.insert(0, '\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        info!("Appended {written} links to {:?}", self.path);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_append_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = ResultStore::new(temp_dir.path().join("links.txt"));

        let written = store
            .append_links(&links(&["https://d/1", "https://d/2"]))
            .await
            .unwrap();

        assert_eq!(written, 2);
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents, "https://d/1\nhttps://d/2\n");
    }

    #[tokio::test]
    async fn test_append_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = ResultStore::new(temp_dir.path().join("links.txt"));
        let batch = links(&["https://d/1", "https://d/2", "https://d/3"]);

        assert_eq!(store.append_links(&batch).await.unwrap(), 3);
        assert_eq!(store.append_links(&batch).await.unwrap(), 0);

        assert_eq!(store.read_links().await.unwrap(), batch);
    }

    #[tokio::test]
    async fn test_append_keeps_existing_lines_and_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("links.txt");
        std::fs::write(&path, "https://d/old\n\nhttps://d/1  \n").unwrap();
        let store = ResultStore::new(&path);

        let written = store
            .append_links(&links(&["https://d/1", "https://d/new"]))
            .await
            .unwrap();

        assert_eq!(written, 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "https://d/old\n\nhttps://d/1  \nhttps://d/new\n");
    }

    #[tokio::test]
    async fn test_append_dedups_within_batch() {
        let temp_dir = TempDir::new().unwrap();
        let store = ResultStore::new(temp_dir.path().join("links.txt"));

        let written = store
            .append_links(&links(&["https://d/1", "https://d/1", "https://d/2"]))
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            store.read_links().await.unwrap(),
            links(&["https://d/1", "https://d/2"])
        );
    }

    #[tokio::test]
    async fn test_append_after_unterminated_last_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("links.txt");
        std::fs::write(&path, "https://d/old").unwrap();
        let store = ResultStore::new(&path);

        store.append_links(&links(&["https://d/new"])).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "https://d/old\nhttps://d/new\n");
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_create_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = ResultStore::new(temp_dir.path().join("links.txt"));

        assert_eq!(store.append_links(&[]).await.unwrap(), 0);
        assert!(!store.path().exists());
        assert!(store.read_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = ResultStore::new(temp_dir.path().join("nope").join("links.txt"));

        let result = store.append_links(&links(&["https://d/1"])).await;

        assert!(matches!(
            result,
            Err(crate::clients::errors::Error::StorageError(_))
        ));
    }
}
