use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Route prefix under which stored audio is served.
pub const AUDIO_ROUTE: &str = "/audio";

/// How often the retention sweep runs, at most.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Writes generated scene narration to disk so it can be served back.
#[derive(Debug, Clone)]
pub struct AudioStore {
    root: PathBuf,
}

impl AudioStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save one scene's audio and return the URL path it is served under.
    pub async fn save_scene(
        &self,
        story_id: &str,
        scene_number: u32,
        audio: &[u8],
    ) -> std::io::Result<String> {
        let dir = self.root.join(story_id);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("scene_{}.mp3", scene_number);
        tokio::fs::write(dir.join(&file_name), audio).await?;

        Ok(format!("{}/{}/{}", AUDIO_ROUTE, story_id, file_name))
    }

    /// Delete story directories last modified at least `max_age` ago.
    ///
    /// Returns how many were removed. A missing root counts as empty.
    pub async fn sweep(&self, max_age: Duration) -> std::io::Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_dir() {
                continue;
            }
            // mtimes in the future read as age zero
            let age = metadata.modified()?.elapsed().unwrap_or_default();
            if age >= max_age {
                tokio::fs::remove_dir_all(entry.path()).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Run `sweep` in the background for the life of the process.
    pub fn spawn_sweeper(self, max_age: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let period = max_age.clamp(Duration::from_secs(1), SWEEP_INTERVAL);
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match self.sweep(max_age).await {
                    Ok(0) => {}
                    Ok(removed) => {
                        tracing::info!("Removed {} expired story audio directories", removed)
                    }
                    Err(e) => tracing::warn!("Audio retention sweep failed: {}", e),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_under_story_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = AudioStore::new(dir.path().to_path_buf());

        let url = store.save_scene("story-1", 2, b"ID3data").await.unwrap();

        assert_eq!(url, "/audio/story-1/scene_2.mp3");
        let written = std::fs::read(dir.path().join("story-1").join("scene_2.mp3")).unwrap();
        assert_eq!(written, b"ID3data");
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_stories() {
        let dir = tempfile::tempdir().unwrap();
        let store = AudioStore::new(dir.path().to_path_buf());
        store.save_scene("old", 1, b"ID3").await.unwrap();
        store.save_scene("new", 1, b"ID3").await.unwrap();

        assert_eq!(store.sweep(Duration::from_secs(3600)).await.unwrap(), 0);
        assert!(dir.path().join("old").exists());

        assert_eq!(store.sweep(Duration::ZERO).await.unwrap(), 2);
        assert!(!dir.path().join("old").exists());
        assert!(!dir.path().join("new").exists());
    }

    #[tokio::test]
    async fn sweep_skips_loose_files_and_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"keep").unwrap();
        let store = AudioStore::new(dir.path().to_path_buf());
        assert_eq!(store.sweep(Duration::ZERO).await.unwrap(), 0);
        assert!(dir.path().join("README").exists());

        let missing = AudioStore::new(dir.path().join("never-created"));
        assert_eq!(missing.sweep(Duration::ZERO).await.unwrap(), 0);
    }
}
