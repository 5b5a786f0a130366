use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AssetConfig;

static ASSET_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^tts_[0-9a-f]{32}\.mp3$").expect("asset name pattern is valid")
});

/// A generated speech file served from the static directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Owns the `tts_*.mp3` files in the static directory and deletes them
/// once they are older than `max_age` or push the count over `max_files`.
#[derive(Debug)]
pub struct AudioAssetStore {
    dir: PathBuf,
    url_prefix: String,
    max_age: chrono::Duration,
    max_files: usize,
    assets: Mutex<VecDeque<AudioAsset>>,
}

impl AudioAssetStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str, config: &AssetConfig) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_age: chrono::Duration::from_std(config.max_age())
                .unwrap_or_else(|_| chrono::Duration::days(365)),
            max_files: config.max_files,
            assets: Mutex::new(VecDeque::new()),
        }
    }

    pub fn is_asset_name(name: &str) -> bool {
        ASSET_NAME.is_match(name)
    }

    /// Write `audio` under a fresh random name.
    pub async fn store(&self, audio: &[u8]) -> io::Result<AudioAsset> {
        let file_name = format!("tts_{}.mp3", Uuid::new_v4().as_simple());
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, audio).await?;

        let asset = AudioAsset {
            url: format!("{}/{}", self.url_prefix, file_name),
            file_name,
            path,
            created_at: Utc::now(),
        };
        debug!("Stored speech asset {} ({} bytes)", asset.file_name, audio.len());

        let overflow = {
            let mut assets = self.assets.lock().await;
            assets.push_back(asset.clone());
            self.drain_overflow(&mut assets)
        };
        remove_files(overflow).await;

        Ok(asset)
    }

    /// Take ownership of speech files left by a previous run.
    pub async fn adopt_existing(&self) -> io::Result<usize> {
        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !Self::is_asset_name(&file_name) {
                continue;
            }
            let created_at = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            found.push(AudioAsset {
                url: format!("{}/{}", self.url_prefix, file_name),
                path: entry.path(),
                file_name,
                created_at,
            });
        }
        found.sort_by_key(|a| a.created_at);

        let adopted = found.len();
        let mut assets = self.assets.lock().await;
        for asset in found {
            if !assets.iter().any(|a| a.file_name == asset.file_name) {
                assets.push_back(asset);
            }
        }
        assets.make_contiguous().sort_by_key(|a| a.created_at);
        if adopted > 0 {
            info!("Adopted {} existing speech assets in {:?}", adopted, self.dir);
        }
        Ok(adopted)
    }

    /// Delete expired assets and any beyond the count limit, oldest first.
    pub async fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let victims = {
            let mut assets = self.assets.lock().await;
            let mut victims = Vec::new();
            while let Some(oldest) = assets.front() {
                if now - oldest.created_at > self.max_age {
                    victims.extend(assets.pop_front());
                } else {
                    break;
                }
            }
            victims.extend(self.drain_overflow(&mut assets));
            victims
        };
        let evicted = victims.len();
        remove_files(victims).await;
        if evicted > 0 {
            debug!("Evicted {} speech assets", evicted);
        }
        evicted
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.assets.lock().await.len()
    }

    fn drain_overflow(&self, assets: &mut VecDeque<AudioAsset>) -> Vec<AudioAsset> {
        if self.max_files == 0 || assets.len() <= self.max_files {
            return Vec::new();
        }
        let excess = assets.len() - self.max_files;
        assets.drain(..excess).collect()
    }
}

async fn remove_files(assets: Vec<AudioAsset>) {
    for asset in assets {
        match tokio::fs::remove_file(&asset.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove speech asset {:?}: {}", asset.path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn store_in(dir: &Path, max_age_secs: u64, max_files: usize) -> AudioAssetStore {
        let config = AssetConfig {
            max_age_secs,
            max_files,
            sweep_interval_secs: 60,
        };
        AudioAssetStore::new(dir, "/static/", &config)
    }

    #[tokio::test]
    async fn each_store_gets_a_distinct_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 600, 0);

        let a = store.store(b"ID3a").await.unwrap();
        let b = store.store(b"ID3b").await.unwrap();

        assert_ne!(a.url, b.url);
        assert!(a.url.starts_with("/static/tts_"));
        assert!(a.url.ends_with(".mp3"));
        assert!(AudioAssetStore::is_asset_name(&a.file_name));
        assert_eq!(std::fs::read(&b.path).unwrap(), b"ID3b");
    }

    #[tokio::test]
    async fn expired_assets_are_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 60, 0);
        let asset = store.store(b"ID3").await.unwrap();

        assert_eq!(store.evict_expired(Utc::now()).await, 0);
        assert!(asset.path.exists());

        let later = Utc::now() + chrono::Duration::seconds(120);
        assert_eq!(store.evict_expired(later).await, 1);
        assert!(!asset.path.exists());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn count_limit_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 600, 2);
        let first = store.store(b"1").await.unwrap();
        let second = store.store(b"2").await.unwrap();
        let third = store.store(b"3").await.unwrap();

        assert!(!first.path.exists());
        assert!(second.path.exists() && third.path.exists());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn adopts_leftovers_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let leftover = dir.path().join(format!("tts_{}.mp3", Uuid::new_v4().as_simple()));
        std::fs::write(&leftover, b"old").unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();

        let store = store_in(dir.path(), 60, 0);
        assert_eq!(store.adopt_existing().await.unwrap(), 1);

        let later = Utc::now() + chrono::Duration::seconds(120);
        assert_eq!(store.evict_expired(later).await, 1);
        assert!(!leftover.exists());
        assert!(dir.path().join("style.css").exists());
    }

    #[test]
    fn asset_name_pattern() {
        assert!(AudioAssetStore::is_asset_name("tts_0123456789abcdef0123456789abcdef.mp3"));
        assert!(!AudioAssetStore::is_asset_name("tts_../../etc.mp3"));
        assert!(!AudioAssetStore::is_asset_name("index.html"));
    }
}
