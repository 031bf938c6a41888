use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::models::settings::Preference;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Per-admin UI preferences kept on local disk. Nothing here is written to
/// the document store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    root: PathBuf,
}

impl SettingsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for<P: Preference>(&self, admin_id: &str) -> PathBuf {
        self.root.join(admin_id).join(format!("{}.json", P::KIND))
    }

    /// Unset preferences read as their defaults.
    pub async fn load<P: Preference>(&self, admin_id: &str) -> Result<P, SettingsError> {
        match tokio::fs::read(self.path_for::<P>(admin_id)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(P::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save<P: Preference>(&self, admin_id: &str, mut value: P) -> Result<P, SettingsError> {
        value.stamp(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        let path = self.path_for::<P>(admin_id);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        write_atomically(&path, &serde_json::to_vec_pretty(&value)?).await?;

        log::info!("Saved {} settings for admin {}", P::KIND, admin_id);
        Ok(value)
    }
}

async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{BackupSchedule, NotificationSettings, SystemSettings};

    fn temp_store() -> SettingsStore {
        let dir = std::env::temp_dir().join(format!("travel-admin-settings-{}", uuid::Uuid::new_v4()));
        SettingsStore::new(dir)
    }

    #[actix_rt::test]
    async fn test_missing_settings_read_as_defaults() {
        let store = temp_store();
        let settings: SystemSettings = store.load("admin-1").await.unwrap();
        assert_eq!(settings, SystemSettings::default());
        assert!(settings.updated_at.is_none());
    }

    #[actix_rt::test]
    async fn test_saved_settings_are_stamped_and_reloaded() {
        let store = temp_store();
        let mut settings = SystemSettings::default();
        settings.dark_mode = true;
        settings.language = "vi".to_string();

        let saved = store.save("admin-1", settings).await.unwrap();
        assert!(saved.updated_at.is_some());

        let loaded: SystemSettings = store.load("admin-1").await.unwrap();
        assert_eq!(loaded, saved);

        // Other kinds and other admins are unaffected.
        let backup: BackupSchedule = store.load("admin-1").await.unwrap();
        assert_eq!(backup, BackupSchedule::default());
        let other: SystemSettings = store.load("admin-2").await.unwrap();
        assert!(!other.dark_mode);
    }

    #[actix_rt::test]
    async fn test_corrupt_file_is_reported() {
        let store = temp_store();
        let path = store.path_for::<NotificationSettings>("admin-1");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"not json").await.unwrap();

        let result: Result<NotificationSettings, _> = store.load("admin-1").await;
        assert!(matches!(result, Err(SettingsError::Format(_))));
    }
}
