use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A preference blob kept in the local settings directory, one file per
/// admin and kind.
pub trait Preference: Serialize + DeserializeOwned + Default {
    const KIND: &'static str;

    fn stamp(&mut self, updated_at: String);
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SystemSettings {
    pub language: String,
    pub timezone: String,
    pub date_format: String,
    pub currency: String,
    pub dark_mode: bool,
    pub updated_at: Option<String>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
            date_format: "DD/MM/YYYY".to_string(),
            currency: "VND".to_string(),
            dark_mode: false,
            updated_at: None,
        }
    }
}

impl Preference for SystemSettings {
    const KIND: &'static str = "system";

    fn stamp(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmailNotifications {
    pub new_booking: bool,
    pub new_user: bool,
    pub new_review: bool,
    pub system_alerts: bool,
}

impl Default for EmailNotifications {
    fn default() -> Self {
        Self {
            new_booking: true,
            new_user: true,
            new_review: true,
            system_alerts: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardNotifications {
    pub show_alerts: bool,
    pub sound: String,
}

impl Default for DashboardNotifications {
    fn default() -> Self {
        Self {
            show_alerts: true,
            sound: "default".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_notifications: EmailNotifications,
    pub dashboard_notifications: DashboardNotifications,
    pub updated_at: Option<String>,
}

impl Preference for NotificationSettings {
    const KIND: &'static str = "notifications";

    fn stamp(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BackupSchedule {
    pub enabled: bool,
    pub frequency: String,
    pub time: String,
    pub retention: String,
    pub updated_at: Option<String>,
}

impl Default for BackupSchedule {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: "daily".to_string(),
            time: "02:00".to_string(),
            retention: "30".to_string(),
            updated_at: None,
        }
    }
}

impl Preference for BackupSchedule {
    const KIND: &'static str = "backup";

    fn stamp(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SecuritySettings {
    pub two_factor_enabled: bool,
    pub updated_at: Option<String>,
}

impl Preference for SecuritySettings {
    const KIND: &'static str = "security";

    fn stamp(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct BackupRequest {
    pub backup_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupData {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupFile {
    #[serde(rename = "type")]
    pub backup_type: String,
    pub timestamp: String,
    pub data: BackupData,
}
