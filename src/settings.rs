//! User preferences store.
//!
//! Five named settings persisted as a flat JSON object, separate from the
//! task store. Values are stored only when explicitly set; readers apply the
//! documented defaults for absent entries, so clearing everything returns
//! each setting to its default on the next read.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Persisted user preferences. All entries optional on disk.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_theme: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_backup_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_minute: Option<u32>,
}

impl Settings {
    /// Load settings from a JSON file, using defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Settings::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Error parsing settings, using defaults: {e}");
                    Settings::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading settings, using defaults: {e}");
                Settings::default()
            }
        }
    }

    /// Save settings to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).unwrap();
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Dark theme preference. Default: false.
    pub fn dark_theme(&self) -> bool {
        self.dark_theme.unwrap_or(false)
    }

    /// Whether reminder notifications are enabled. Default: true.
    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled.unwrap_or(true)
    }

    /// Whether cloud backup is enabled. Default: false.
    pub fn cloud_backup_enabled(&self) -> bool {
        self.cloud_backup_enabled.unwrap_or(false)
    }

    /// Daily notification time as (hour, minute). Default: 09:00.
    pub fn notification_time(&self) -> (u32, u32) {
        (self.notification_hour.unwrap_or(9), self.notification_minute.unwrap_or(0))
    }

    /// Set the notification time. Rejects out-of-range components.
    pub fn set_notification_time(&mut self, hour: u32, minute: u32) -> Result<(), String> {
        if hour > 23 {
            return Err(format!("Hour must be 0-23, got {hour}"));
        }
        if minute > 59 {
            return Err(format!("Minute must be 0-59, got {minute}"));
        }
        self.notification_hour = Some(hour);
        self.notification_minute = Some(minute);
        Ok(())
    }

    /// Reset every setting to absent, restoring defaults on the next read.
    pub fn clear(&mut self) {
        *self = Settings::default();
    }
}
