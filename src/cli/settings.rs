use anyhow::{anyhow, Result};
use clap::Subcommand;

use super::display::Table;
use super::ui::status;
use crate::config::{validate_setting, SETTING_KEYS, SETTING_TOKEN};
use crate::db::{Database, LocalStore, StoreExt};

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show stored settings
    Show,
    /// Store a setting
    Set { key: String, value: String },
    /// Remove a stored setting
    Clear { key: String },
    /// Every key in the local store and when it was written
    Keys,
}

pub fn run(command: SettingsCommand, db: &Database) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let mut table = Table::new(&["setting", "value"]);
            for (key, value) in settings(db)? {
                table.row(vec![key.to_string(), value.unwrap_or_else(|| "-".to_string())]);
            }
            table.print();
            Ok(())
        }
        SettingsCommand::Set { key, value } => {
            set(db, &key, &value)?;
            status(&format!("Saved {}.", key));
            Ok(())
        }
        SettingsCommand::Clear { key } => {
            if !SETTING_KEYS.contains(&key.as_str()) {
                return Err(anyhow!("Unknown setting '{}'. Known: {}", key, SETTING_KEYS.join(", ")));
            }
            db.remove(&key)?;
            status(&format!("Cleared {}.", key));
            Ok(())
        }
        SettingsCommand::Keys => {
            let mut table = Table::new(&["key", "updated"]);
            for (key, updated) in db.keys()? {
                table.row(vec![key, updated.unwrap_or_default()]);
            }
            table.print();
            Ok(())
        }
    }
}

/// Stored values for every known setting, with the token masked
pub fn settings(store: &dyn LocalStore) -> Result<Vec<(&'static str, Option<String>)>> {
    SETTING_KEYS
        .iter()
        .map(|&key| -> Result<(&'static str, Option<String>)> {
            let value = store.get_scalar(key)?;
            let shown = if key == SETTING_TOKEN { value.map(|v| mask(&v)) } else { value };
            Ok((key, shown))
        })
        .collect()
}

pub fn set(store: &dyn LocalStore, key: &str, value: &str) -> Result<()> {
    validate_setting(key, value).map_err(|e| anyhow!("Cannot set {}: {}", key, e))?;
    store.set_scalar(key, value.trim())?;
    Ok(())
}

fn mask(secret: &str) -> String {
    let tail: String = secret.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HrConfig;
    use crate::db::MemoryStore;

    #[test]
    fn test_set_and_show() {
        let store = MemoryStore::new();
        set(&store, "pageSize", " 25 ").unwrap();
        set(&store, "token", "secret-abcd1234").unwrap();
        set(&store, "apiUrl", "https://hr.example.com/api/").unwrap();

        let shown = settings(&store).unwrap();
        let get = |k: &str| shown.iter().find(|(key, _)| *key == k).unwrap().1.clone();
        assert_eq!(get("pageSize").as_deref(), Some("25"));
        assert_eq!(get("token").as_deref(), Some("****1234"));
        assert_eq!(get("theme"), None);

        let config = HrConfig::load_with(&store, |_| None).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.api_url.as_deref(), Some("https://hr.example.com/api"));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let store = MemoryStore::new();
        assert!(set(&store, "pageSize", "0").is_err());
        assert!(set(&store, "workStart", "nine").is_err());
        assert!(set(&store, "apiUrl", "hr.example.com").is_err());
        assert!(set(&store, "colour", "blue").is_err());
        assert_eq!(store.read("pageSize").unwrap(), None);
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("token-9876"), "****9876");
    }
}
