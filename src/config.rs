//! Runtime settings.
//!
//! Settings live as plain string scalars in the local store. Environment
//! variables take precedence over stored values.

use chrono::NaiveTime;
use std::env;
use std::path::PathBuf;

use crate::db::{Database, LocalStore, StoreError, StoreExt};

// Store keys for settings scalars
pub const SETTING_THEME: &str = "theme";
pub const SETTING_TOKEN: &str = "token";
pub const SETTING_USER_NAME: &str = "userName";
pub const SETTING_USER_ROLE: &str = "userRole";
pub const SETTING_API_URL: &str = "apiUrl";
pub const SETTING_PAGE_SIZE: &str = "pageSize";
pub const SETTING_WORK_START: &str = "workStart";

/// Keys the settings command may show, set or clear
pub const SETTING_KEYS: &[&str] = &[
    SETTING_THEME,
    SETTING_TOKEN,
    SETTING_USER_NAME,
    SETTING_USER_ROLE,
    SETTING_API_URL,
    SETTING_PAGE_SIZE,
    SETTING_WORK_START,
];

const ENV_API_URL: &str = "HRBOARD_API_URL";
const ENV_API_TOKEN: &str = "HRBOARD_API_TOKEN";
const ENV_PAGE_SIZE: &str = "HRBOARD_PAGE_SIZE";
const ENV_DB: &str = "HRBOARD_DB";

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HrConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub page_size: usize,
    /// Check-ins after this time count as late
    pub work_start: NaiveTime,
    pub theme: Option<String>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
}

impl Default for HrConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            work_start: default_work_start(),
            theme: None,
            user_name: None,
            user_role: None,
        }
    }
}

fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl HrConfig {
    /// Load configuration from environment variables and stored settings.
    pub fn load(store: &dyn LocalStore) -> Result<Self, StoreError> {
        Self::load_with(store, |name| env::var(name).ok())
    }

    /// Same as `load` with an explicit environment lookup
    pub fn load_with<E>(store: &dyn LocalStore, env: E) -> Result<Self, StoreError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let from_env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let api_url = match from_env(ENV_API_URL) {
            Some(url) => Some(url),
            None => store.get_scalar(SETTING_API_URL)?,
        }
        .map(|url| url.trim().trim_end_matches('/').to_string());

        let api_token = match from_env(ENV_API_TOKEN) {
            Some(token) => Some(token),
            None => store.get_scalar(SETTING_TOKEN)?,
        };

        let page_size = match from_env(ENV_PAGE_SIZE) {
            Some(size) => Some(size),
            None => store.get_scalar(SETTING_PAGE_SIZE)?,
        }
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);

        let work_start = store
            .get_scalar(SETTING_WORK_START)?
            .and_then(|s| parse_time(&s))
            .unwrap_or_else(default_work_start);

        Ok(Self {
            api_url,
            api_token,
            page_size,
            work_start,
            theme: store.get_scalar(SETTING_THEME)?,
            user_name: store.get_scalar(SETTING_USER_NAME)?,
            user_role: store.get_scalar(SETTING_USER_ROLE)?,
        })
    }

    pub fn has_remote(&self) -> bool {
        self.api_url.is_some()
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Database path: the `--db` flag, then `HRBOARD_DB`, then the per-user default
pub fn database_path(flag: Option<PathBuf>) -> Result<PathBuf, StoreError> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(path) = env::var_os(ENV_DB).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Database::default_path()
}

/// Check a value before it is written as a setting
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        SETTING_PAGE_SIZE => match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("page size must be a positive whole number".to_string()),
        },
        SETTING_WORK_START => parse_time(value)
            .map(|_| ())
            .ok_or_else(|| "work start must look like 09:00".to_string()),
        SETTING_API_URL => {
            let v = value.trim();
            if v.starts_with("http://") || v.starts_with("https://") {
                Ok(())
            } else {
                Err("API URL must start with http:// or https://".to_string())
            }
        }
        k if SETTING_KEYS.contains(&k) => Ok(()),
        other => Err(format!("unknown setting '{}'", other)),
    }
}
