use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "dazi";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn preferences_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("preferences.json"))
            .unwrap_or_else(|| PathBuf::from(".dazi").join("preferences.json"))
    }

    pub fn history_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_dir().join("history.csv"))
            .unwrap_or_else(|| PathBuf::from(".dazi").join("history.csv"))
    }

    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
                .join("dazi.log")
        } else {
            Self::project()
                .map(|pd| pd.data_local_dir().join("dazi.log"))
                .unwrap_or_else(|| PathBuf::from(".dazi").join("dazi.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_have_expected_file_names() {
        assert!(AppDirs::preferences_path().ends_with("preferences.json"));
        assert!(AppDirs::history_path().ends_with("history.csv"));
        assert!(AppDirs::log_path().ends_with("dazi.log"));
    }
}
