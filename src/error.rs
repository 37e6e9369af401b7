use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaziError>;

#[derive(Debug, Error)]
pub enum DaziError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("article not found: {folder}/{file_name}")]
    ArticleNotFound { folder: String, file_name: String },

    #[error("invalid article reference: {input} (expected Folder/NN_title.txt)")]
    InvalidArticleName { input: String },

    #[error("article is not valid UTF-8: {folder}/{file_name}")]
    InvalidUtf8 { folder: String, file_name: String },

    #[error("invalid timer: {input} (expected H:M:S, M:S or S)")]
    InvalidTimer { input: String },

    #[error("logging setup failed: {message}")]
    Logging { message: String },
}

impl DaziError {
    #[must_use]
    pub fn not_found(folder: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::ArticleNotFound {
            folder: folder.into(),
            file_name: file_name.into(),
        }
    }

    #[must_use]
    pub fn invalid_timer(input: impl Into<String>) -> Self {
        Self::InvalidTimer {
            input: input.into(),
        }
    }
}
