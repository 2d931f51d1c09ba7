use std::path::PathBuf;

/// Failure while loading startup data (journey dataset or experience config).
///
/// Runtime code never produces these; they only surface while reading files,
/// and the binary falls back to built-in data when they do.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{origin} failed validation: {reason}")]
    Invalid { origin: String, reason: String },
}

impl ContentError {
    pub(crate) fn invalid(origin: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            origin: origin.to_string(),
            reason: reason.into(),
        }
    }
}
