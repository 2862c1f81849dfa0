use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced to callers of the model reader.
///
/// Broken hrefs and unreadable or malformed views are not errors: they only
/// shorten the resulting trees.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The requested file is not part of the indexed model folder.
    #[error("model view `{file}` is not part of the indexed folder")]
    NotIndexed { file: String },

    #[error("cannot read reader options from {path}")]
    ConfigRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reader options in {path}")]
    ConfigFormat {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
