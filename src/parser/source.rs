//! Content source abstraction for reading model views.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Trait for abstracting file I/O so the reader can run against the
/// filesystem or an in-memory set of files.
pub trait ContentSource {
    /// Read a file at the given path and return its content as a string.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
    /// List the regular files directly inside `path`, returning full paths.
    fn list_dir(&mut self, path: &Utf8Path) -> Result<Vec<Utf8PathBuf>>;
}

/// Reads files directly from the local filesystem.
pub struct FsSource;

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path.as_std_path()).with_context(|| format!("Failed to read {}", path))
    }

    fn list_dir(&mut self, path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(path.as_std_path())
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // A dangling link inside the folder does not spoil the listing.
                Err(err) if err.depth() > 0 => {
                    warn!(dir = %path, error = %err, "skipping unreadable directory entry");
                    continue;
                }
                Err(err) => return Err(err).with_context(|| format!("Read dir {}", path)),
            };
            // Links count by their target.
            if entry.file_type().is_file() {
                let p = Utf8PathBuf::from_path_buf(entry.into_path())
                    .map_err(|p| anyhow!("Non-UTF8 path {} in {}", p.display(), path))?;
                files.push(p);
            }
        }
        Ok(files)
    }
}
