//! `file-reader`: list or print local files matching a glob.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::AppError;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Options for `file-reader`.
#[derive(Debug, Clone)]
pub struct FileReaderOptions {
    pub path: PathBuf,
    pub pattern: String,
    /// Read file contents as well.
    pub verbose: bool,
}

impl Default for FileReaderOptions {
    fn default() -> Self {
        Self { path: PathBuf::from("."), pattern: "*".to_string(), verbose: false }
    }
}

/// A matched file.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
    /// `None` unless contents were requested; `Some(Err)` for unreadable text.
    pub content: Option<Result<String, String>>,
}

impl FileEntry {
    pub fn name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    pub fn extension(&self) -> String {
        self.path.extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_default()
    }

    pub fn parent(&self) -> String {
        self.path.parent().map(|p| p.display().to_string()).unwrap_or_default()
    }
}

/// Execute `file-reader`. Files come back sorted by path.
pub fn execute(options: &FileReaderOptions) -> Result<Vec<FileEntry>, AppError> {
    if !options.path.is_dir() {
        return Err(AppError::Validation(format!(
            "Directory '{}' does not exist or is not a directory",
            options.path.display()
        )));
    }

    // The directory is matched literally; only the user pattern is a glob.
    let base = glob::Pattern::escape(&options.path.to_string_lossy());
    let pattern = Path::new(&base).join(&options.pattern);
    let pattern = pattern.to_string_lossy();
    debug!(%pattern, "matching files");

    let paths = glob::glob(&pattern).map_err(|e| {
        AppError::Validation(format!("Invalid pattern '{}': {}", options.pattern, e))
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => warn!(path = %err.path().display(), "skipping unreadable entry: {}", err.error()),
        }
    }
    files.sort();

    files
        .into_iter()
        .map(|path| -> Result<FileEntry, AppError> {
            let size = fs::metadata(&path)?.len();
            let content = options.verbose.then(|| read_text(&path));
            Ok(FileEntry { path, size, content })
        })
        .collect()
}

fn read_text(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|_| "Binary file or encoding error".to_string())
}

/// Human-readable size: bytes as-is, larger units with one decimal.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, SIZE_UNITS[unit])
}
