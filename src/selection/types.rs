use std::fs;
use std::path::{Path, PathBuf};

/// Longest label shown for a selection before it gets shortened.
pub const DISPLAY_NAME_MAX: usize = 35;
const DISPLAY_PREFIX: usize = 15;
const DISPLAY_SUFFIX: usize = 20;

/// A file picked by the user. Content is read lazily, at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
    /// `None` when the file could not be stat'ed at pick time.
    pub size: Option<u64>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size: Some(size),
        }
    }

    /// Never fails: a file that vanished still counts towards the batch and
    /// is reported when its upload tries to read it.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let size = match fs::metadata(path) {
            Ok(meta) => Some(meta.len()),
            Err(e) => {
                tracing::warn!("Cannot stat {}: {}", path.display(), e);
                None
            }
        };
        Self {
            name,
            path: path.to_path_buf(),
            size,
        }
    }

    /// MIME type sent with the multipart part, guessed from the extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }

    pub fn size_label(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        let Some(bytes) = self.size else {
            return "unknown size".to_string();
        };
        let mut size = bytes as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} B", bytes)
        } else {
            format!("{:.2} {}", size, UNITS[unit])
        }
    }
}

/// Ordered set of files chosen in one picker interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    pub fn new(files: Vec<SelectedFile>) -> Self {
        Self { files }
    }

    /// One entry per picked path, in pick order.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        let files = paths.iter().map(|path| SelectedFile::from_path(path)).collect();
        Self { files }
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Label for the whole selection, `None` when nothing is selected.
    pub fn display_name(&self) -> Option<String> {
        self.files
            .first()
            .map(|first| display_name(&first.name, self.files.len()))
    }
}

/// `"<first>"` or `"<first> + N file(s)"`, shortened to a 15-char head and a
/// 20-char tail when longer than [`DISPLAY_NAME_MAX`] characters.
pub fn display_name(first_name: &str, count: usize) -> String {
    let name = if count > 1 {
        format!("{} + {} file(s)", first_name, count - 1)
    } else {
        first_name.to_string()
    };

    let len = name.chars().count();
    if len <= DISPLAY_NAME_MAX {
        return name;
    }

    let head: String = name.chars().take(DISPLAY_PREFIX).collect();
    let tail: String = name.chars().skip(len - DISPLAY_SUFFIX).collect();
    format!("{}...{}", head, tail)
}
