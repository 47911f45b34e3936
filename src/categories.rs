/// Extension-to-category mapping for organizing files.
///
/// This module maps file extensions (lowercase, with leading dot) to the
/// destination folder label used when organizing a directory. Lookups are
/// total: anything not in the table resolves to the fallback label.
///
/// # Examples
///
/// ```
/// use downsort::categories::CategoryMap;
///
/// let map = CategoryMap::default();
/// assert_eq!(map.resolve(".pdf"), "Documents");
/// assert_eq!(map.resolve(".JPG"), "Images");
/// assert_eq!(map.resolve(".xyz"), "Others");
/// ```
use std::collections::HashMap;

/// The built-in extension table, grouped by category label.
///
/// Labels repeat across groups freely (many extensions, one label); keys are
/// unique after normalization. Configuration can extend or override any entry.
const STANDARD_TABLE: &[(&str, &[&str])] = &[
    (
        "Documents",
        &[
            ".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".md", ".pages", ".tex",
        ],
    ),
    (
        "Images",
        &[
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".svg", ".webp", ".heic",
            ".ico",
        ],
    ),
    (
        "Audio",
        &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a", ".wma", ".aiff"],
    ),
    (
        "Videos",
        &[".mp4", ".mkv", ".avi", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".mpg"],
    ),
    (
        "Archives",
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".iso"],
    ),
    (
        "Apps",
        &[".app", ".pkg", ".dmg", ".exe", ".msi", ".deb", ".rpm", ".appimage"],
    ),
    (
        "Code",
        &[
            ".py", ".js", ".ts", ".rs", ".go", ".java", ".c", ".cpp", ".h", ".sh", ".rb", ".json",
            ".xml", ".yaml", ".yml", ".toml", ".html", ".css", ".sql",
        ],
    ),
    (
        "Spreadsheets",
        &[".csv", ".xls", ".xlsx", ".ods", ".numbers"],
    ),
    ("Presentations", &[".ppt", ".pptx", ".odp", ".key"]),
    ("Fonts", &[".ttf", ".otf", ".woff", ".woff2"]),
];

/// Label used for extensions with no registered category.
pub const FALLBACK_LABEL: &str = "Others";

/// Label used for entries that have no extension at all.
pub const NO_EXTENSION_LABEL: &str = "NoExtension";

/// Maps file extensions to category labels.
///
/// Keys are normalized to lowercase with a leading dot, so lookups are
/// case-insensitive and tolerant of inputs with or without the dot.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    map: HashMap<String, String>,
    fallback: String,
    no_extension: String,
}

impl CategoryMap {
    /// Creates a map holding the standard extension table.
    pub fn new() -> Self {
        let mut map = HashMap::new();
        for (label, extensions) in STANDARD_TABLE {
            for ext in *extensions {
                map.insert((*ext).to_string(), (*label).to_string());
            }
        }
        Self {
            map,
            fallback: FALLBACK_LABEL.to_string(),
            no_extension: NO_EXTENSION_LABEL.to_string(),
        }
    }

    /// Returns the category label registered for `extension`, or the fallback
    /// label if the extension is unknown.
    ///
    /// Never fails: the lookup is a pure total function over any input.
    ///
    /// # Examples
    ///
    /// ```
    /// use downsort::categories::CategoryMap;
    ///
    /// let map = CategoryMap::default();
    /// assert_eq!(map.resolve(".tar"), "Archives");
    /// assert_eq!(map.resolve("PKG"), "Apps");
    /// assert_eq!(map.resolve(".whatever"), map.fallback());
    /// ```
    pub fn resolve(&self, extension: &str) -> &str {
        self.map
            .get(&Self::normalize(extension))
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Registers or overrides a single extension mapping.
    pub fn insert(&mut self, extension: &str, label: &str) {
        self.map.insert(Self::normalize(extension), label.to_string());
    }

    /// The label returned for unregistered extensions.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// The label assigned to entries without an extension.
    pub fn no_extension(&self) -> &str {
        &self.no_extension
    }

    /// Replaces the fallback label.
    pub fn set_fallback(&mut self, label: &str) {
        self.fallback = label.to_string();
    }

    /// Replaces the no-extension label.
    pub fn set_no_extension(&mut self, label: &str) {
        self.no_extension = label.to_string();
    }

    /// Lowercases and dot-prefixes an extension so `.PDF`, `pdf` and `.pdf`
    /// all address the same key.
    fn normalize(extension: &str) -> String {
        let ext = extension.to_lowercase();
        if ext.starts_with('.') {
            ext
        } else {
            format!(".{ext}")
        }
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new()
    }
}
