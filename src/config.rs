//! Organizer configuration.
//!
//! Loads the optional TOML configuration that overrides the built-in skip
//! rules and category table. Supported settings:
//! - Bundle extensions: directories with these extensions are moved as units
//! - Skip rules: exact filenames, glob patterns, regex patterns
//! - Category overrides: extra extension mappings and custom labels
//!
//! # Configuration File Format
//!
//! ```toml
//! [rules]
//! bundle_extensions = ["app", "pkg"]
//! skip_filenames = [".DS_Store", "desktop.ini", "Thumbs.db"]
//! skip_patterns = ["*.part"]
//! skip_regex = []
//!
//! [categories]
//! fallback = "Others"
//! no_extension = "NoExtension"
//!
//! [categories.map]
//! ".epub" = "Books"
//! ```

use crate::categories::{CategoryMap, FALLBACK_LABEL, NO_EXTENSION_LABEL};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern in the skip rules.
    InvalidSkipPattern(String),
    /// Invalid regex pattern in the skip rules, with the compiler's reason.
    InvalidSkipRegex {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// Why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidSkipPattern(pattern) => {
                write!(f, "Invalid skip glob pattern '{}'", pattern)
            }
            ConfigError::InvalidSkipRegex { pattern, reason } => {
                write!(f, "Invalid skip regex '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub rules: RuleSection,
    #[serde(default)]
    pub categories: CategorySection,
}

/// Skip rules and the bundle allowlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSection {
    /// Directory extensions treated as movable single units.
    #[serde(default = "default_bundle_extensions")]
    pub bundle_extensions: Vec<String>,

    /// Exact filenames that are never organized (OS metadata artifacts).
    #[serde(default = "default_skip_filenames")]
    pub skip_filenames: Vec<String>,

    /// Glob patterns for entries to leave untouched.
    #[serde(default)]
    pub skip_patterns: Vec<String>,

    /// Regex patterns for entries to leave untouched.
    #[serde(default)]
    pub skip_regex: Vec<String>,
}

/// Category table overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySection {
    /// Label for unregistered extensions.
    #[serde(default = "default_fallback_label")]
    pub fallback: String,

    /// Label for entries without an extension.
    #[serde(default = "default_no_extension_label")]
    pub no_extension: String,

    /// Extra extension mappings, merged over the built-in table.
    #[serde(default)]
    pub map: HashMap<String, String>,
}

fn default_bundle_extensions() -> Vec<String> {
    vec!["app".to_string(), "pkg".to_string()]
}

fn default_skip_filenames() -> Vec<String> {
    vec![
        ".DS_Store".to_string(),
        "desktop.ini".to_string(),
        "Thumbs.db".to_string(),
    ]
}

fn default_fallback_label() -> String {
    FALLBACK_LABEL.to_string()
}

fn default_no_extension_label() -> String {
    NO_EXTENSION_LABEL.to_string()
}

impl Default for RuleSection {
    fn default() -> Self {
        Self {
            bundle_extensions: default_bundle_extensions(),
            skip_filenames: default_skip_filenames(),
            skip_patterns: Vec::new(),
            skip_regex: Vec::new(),
        }
    }
}

impl Default for CategorySection {
    fn default() -> Self {
        Self {
            fallback: default_fallback_label(),
            no_extension: default_no_extension_label(),
            map: HashMap::new(),
        }
    }
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            rules: RuleSection::default(),
            categories: CategorySection::default(),
        }
    }
}

impl OrganizerConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Resolution order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. `.downsortrc.toml` in the current directory
    /// 3. `<config dir>/downsort/config.toml`
    /// 4. Built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error only when an existing file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".downsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("downsort").join("config.toml");
            if user_config.exists() {
                return Self::load_from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the configuration into the matcher structures consumed by the
    /// organizer: skip rules on one side, the category table on the other.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex skip pattern is invalid.
    pub fn compile(self) -> Result<(CompiledRules, CategoryMap), ConfigError> {
        let rules = CompiledRules::new(self.rules)?;

        let mut mapper = CategoryMap::new();
        mapper.set_fallback(&self.categories.fallback);
        mapper.set_no_extension(&self.categories.no_extension);
        for (extension, label) in &self.categories.map {
            mapper.insert(extension, label);
        }

        Ok((rules, mapper))
    }
}

/// Pre-compiled skip rules for efficient per-entry matching.
///
/// Glob and regex patterns are validated and compiled once at construction so
/// the run loop never reparses them.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    bundle_extensions: HashSet<String>,
    skip_filenames: HashSet<String>,
    skip_patterns: Vec<Pattern>,
    skip_regexes: Vec<Regex>,
}

impl CompiledRules {
    fn new(rules: RuleSection) -> Result<Self, ConfigError> {
        let skip_patterns = rules
            .skip_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidSkipPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let skip_regexes = rules
            .skip_regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidSkipRegex {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bundle_extensions: rules
                .bundle_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            skip_filenames: rules.skip_filenames.into_iter().collect(),
            skip_patterns,
            skip_regexes,
        })
    }

    /// True if the path carries a bundle extension (a directory with one is
    /// moved as a single unit instead of being skipped).
    pub fn is_bundle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.bundle_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// True if the filename is an exact-match skip entry.
    pub fn is_skip_name(&self, file_name: &str) -> bool {
        self.skip_filenames.contains(file_name)
    }

    /// True if the path matches any skip glob pattern.
    ///
    /// Patterns are tried against the bare filename as well as the full
    /// path, so `*.part` works on entries handed in with absolute paths.
    pub fn matches_skip_pattern(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.skip_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name) || pattern.matches_path(path))
    }

    /// True if the filename matches any skip regex.
    pub fn matches_skip_regex(&self, file_name: &str) -> bool {
        self.skip_regexes.iter().any(|regex| regex.is_match(file_name))
    }
}

impl Default for CompiledRules {
    fn default() -> Self {
        // Defaults carry no glob/regex patterns, so compilation cannot fail.
        Self {
            bundle_extensions: default_bundle_extensions().into_iter().collect(),
            skip_filenames: default_skip_filenames().into_iter().collect(),
            skip_patterns: Vec::new(),
            skip_regexes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_compiles() {
        let (rules, mapper) = OrganizerConfig::default().compile().unwrap();
        assert!(rules.is_skip_name(".DS_Store"));
        assert!(rules.is_skip_name("Thumbs.db"));
        assert_eq!(mapper.resolve(".pdf"), "Documents");
        assert_eq!(mapper.fallback(), "Others");
    }

    #[test]
    fn test_default_bundles() {
        let rules = CompiledRules::default();
        assert!(rules.is_bundle(Path::new("Installer.pkg")));
        assert!(rules.is_bundle(Path::new("Editor.APP")));
        assert!(!rules.is_bundle(Path::new("notes")));
        assert!(!rules.is_bundle(Path::new("archive.zip")));
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[rules]
bundle_extensions = ["app"]
skip_filenames = ["ignore.me"]
skip_patterns = ["*.part"]
skip_regex = ["^tmp_"]

[categories]
fallback = "Misc"
no_extension = "Plain"

[categories.map]
".epub" = "Books"
"#;
        let config: OrganizerConfig = toml::from_str(toml_str).unwrap();
        let (rules, mapper) = config.compile().unwrap();

        assert!(rules.is_bundle(Path::new("Editor.app")));
        assert!(!rules.is_bundle(Path::new("Installer.pkg")));
        assert!(rules.is_skip_name("ignore.me"));
        assert!(rules.matches_skip_pattern(Path::new("download.part")));
        assert!(rules.matches_skip_regex("tmp_1234"));
        assert!(!rules.matches_skip_regex("file_tmp_"));

        assert_eq!(mapper.resolve(".epub"), "Books");
        assert_eq!(mapper.resolve(".unknown"), "Misc");
        assert_eq!(mapper.no_extension(), "Plain");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml_str = r#"
[categories.map]
".log" = "Logs"
"#;
        let config: OrganizerConfig = toml::from_str(toml_str).unwrap();
        let (rules, mapper) = config.compile().unwrap();

        assert!(rules.is_skip_name(".DS_Store"));
        assert!(rules.is_bundle(Path::new("Installer.pkg")));
        assert_eq!(mapper.resolve(".log"), "Logs");
        assert_eq!(mapper.resolve(".pdf"), "Documents");
    }

    #[test]
    fn test_bundle_extensions_accept_leading_dot() {
        let config = OrganizerConfig {
            rules: RuleSection {
                bundle_extensions: vec![".app".to_string()],
                ..Default::default()
            },
            categories: CategorySection::default(),
        };
        let (rules, _) = config.compile().unwrap();
        assert!(rules.is_bundle(Path::new("Editor.app")));
    }

    #[test]
    fn test_invalid_glob_returns_error() {
        let config = OrganizerConfig {
            rules: RuleSection {
                skip_patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
            categories: CategorySection::default(),
        };
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let config = OrganizerConfig {
            rules: RuleSection {
                skip_regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
            categories: CategorySection::default(),
        };
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = OrganizerConfig::load(Some(Path::new("/no/such/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }
}
