//! Single-run folder organization.
//!
//! [`FolderOrganizer`] walks the immediate children of a target directory,
//! decides which entries to touch, resolves a category folder for each one,
//! and moves (or, in dry-run mode, pretends to move) every eligible entry,
//! collecting a record per outcome. One instance corresponds to one run over
//! one directory; running two organizers against the same directory at the
//! same time is not supported and the resulting collisions are undefined.

use crate::categories::CategoryMap;
use crate::config::CompiledRules;
use crate::output::OutputFormatter;
use chrono::Local;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A single successful (or simulated) relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Where the entry was before the run.
    pub source: PathBuf,
    /// Where the entry ended up, after collision resolution.
    pub destination: PathBuf,
    /// The category label the entry was filed under.
    pub category: String,
}

/// A single entry that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// The entry that failed.
    pub path: PathBuf,
    /// Human-readable cause.
    pub message: String,
}

/// Errors that can occur while building or running an organizer.
#[derive(Debug)]
pub enum OrganizeError {
    /// The resolved target directory does not exist.
    TargetDirMissing { path: PathBuf },
    /// No target was given and the platform Downloads folder is unknown.
    DownloadsDirUnknown,
    /// The target directory could not be enumerated.
    ScanFailed { path: PathBuf, source: io::Error },
    /// A category folder could not be created.
    CategoryDirFailed { path: PathBuf, source: io::Error },
    /// An entry could not be relocated.
    MoveFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetDirMissing { path } => {
                write!(f, "Folder {} does not exist", path.display())
            }
            Self::DownloadsDirUnknown => {
                write!(
                    f,
                    "Could not determine the Downloads folder for this platform; pass --path"
                )
            }
            Self::ScanFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::CategoryDirFailed { path, source } => {
                write!(
                    f,
                    "Failed to create category folder {}: {}",
                    path.display(),
                    source
                )
            }
            Self::MoveFailed {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source_path.display(),
                    destination.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Organizes one directory's entries into category subfolders.
///
/// Construction validates the target; nothing on disk is touched until
/// [`organize`](Self::organize) runs. In dry-run mode the whole pipeline
/// executes without any filesystem mutation, producing the same records a
/// real run would.
///
/// # Examples
///
/// ```no_run
/// use downsort::organizer::FolderOrganizer;
/// use std::path::PathBuf;
///
/// let mut organizer = FolderOrganizer::new(Some(PathBuf::from("/home/me/Downloads")), true)?;
/// let (moved, errors) = organizer.organize()?;
/// println!("would move {} entries ({} errors)", moved.len(), errors.len());
/// # Ok::<(), downsort::organizer::OrganizeError>(())
/// ```
pub struct FolderOrganizer {
    target: PathBuf,
    dry_run: bool,
    mapper: CategoryMap,
    rules: CompiledRules,
    moved: Vec<MoveRecord>,
    errors: Vec<ErrorRecord>,
    // Destinations promised to earlier entries this run. Collision checks
    // consult this set as well as the filesystem, so same-run duplicates get
    // distinct names even in dry-run mode where nothing lands on disk.
    claimed: HashSet<PathBuf>,
}

impl FolderOrganizer {
    /// Creates an organizer with the built-in category table and skip rules.
    ///
    /// With no `target`, the platform Downloads folder is used.
    ///
    /// # Errors
    ///
    /// Fails if the resolved target directory does not exist, or if no target
    /// was given and the Downloads folder cannot be determined.
    pub fn new(target: Option<PathBuf>, dry_run: bool) -> OrganizeResult<Self> {
        Self::with_rules(target, dry_run, CategoryMap::default(), CompiledRules::default())
    }

    /// Creates an organizer with an injected category table and skip rules,
    /// usually obtained from [`OrganizerConfig::compile`](crate::config::OrganizerConfig::compile).
    pub fn with_rules(
        target: Option<PathBuf>,
        dry_run: bool,
        mapper: CategoryMap,
        rules: CompiledRules,
    ) -> OrganizeResult<Self> {
        let target = match target {
            Some(path) => path,
            None => dirs::download_dir().ok_or(OrganizeError::DownloadsDirUnknown)?,
        };

        if !target.is_dir() {
            return Err(OrganizeError::TargetDirMissing { path: target });
        }

        Ok(Self {
            target,
            dry_run,
            mapper,
            rules,
            moved: Vec::new(),
            errors: Vec::new(),
            claimed: HashSet::new(),
        })
    }

    /// The directory this organizer operates on.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// True if this run only simulates moves.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Entries relocated (or simulated) so far this run.
    pub fn moved_files(&self) -> &[MoveRecord] {
        &self.moved
    }

    /// Entries that failed processing so far this run.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Decides whether an entry is left untouched.
    ///
    /// Skipped: hidden entries, configured OS-metadata filenames, entries
    /// matching a configured skip pattern, and directories that are not
    /// bundle-style packages. A directory with a bundle extension (`.app`,
    /// `.pkg` by default) is NOT skipped; it is moved as a single unit.
    pub fn should_skip(&self, path: &Path) -> bool {
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return true,
        };

        if file_name.starts_with('.') {
            return true;
        }
        if self.rules.is_skip_name(&file_name) {
            return true;
        }
        if self.rules.matches_skip_pattern(path) || self.rules.matches_skip_regex(&file_name) {
            return true;
        }

        path.is_dir() && !self.rules.is_bundle(path)
    }

    /// Returns the category label for an entry.
    ///
    /// Extensionless entries get the dedicated no-extension label; everything
    /// else goes through the extension table.
    pub fn categorize(&self, path: &Path) -> &str {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if !ext.is_empty() => self.mapper.resolve(ext),
            _ => self.mapper.no_extension(),
        }
    }

    /// Computes `target/<category>`, creating the folder in real mode.
    ///
    /// Creation is idempotent; in dry-run mode the path is computed without
    /// touching the filesystem so downstream logic is mode-agnostic.
    fn ensure_category_folder(&self, category: &str) -> OrganizeResult<PathBuf> {
        let folder = self.target.join(category);
        if !self.dry_run {
            fs::create_dir_all(&folder).map_err(|e| OrganizeError::CategoryDirFailed {
                path: folder.clone(),
                source: e,
            })?;
        }
        Ok(folder)
    }

    /// Resolves a destination that collides with nothing.
    ///
    /// A free path is used unchanged. An occupied one gets a sortable local
    /// timestamp between stem and extension; if that name is somehow taken
    /// too (same-tick collision), a counter suffix is appended until a free
    /// name is found. "Occupied" covers both what exists on disk and what an
    /// earlier entry of this run already claimed.
    fn resolve_destination(&self, desired: PathBuf) -> PathBuf {
        if self.is_destination_free(&desired) {
            return desired;
        }

        let parent = desired.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = desired
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let suffix = desired
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let timestamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
        let stamped = parent.join(format!("{stem}_{timestamp}{suffix}"));
        if self.is_destination_free(&stamped) {
            return stamped;
        }

        let mut counter = 1u32;
        loop {
            let candidate = parent.join(format!("{stem}_{timestamp}_{counter}{suffix}"));
            if self.is_destination_free(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn is_destination_free(&self, candidate: &Path) -> bool {
        !candidate.exists() && !self.claimed.contains(candidate)
    }

    /// Relocates `source` to `destination`, or does nothing in dry-run mode.
    ///
    /// Renames where possible; when the destination is on another volume,
    /// falls back to copy-then-delete (recursively for bundle directories).
    /// Destinations are pre-resolved to be free, so nothing is overwritten.
    fn move_or_simulate(&self, source: &Path, destination: &Path) -> OrganizeResult<()> {
        if self.dry_run {
            return Ok(());
        }

        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                Self::move_across_volumes(source, destination).map_err(|e| {
                    OrganizeError::MoveFailed {
                        source_path: source.to_path_buf(),
                        destination: destination.to_path_buf(),
                        source: e,
                    }
                })
            }
            Err(e) => Err(OrganizeError::MoveFailed {
                source_path: source.to_path_buf(),
                destination: destination.to_path_buf(),
                source: e,
            }),
        }
    }

    fn move_across_volumes(source: &Path, destination: &Path) -> io::Result<()> {
        if source.is_dir() {
            Self::copy_dir_recursive(source, destination)?;
            fs::remove_dir_all(source)
        } else {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }

    fn copy_dir_recursive(source: &Path, destination: &Path) -> io::Result<()> {
        fs::create_dir_all(destination)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            let target = destination.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                Self::copy_dir_recursive(&entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn process_entry(&mut self, path: &Path) -> OrganizeResult<MoveRecord> {
        let category = self.categorize(path).to_string();
        let folder = self.ensure_category_folder(&category)?;

        let file_name = path.file_name().ok_or_else(|| OrganizeError::MoveFailed {
            source_path: path.to_path_buf(),
            destination: folder.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "entry has no name component"),
        })?;

        let destination = self.resolve_destination(folder.join(file_name));
        self.move_or_simulate(path, &destination)?;
        self.claimed.insert(destination.clone());

        Ok(MoveRecord {
            source: path.to_path_buf(),
            destination,
            category,
        })
    }

    /// Runs the organization pass over a snapshot of the target directory.
    ///
    /// Each eligible entry ends up in exactly one of the two returned
    /// sequences: a [`MoveRecord`] on success or an [`ErrorRecord`] on
    /// failure. A single entry's failure never aborts the run; only an
    /// unreadable target directory does. Entries appearing in the directory
    /// after iteration starts are not guaranteed to be seen.
    pub fn organize(&mut self) -> OrganizeResult<(&[MoveRecord], &[ErrorRecord])> {
        if self.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Simulating organization of {}",
                self.target.display()
            ));
        } else {
            OutputFormatter::info(&format!("Organizing {}", self.target.display()));
        }

        let entries = fs::read_dir(&self.target).map_err(|e| OrganizeError::ScanFailed {
            path: self.target.clone(),
            source: e,
        })?;
        let snapshot: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        let eligible: Vec<PathBuf> = snapshot
            .into_iter()
            .filter(|path| !self.should_skip(path))
            .collect();

        let pb = OutputFormatter::create_progress_bar(eligible.len() as u64);
        for path in eligible {
            match self.process_entry(&path) {
                Ok(record) => {
                    pb.println(OutputFormatter::move_line(
                        &file_name_of(&path),
                        &record.category,
                        &file_name_of(&record.destination),
                        self.dry_run,
                    ));
                    self.moved.push(record);
                }
                Err(e) => {
                    let message = e.to_string();
                    pb.println(OutputFormatter::error_line(&file_name_of(&path), &message));
                    self.errors.push(ErrorRecord { path, message });
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok((&self.moved, &self.errors))
    }

    /// Builds the run summary: totals, a per-category breakdown, and the
    /// error list. Purely derived from accumulated state; calling it twice
    /// yields the same string.
    pub fn generate_report(&self) -> String {
        let mut report = vec!["=".repeat(50)];
        report.push(format!("Target folder: {}", self.target.display()));
        if self.dry_run {
            report.push("Mode: dry run (no files were moved)".to_string());
        }
        report.push(format!("Total moved: {}", self.moved.len()));
        report.push(format!("Total errors: {}", self.errors.len()));

        if !self.moved.is_empty() {
            report.push(String::new());
            report.push("By category:".to_string());

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for record in &self.moved {
                *counts.entry(record.category.as_str()).or_insert(0) += 1;
            }
            let mut categories: Vec<_> = counts.into_iter().collect();
            categories.sort_by_key(|&(label, _)| label);

            for (label, count) in categories {
                let file_word = if count == 1 { "file" } else { "files" };
                report.push(format!("  {}: {} {}", label, count, file_word));
            }
        }

        if !self.errors.is_empty() {
            report.push(String::new());
            report.push("Errors:".to_string());
            for error in &self.errors {
                report.push(format!("  - {}: {}", error.path.display(), error.message));
            }
        }

        report.join("\n")
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn organizer(dir: &TempDir, dry_run: bool) -> FolderOrganizer {
        FolderOrganizer::new(Some(dir.path().to_path_buf()), dry_run)
            .expect("organizer should build over an existing directory")
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).expect("failed to create test file");
        path
    }

    #[test]
    fn test_missing_target_fails_construction() {
        let result = FolderOrganizer::new(Some(PathBuf::from("/no/such/folder")), false);
        assert!(matches!(
            result,
            Err(OrganizeError::TargetDirMissing { .. })
        ));
    }

    #[test]
    fn test_should_skip_hidden_and_metadata() {
        let dir = TempDir::new().unwrap();
        let org = organizer(&dir, false);

        let hidden = touch(&dir, ".DS_Store");
        assert!(org.should_skip(&hidden));

        let metadata = touch(&dir, "desktop.ini");
        assert!(org.should_skip(&metadata));

        let regular = touch(&dir, "report.pdf");
        assert!(!org.should_skip(&regular));
    }

    #[test]
    fn test_should_skip_plain_directory_but_not_bundle() {
        let dir = TempDir::new().unwrap();
        let org = organizer(&dir, false);

        let plain = dir.path().join("projects");
        fs::create_dir(&plain).unwrap();
        assert!(org.should_skip(&plain));

        let bundle = dir.path().join("Installer.pkg");
        fs::create_dir(&bundle).unwrap();
        assert!(!org.should_skip(&bundle));
    }

    #[test]
    fn test_categorize() {
        let dir = TempDir::new().unwrap();
        let org = organizer(&dir, false);

        assert_eq!(org.categorize(Path::new("report.pdf")), "Documents");
        assert_eq!(org.categorize(Path::new("photo.JPG")), "Images");
        assert_eq!(org.categorize(Path::new("archive.tar.gz")), "Archives");
        assert_eq!(org.categorize(Path::new("mystery.xyz")), "Others");
        assert_eq!(org.categorize(Path::new("noext")), "NoExtension");
    }

    #[test]
    fn test_ensure_category_folder_modes() {
        let dir = TempDir::new().unwrap();

        let real = organizer(&dir, false);
        let folder = real.ensure_category_folder("Documents").unwrap();
        assert!(folder.is_dir());
        // Idempotent on an existing folder.
        real.ensure_category_folder("Documents").unwrap();

        let dry = organizer(&dir, true);
        let computed = dry.ensure_category_folder("Images").unwrap();
        assert_eq!(computed, dir.path().join("Images"));
        assert!(!computed.exists());
    }

    #[test]
    fn test_resolve_destination_free_path_unchanged() {
        let dir = TempDir::new().unwrap();
        let org = organizer(&dir, false);

        let desired = dir.path().join("Documents").join("report.pdf");
        assert_eq!(org.resolve_destination(desired.clone()), desired);
    }

    #[test]
    fn test_resolve_destination_renames_on_collision() {
        let dir = TempDir::new().unwrap();
        let org = organizer(&dir, false);

        let occupied = touch(&dir, "report.pdf");
        let resolved = org.resolve_destination(occupied.clone());

        assert_ne!(resolved, occupied);
        let name = resolved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_resolve_destination_sees_claimed_paths() {
        let dir = TempDir::new().unwrap();
        let mut org = organizer(&dir, true);

        let desired = dir.path().join("Documents").join("report.pdf");
        org.claimed.insert(desired.clone());

        let resolved = org.resolve_destination(desired.clone());
        assert_ne!(resolved, desired);
    }

    #[test]
    fn test_organize_moves_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "report.pdf");
        touch(&dir, "photo.jpg");

        let mut org = organizer(&dir, false);
        {
            let (moved, errors) = org.organize().unwrap();
            assert_eq!(moved.len(), 2);
            assert!(errors.is_empty());
        }

        assert!(dir.path().join("Documents").join("report.pdf").is_file());
        assert!(dir.path().join("Images").join("photo.jpg").is_file());
        assert!(!dir.path().join("report.pdf").exists());
    }

    #[test]
    fn test_dry_run_records_without_moving() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "report.pdf");

        let mut org = organizer(&dir, true);
        {
            let (moved, _) = org.organize().unwrap();
            assert_eq!(moved.len(), 1);
            assert_eq!(moved[0].category, "Documents");
        }

        assert!(dir.path().join("report.pdf").is_file());
        assert!(!dir.path().join("Documents").exists());
    }

    #[test]
    fn test_failed_entry_does_not_abort_run() {
        use crate::config::{CategorySection, OrganizerConfig, RuleSection};

        let dir = TempDir::new().unwrap();
        // A file sitting exactly where the Documents folder must go, kept in
        // place by a skip rule so the category folder creation has to fail.
        touch(&dir, "Documents");
        touch(&dir, "report.pdf");
        touch(&dir, "photo.jpg");

        let config = OrganizerConfig {
            rules: RuleSection {
                skip_filenames: vec!["Documents".to_string()],
                ..Default::default()
            },
            categories: CategorySection::default(),
        };
        let (rules, mapper) = config.compile().unwrap();
        let mut org =
            FolderOrganizer::with_rules(Some(dir.path().to_path_buf()), false, mapper, rules)
                .unwrap();

        {
            let (moved, errors) = org.organize().unwrap();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].path, dir.path().join("report.pdf"));
            assert_eq!(moved.len(), 1);
        }

        assert!(dir.path().join("Images").join("photo.jpg").is_file());
        assert!(dir.path().join("report.pdf").is_file());
    }

    #[test]
    fn test_generate_report_is_idempotent() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "report.pdf");
        touch(&dir, "song.mp3");

        let mut org = organizer(&dir, false);
        org.organize().unwrap();

        let report = org.generate_report();
        assert!(report.contains("Total moved: 2"));
        assert!(report.contains("Total errors: 0"));
        assert!(report.contains("Audio: 1 file"));
        assert!(report.contains("Documents: 1 file"));
        assert_eq!(report, org.generate_report());
    }
}
