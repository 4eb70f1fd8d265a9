use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;

const QUALIFIER: &str = "net.hexview";
const ORGANIZATION: &str = "Hexview";
const APPLICATION: &str = "hexview";
const OPTIONS_FILE_NAME: &str = "options.toml";

pub const SUPPORTED_BYTES_PER_LINE: [usize; 2] = [8, 16];

pub const LANGUAGES: [&str; 22] = [
    "English",
    "Spanish",
    "French",
    "German",
    "Japanese",
    "Chinese",
    "Russian",
    "Italian",
    "Portuguese",
    "Korean",
    "Dutch",
    "Polish",
    "Turkish",
    "Swedish",
    "Arabic",
    "Hindi",
    "Czech",
    "Greek",
    "Danish",
    "Norwegian",
    "Finnish",
    "Vietnamese",
];

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to access options file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse options file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize options: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// User preferences. Stored as a flat `key = value` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppOptions {
    pub dark_mode: bool,
    pub bytes_per_line: usize,
    pub auto_reload: bool,
    pub language: String,
}

impl Default for AppOptions {
    fn default() -> Self {
        AppOptions {
            dark_mode: true,
            bytes_per_line: 16,
            auto_reload: true,
            language: "English".to_string(),
        }
    }
}

impl AppOptions {
    /// Snap `bytes_per_line` to a supported value and reset unknown languages.
    pub fn normalized(mut self) -> Self {
        if !SUPPORTED_BYTES_PER_LINE.contains(&self.bytes_per_line) {
            self.bytes_per_line = if self.bytes_per_line < 12 { 8 } else { 16 };
        }
        if !LANGUAGES.contains(&self.language.as_str()) {
            self.language = AppOptions::default().language;
        }
        self
    }
}

pub fn options_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(OPTIONS_FILE_NAME))
}

/// Read options from `path`. A missing file yields `Ok(None)`.
pub fn read_options(path: &Path) -> Result<Option<AppOptions>, OptionsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let options: AppOptions = toml::from_str(&contents)?;
    Ok(Some(options.normalized()))
}

/// Options from `path`, falling back to defaults on any failure.
pub fn load_options(path: &Path) -> AppOptions {
    match read_options(path) {
        Ok(Some(options)) => options,
        Ok(None) => AppOptions::default(),
        Err(err) => {
            warn!("{} ({}), using defaults", err, path.display());
            AppOptions::default()
        }
    }
}

pub fn save_options(path: &Path, options: &AppOptions) -> Result<(), OptionsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml = toml::to_string_pretty(options)?;
    fs::write(path, toml)?;
    Ok(())
}

/// The options as stored on disk next to the options the session runs with.
///
/// Session overrides (command line flags) never reach the file. Only fields
/// the user changes during the session are copied over before saving.
#[derive(Debug, Clone)]
pub struct OptionsStore {
    path: Option<PathBuf>,
    saved: AppOptions,
    session: AppOptions,
}

impl OptionsStore {
    pub fn new(path: Option<PathBuf>, saved: AppOptions) -> Self {
        OptionsStore {
            path,
            session: saved.clone(),
            saved,
        }
    }

    /// Load from `path`, or start from defaults without a path.
    pub fn load(path: Option<PathBuf>) -> Self {
        let saved = path.as_deref().map(load_options).unwrap_or_default();
        OptionsStore::new(path, saved)
    }

    pub fn with_session(mut self, session: AppOptions) -> Self {
        self.session = session;
        self
    }

    pub fn saved(&self) -> &AppOptions {
        &self.saved
    }

    pub fn session(&self) -> &AppOptions {
        &self.session
    }

    /// Take `current` as the new session state and save the fields that
    /// differ from the previous one. Returns whether anything was written.
    pub fn commit(&mut self, current: &AppOptions) -> Result<bool, OptionsError> {
        let before = std::mem::replace(&mut self.session, current.clone());
        let mut changed = false;
        if before.dark_mode != current.dark_mode {
            self.saved.dark_mode = current.dark_mode;
            changed = true;
        }
        if before.bytes_per_line != current.bytes_per_line {
            self.saved.bytes_per_line = current.bytes_per_line;
            changed = true;
        }
        if before.auto_reload != current.auto_reload {
            self.saved.auto_reload = current.auto_reload;
            changed = true;
        }
        if before.language != current.language {
            self.saved.language = current.language.clone();
            changed = true;
        }
        if !changed {
            return Ok(false);
        }
        match &self.path {
            Some(path) => {
                save_options(path, &self.saved)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        assert!(read_options(&path).unwrap().is_none());
        assert_eq!(load_options(&path), AppOptions::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("options.toml");
        let options = AppOptions {
            dark_mode: false,
            bytes_per_line: 8,
            auto_reload: false,
            language: "German".to_string(),
        };
        save_options(&path, &options).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("darkMode = false"));
        assert!(written.contains("bytesPerLine = 8"));
        assert_eq!(load_options(&path), options);
    }

    #[test]
    fn test_partial_file_and_normalization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        fs::write(&path, "bytesPerLine = 32\nlanguage = \"Klingon\"\n").unwrap();
        let options = load_options(&path);
        assert_eq!(options.bytes_per_line, 16);
        assert_eq!(options.language, "English");
        assert!(options.dark_mode);
    }

    #[test]
    fn test_session_overrides_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        save_options(&path, &AppOptions::default()).unwrap();

        // started with --bytes-per-line 8 --light
        let mut store = OptionsStore::load(Some(path.clone())).with_session(AppOptions {
            bytes_per_line: 8,
            dark_mode: false,
            ..AppOptions::default()
        });
        assert_eq!(store.saved(), &AppOptions::default());

        // toggling auto-reload writes only that field
        let mut current = store.session().clone();
        current.auto_reload = false;
        assert!(store.commit(&current).unwrap());
        let written = load_options(&path);
        assert_eq!(written.bytes_per_line, 16);
        assert!(written.dark_mode);
        assert!(!written.auto_reload);

        // nothing changed, nothing written
        assert!(!store.commit(&current).unwrap());

        // switching the overridden theme is a real change and is kept
        current.dark_mode = true;
        assert!(store.commit(&current).unwrap());
        assert!(load_options(&path).dark_mode);
        current.dark_mode = false;
        assert!(store.commit(&current).unwrap());
        let written = load_options(&path);
        assert!(!written.dark_mode);
        assert_eq!(written.bytes_per_line, 16);
        assert_eq!(store.session(), &current);
    }

    #[test]
    fn test_store_without_path_never_writes() {
        let mut store = OptionsStore::load(None);
        let mut current = store.session().clone();
        current.language = "German".to_string();
        assert!(!store.commit(&current).unwrap());
        assert_eq!(store.saved().language, "German");
    }

    #[test]
    fn test_parse_error_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        fs::write(&path, "darkMode = \"maybe\"").unwrap();
        assert!(matches!(read_options(&path), Err(OptionsError::Parse(_))));
        assert_eq!(load_options(&path), AppOptions::default());
    }
}
