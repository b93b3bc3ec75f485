use std::path::{Path, PathBuf};
use std::process::Command;

use super::TesseractReader;
use crate::log;

#[cfg(windows)]
const TESSERACT_EXE: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_EXE: &str = "tesseract";

/// Well-known install locations checked after the configured path.
#[cfg(windows)]
const COMMON_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];
#[cfg(not(windows))]
const COMMON_PATHS: &[&str] = &["/usr/bin/tesseract", "/usr/local/bin/tesseract"];

/// Returns the per-user directory where a portable Tesseract may be placed.
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inventory-sorter")
        .join("tesseract")
}

/// Lists candidate executables in the order they are tried.
pub fn candidate_paths(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = configured {
        candidates.push(path.to_path_buf());
    }
    candidates.push(get_tesseract_dir().join(TESSERACT_EXE));
    candidates.extend(COMMON_PATHS.iter().map(PathBuf::from));
    candidates
}

/// Finds a Tesseract executable, or `None` if OCR is unavailable.
pub fn locate_tesseract(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(found) = candidate_paths(configured)
        .into_iter()
        .find(|path| path.exists())
    {
        return Some(found);
    }

    // Fall back to whatever is on PATH.
    let on_path = Command::new("tesseract")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    on_path.then(|| PathBuf::from("tesseract"))
}

/// Locates Tesseract and checks that it runs.
///
/// Returns `None` when OCR must be disabled; stack counts then default to 1
/// for the whole run.
pub fn init_tesseract(configured: Option<&Path>) -> Option<TesseractReader> {
    let Some(path) = locate_tesseract(configured) else {
        log("WARN: Tesseract not found. OCR disabled, all stack counts will be 1.");
        return None;
    };

    let reader = TesseractReader::new(path);
    match reader.version() {
        Ok(version) => {
            log(&format!(
                "{} (cmd: '{}')",
                version,
                reader.executable().display()
            ));
            Some(reader)
        }
        Err(e) => {
            log(&format!(
                "WARN: Tesseract at '{}' is not usable: {}. OCR disabled.",
                reader.executable().display(),
                e
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_is_tried_first() {
        let configured = PathBuf::from("/opt/custom/tesseract");
        let candidates = candidate_paths(Some(&configured));
        assert_eq!(candidates[0], configured);
        assert!(candidates.len() > 1);
    }

    #[test]
    fn test_existing_configured_path_is_found() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            locate_tesseract(Some(file.path())),
            Some(file.path().to_path_buf())
        );
    }
}
