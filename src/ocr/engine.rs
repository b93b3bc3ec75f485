use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

use super::DigitReader;

/// Only digits can appear in a stack count.
const DIGIT_WHITELIST: &str = "tessedit_char_whitelist=0123456789";

/// Runs the Tesseract command line tool on single-line digit crops.
#[derive(Clone, Debug)]
pub struct TesseractReader {
    executable: PathBuf,
}

impl TesseractReader {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Returns the first line of `tesseract --version`.
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.executable)
            .arg("--version")
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            return Err(anyhow!("tesseract --version exited with {}", output.status));
        }

        // Older builds print the version banner on stderr.
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }
}

impl DigitReader for TesseractReader {
    fn read_digits(&self, img: &GrayImage) -> Result<String> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        // --psm 7: treat the image as a single text line
        let output = Command::new(&self.executable)
            .arg(temp_input.path())
            .arg("stdout")
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("7")
            .arg("-c")
            .arg(DIGIT_WHITELIST)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_an_error() {
        let reader = TesseractReader::new("/nonexistent/tesseract-binary");
        assert!(reader.version().is_err());
        assert!(reader.read_digits(&GrayImage::new(4, 4)).is_err());
    }
}
