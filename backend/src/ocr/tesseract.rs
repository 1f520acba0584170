use std::io::Write;
use std::process::Command;

use log::debug;

use super::{parse_tsv, OcrEngine, OcrError, OcrOutput};

/// Drives an installed `tesseract` binary: the image goes through a temp
/// file and the TSV report comes back on stdout.
pub struct TesseractCli {
    binary: String,
    language: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, png: &[u8]) -> Result<OcrOutput, OcrError> {
        let mut input = tempfile::Builder::new()
            .prefix("healthland-scan-")
            .suffix(".png")
            .tempfile()?;
        input.write_all(png)?;
        input.flush()?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("tsv")
            .output()?;

        if !output.status.success() {
            return Err(OcrError::Engine {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let result = parse_tsv(&tsv);
        debug!(
            "tesseract read {} chars at {:.1}% confidence",
            result.text.len(),
            result.confidence
        );
        Ok(result)
    }
}
