//! Text recognition behind a trait, so the scan service can run against the
//! Tesseract CLI in production and a canned engine in tests.

mod tesseract;

pub use tesseract::TesseractCli;

/// What an engine recognised on one image.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    /// Mean word confidence, 0 to 100.
    pub confidence: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("could not run OCR engine: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR engine exited with {status}: {stderr}")]
    Engine { status: String, stderr: String },
}

/// Engines receive PNG bytes; callers normalise whatever was uploaded first.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, png: &[u8]) -> Result<OcrOutput, OcrError>;
}

/// Rebuilds text and mean confidence from Tesseract's TSV output.
///
/// Columns: level page_num block_num par_num line_num word_num left top
/// width height conf text. Only level 5 rows are words. Words on the same
/// line are joined by spaces, lines by newlines and paragraphs by a blank
/// line. Words reported with conf `-1` count for text but not confidence.
pub fn parse_tsv(tsv: &str) -> OcrOutput {
    let mut text = String::new();
    let mut current_line: Option<(u32, u32, u32, u32)> = None;
    let mut conf_sum = 0.0;
    let mut conf_count = 0u32;

    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 || fields[0] != "5" {
            continue;
        }
        let word = fields[11].trim();
        if word.is_empty() {
            continue;
        }
        let key = (
            fields[1].parse().unwrap_or(0),
            fields[2].parse().unwrap_or(0),
            fields[3].parse().unwrap_or(0),
            fields[4].parse().unwrap_or(0),
        );

        match current_line {
            Some(prev) if prev == key => text.push(' '),
            Some((page, block, par, _)) if (page, block, par) == (key.0, key.1, key.2) => {
                text.push('\n')
            }
            Some(_) => text.push_str("\n\n"),
            None => {}
        }
        current_line = Some(key);
        text.push_str(word);

        if let Ok(conf) = fields[10].trim().parse::<f64>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_count += 1;
            }
        }
    }

    let confidence = if conf_count == 0 {
        0.0
    } else {
        conf_sum / f64::from(conf_count)
    };
    OcrOutput { text, confidence }
}

/// Returns the same result for every image.
#[cfg(test)]
pub struct StaticOcr {
    pub output: OcrOutput,
}

#[cfg(test)]
impl StaticOcr {
    pub fn new(text: &str, confidence: f64) -> Self {
        Self {
            output: OcrOutput {
                text: text.to_string(),
                confidence,
            },
        }
    }
}

#[cfg(test)]
impl OcrEngine for StaticOcr {
    fn name(&self) -> &str {
        "static"
    }

    fn recognize(&self, _png: &[u8]) -> Result<OcrOutput, OcrError> {
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn words_are_grouped_by_line_and_paragraph() {
        let tsv = format!(
            "{HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t600\t800\t-1\t\n\
             5\t1\t1\t1\t1\t1\t10\t20\t80\t30\t95\tMetformin\n\
             5\t1\t1\t1\t1\t2\t100\t20\t60\t30\t88\t500mg\n\
             5\t1\t1\t1\t2\t1\t10\t60\t120\t30\t72\ttwice\n\
             5\t1\t1\t1\t2\t2\t140\t60\t80\t30\t70\tdaily\n\
             5\t1\t2\t1\t1\t1\t10\t200\t80\t30\t-1\tDr."
        );
        let out = parse_tsv(&tsv);
        assert_eq!(out.text, "Metformin 500mg\ntwice daily\n\nDr.");
        assert!((out.confidence - 81.25).abs() < 1e-9);
    }

    #[test]
    fn float_confidences_from_newer_tesseract() {
        let tsv = format!("{HEADER}\n5\t1\t1\t1\t1\t1\t0\t0\t1\t1\t91.5\tClinic");
        let out = parse_tsv(&tsv);
        assert_eq!(out.text, "Clinic");
        assert!((out.confidence - 91.5).abs() < 1e-9);
    }

    #[test]
    fn empty_output_has_zero_confidence() {
        let out = parse_tsv("");
        assert_eq!(out.text, "");
        assert_eq!(out.confidence, 0.0);
    }
}
