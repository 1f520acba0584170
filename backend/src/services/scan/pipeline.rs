use std::io::Cursor;

use chrono::Utc;
use common::model::document::{ScanDocument, ScanLocation, ScanResult, ScanType};
use image::ImageFormat;
use log::{debug, info};
use md5::Context;

use super::{find_by_hash, insert};
use crate::db::{is_constraint_violation, new_id};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// One image to scan, already decoded from whatever transport carried it.
pub struct ScanInput {
    pub user_id: String,
    pub bytes: Vec<u8>,
    pub location: Option<ScanLocation>,
    pub scan_type: ScanType,
}

impl ScanInput {
    /// Rejects payloads that cannot be scanned before any work is queued.
    pub fn check(&self) -> ApiResult<()> {
        if self.bytes.is_empty() {
            return Err(ApiError::bad_request("No image provided"));
        }
        if let Some(loc) = &self.location {
            if !(-90.0..=90.0).contains(&loc.latitude) || !(-180.0..=180.0).contains(&loc.longitude) {
                return Err(ApiError::bad_request("Location is out of range"));
            }
        }
        Ok(())
    }
}

/// Decodes any format the `image` crate knows and re-encodes it as PNG.
pub fn normalize_png(bytes: &[u8]) -> ApiResult<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|_| ApiError::bad_request("Unsupported or corrupt image"))?;
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ApiError::Internal(format!("could not encode PNG: {e}")))?;
    Ok(png.into_inner())
}

/// Blocking: image decoding, OCR and SQLite all run on the calling thread.
/// `progress` receives a rough percentage between the stages.
pub fn run(state: &AppState, input: ScanInput, mut progress: impl FnMut(u32)) -> ApiResult<ScanResult> {
    input.check()?;
    let mut hasher = Context::new();
    hasher.consume(&input.bytes);
    let image_md5 = format!("{:x}", hasher.finalize());

    let conn = state.db.connect()?;
    if let Some(existing) = find_by_hash(&conn, &input.user_id, &image_md5)? {
        debug!("scan {} already stored for {}", existing.id, input.user_id);
        return Ok(result_of(existing));
    }

    let png = normalize_png(&input.bytes)?;
    progress(25);
    let output = state
        .ocr
        .recognize(&png)
        .map_err(|e| ApiError::upstream("Error processing document", e))?;
    progress(75);

    let now = Utc::now();
    let document = ScanDocument {
        id: new_id(),
        user_id: input.user_id,
        image_md5,
        extracted_text: output.text,
        confidence: output.confidence,
        location: input.location,
        scan_type: input.scan_type,
        created_at: now,
        updated_at: now,
    };
    match insert(&conn, &document) {
        Ok(()) => {}
        // The same image raced in from another request.
        Err(e) if is_constraint_violation(&e) => {
            if let Some(existing) = find_by_hash(&conn, &document.user_id, &document.image_md5)? {
                return Ok(result_of(existing));
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }
    info!(
        "scanned {} for {} with {} ({:.1}% confidence)",
        document.id,
        document.user_id,
        state.ocr.name(),
        document.confidence
    );
    progress(100);
    Ok(result_of(document))
}

fn result_of(document: ScanDocument) -> ScanResult {
    ScanResult {
        text: document.extracted_text.clone(),
        confidence: document.confidence,
        document,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrEngine, OcrError, OcrOutput};
    use crate::services::scan::fixtures::png;
    use crate::test_support::TestContext;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingOcr(AtomicUsize);

    impl OcrEngine for CountingOcr {
        fn name(&self) -> &str {
            "counting"
        }

        fn recognize(&self, png: &[u8]) -> Result<OcrOutput, OcrError> {
            assert!(png.starts_with(b"\x89PNG"));
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(OcrOutput {
                text: "Amoxicilline 1g".into(),
                confidence: 88.0,
            })
        }
    }

    fn input(bytes: Vec<u8>) -> ScanInput {
        ScanInput {
            user_id: "amina".into(),
            bytes,
            location: None,
            scan_type: ScanType::Document,
        }
    }

    #[test]
    fn same_image_is_recognised_once() {
        let engine = Arc::new(CountingOcr(AtomicUsize::new(0)));
        let ctx = TestContext::with_ocr(engine.clone());
        let mut steps = Vec::new();

        let first = run(&ctx.state, input(png(1)), |p| steps.push(p)).unwrap();
        assert_eq!(first.text, "Amoxicilline 1g");
        assert_eq!(steps, vec![25, 75, 100]);

        let second = run(&ctx.state, input(png(1)), |_| {}).unwrap();
        assert_eq!(second.document.id, first.document.id);
        assert_eq!(engine.0.load(Ordering::SeqCst), 1);

        run(&ctx.state, input(png(2)), |_| {}).unwrap();
        assert_eq!(engine.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn non_images_are_rejected() {
        let ctx = TestContext::new();
        let err = run(&ctx.state, input(b"%PDF-1.4 not an image".to_vec()), |_| {}).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        let err = run(&ctx.state, input(Vec::new()), |_| {}).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
