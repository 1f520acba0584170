use std::fs;
use std::path::Path;

use common::requests::CertificateUpload;
use md5::Context;

use crate::error::{ApiError, ApiResult};
use crate::services::decode_base64_payload;

const MAX_CERTIFICATE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Saves the certificate as `<md5>.<ext>` and returns that file name.
/// Identical uploads land on the same file.
pub fn store(dir: &Path, upload: &CertificateUpload) -> ApiResult<String> {
    let extension = Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| ApiError::bad_request("Certificate must be a PDF, PNG or JPEG file"))?;

    let bytes = decode_base64_payload(&upload.content_base64)?;
    if bytes.len() > MAX_CERTIFICATE_BYTES {
        return Err(ApiError::bad_request("Certificate exceeds 5 MB"));
    }

    let mut hasher = Context::new();
    hasher.consume(&bytes);
    let file_name = format!("{:x}.{extension}", hasher.finalize());

    fs::create_dir_all(dir)
        .and_then(|_| fs::write(dir.join(&file_name), &bytes))
        .map_err(|e| ApiError::Internal(format!("could not store certificate: {e}")))?;
    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use tempfile::TempDir;

    fn upload(name: &str, content: &[u8]) -> CertificateUpload {
        CertificateUpload {
            file_name: name.to_string(),
            content_base64: STANDARD.encode(content),
        }
    }

    #[test]
    fn stored_under_content_hash() {
        let dir = TempDir::new().unwrap();
        let name = store(dir.path(), &upload("Licence.PDF", b"%PDF-1.4 licence")).unwrap();
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 32 + 4);
        assert_eq!(fs::read(dir.path().join(&name)).unwrap(), b"%PDF-1.4 licence");

        let again = store(dir.path(), &upload("copy.pdf", b"%PDF-1.4 licence")).unwrap();
        assert_eq!(name, again);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = store(dir.path(), &upload("licence.exe", b"MZ")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
