use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    pub enum ScanType {
        Document => "document",
        Receipt => "receipt",
        BusinessCard => "business_card",
        Other => "other",
    }
}

impl Default for ScanType {
    fn default() -> Self {
        ScanType::Document
    }
}

/// Where the device was when the scan was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDocument {
    pub id: String,
    pub user_id: String,
    /// Hex md5 of the submitted image bytes, used to spot re-uploads.
    pub image_md5: String,
    pub extracted_text: String,
    /// Mean word confidence reported by the OCR engine, 0 to 100.
    pub confidence: f64,
    pub location: Option<ScanLocation>,
    pub scan_type: ScanType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub text: String,
    pub confidence: f64,
    pub document: ScanDocument,
}
