use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::models::{HemorrhageBase64Request, HemorrhagePrediction, HemorrhageRecord, ScanMetadata};

use super::{ApiClient, ApiError};

/// Hemorrhage detection endpoint (multipart upload)
pub const HEMORRHAGE_PATH: &str = "/quality/hemorrhage";

/// Default number of history records to fetch
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Content type for an uploaded scan, by file extension.
/// Unknown extensions go up as raw bytes; the backend accepts those too.
pub fn mime_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("dcm") | Some("dicom") => "application/dicom",
        _ => "application/octet-stream",
    }
}

/// Multipart form for a scan upload. Metadata fields are only added when set.
pub fn scan_form(bytes: Vec<u8>, filename: &str, metadata: &ScanMetadata) -> Result<Form, ApiError> {
    let part = Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(mime_for(filename))
        .map_err(|e| ApiError::RequestConfig(format!("Invalid upload content type: {}", e)))?;

    let mut form = Form::new().part("file", part);
    if let Some(ref name) = metadata.patient_name {
        form = form.text("patient_name", name.clone());
    }
    if let Some(ref exam_id) = metadata.exam_id {
        form = form.text("exam_id", exam_id.clone());
    }
    Ok(form)
}

impl ApiClient {
    /// Upload a scan from disk for hemorrhage detection.
    pub async fn predict_hemorrhage(
        &self,
        path: &Path,
        metadata: &ScanMetadata,
    ) -> Result<HemorrhagePrediction, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::RequestConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("scan.png");
        self.predict_hemorrhage_bytes(bytes, filename, metadata).await
    }

    /// Upload in-memory scan bytes for hemorrhage detection.
    pub async fn predict_hemorrhage_bytes(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        metadata: &ScanMetadata,
    ) -> Result<HemorrhagePrediction, ApiError> {
        debug!(filename, size = bytes.len(), "Submitting scan for hemorrhage detection");
        let form = scan_form(bytes, filename, metadata)?;
        self.post_multipart(HEMORRHAGE_PATH, form).await
    }

    /// Submit scan bytes as a base64 JSON payload instead of a multipart upload.
    pub async fn predict_hemorrhage_base64(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<HemorrhagePrediction, ApiError> {
        let request = HemorrhageBase64Request {
            image_base64: STANDARD.encode(bytes),
            filename: filename.to_string(),
        };
        self.post_json(&format!("{}/base64", HEMORRHAGE_PATH), &request)
            .await
    }

    /// Past detections. The backend does not store them yet, so this is
    /// always empty and sends nothing.
    pub async fn hemorrhage_history(&self, limit: u32) -> Result<Vec<HemorrhageRecord>, ApiError> {
        debug!(limit, "Backend has no hemorrhage history endpoint yet");
        Ok(Vec::new())
    }
}
