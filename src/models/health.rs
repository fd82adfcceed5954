use crate::error::{FieldOpsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Some(ImageFormat::Jpeg),
            "png" | "image/png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

/// A crop photo selected for health analysis, before it is accepted.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub size_bytes: u64,
}

impl ImageUpload {
    pub fn new(file_name: &str, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.to_string(),
            size_bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FieldOpsError::InvalidUpload("Path has no file name".into()))?;
        Ok(Self::new(&file_name, metadata.len()))
    }

    /// Checks type and size; nothing is recorded for a rejected upload.
    pub fn validate(&self) -> Result<ImageFormat> {
        let format = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ImageFormat::from_str(&ext.to_string_lossy()))
            .ok_or_else(|| {
                FieldOpsError::InvalidUpload(format!(
                    "{} is not a JPEG or PNG image",
                    self.file_name
                ))
            })?;

        if self.size_bytes > MAX_UPLOAD_BYTES {
            return Err(FieldOpsError::InvalidUpload(format!(
                "{} is {:.1} MB; images must be 5 MB or smaller",
                self.file_name,
                self.size_bytes as f64 / (1024.0 * 1024.0)
            )));
        }

        Ok(format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionStatus {
    Pending,
    Healthy,
    Diseased,
}

impl DetectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionStatus::Pending => "pending",
            DetectionStatus::Healthy => "healthy",
            DetectionStatus::Diseased => "diseased",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(DetectionStatus::Pending),
            "healthy" => Some(DetectionStatus::Healthy),
            "diseased" => Some(DetectionStatus::Diseased),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDetection {
    pub id: Option<i64>,
    pub crop_id: i64,
    pub image_name: String,
    pub image_bytes: u64,
    pub format: ImageFormat,
    pub status: DetectionStatus,
    pub note: Option<String>,
    pub detected_at: DateTime<Utc>,
}

impl HealthDetection {
    /// Validates the upload and builds a pending detection for it.
    pub fn pending(crop_id: i64, upload: &ImageUpload) -> Result<Self> {
        let format = upload.validate()?;
        Ok(Self {
            id: None,
            crop_id,
            image_name: upload.file_name.clone(),
            image_bytes: upload.size_bytes,
            format,
            status: DetectionStatus::Pending,
            note: None,
            detected_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_jpeg_and_png() {
        assert_eq!(
            ImageUpload::new("leaf.JPG", 1024).validate().unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageUpload::new("leaf.jpeg", 1024).validate().unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageUpload::new("leaf.png", MAX_UPLOAD_BYTES).validate().unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn rejects_other_types() {
        assert!(matches!(
            ImageUpload::new("leaf.gif", 1024).validate(),
            Err(FieldOpsError::InvalidUpload(_))
        ));
        assert!(ImageUpload::new("leaf", 1024).validate().is_err());
    }

    #[test]
    fn rejects_oversized() {
        let err = ImageUpload::new("leaf.png", MAX_UPLOAD_BYTES + 1)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("5 MB"));
    }

    #[test]
    fn pending_detection_from_valid_upload() {
        let det = HealthDetection::pending(4, &ImageUpload::new("leaf.png", 2048)).unwrap();
        assert_eq!(det.crop_id, 4);
        assert_eq!(det.status, DetectionStatus::Pending);
        assert_eq!(det.format, ImageFormat::Png);
        assert!(det.id.is_none());
    }
}
