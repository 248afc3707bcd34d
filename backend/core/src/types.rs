use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// An encoded image produced by the capture surface.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Where the image came from (file name, device label).
    pub source: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl ImagePayload {
    pub fn new(source: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            source: source.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Base64 encoding of the raw bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("source", &self.source)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Structured fields read off the source license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedLicenseData {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub address: String,
    pub license_number: String,
    /// Issuing jurisdiction.
    pub origin_province: String,
    pub current_class: String,
    pub expiry_date: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<String>,
    pub is_authentic: bool,
    /// Confidence in `is_authentic`, in `[0, 1]`.
    pub authenticity_confidence: f64,
}

impl ExtractedLicenseData {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// The target jurisdiction's requirements for accepting the source license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquivalencyResult {
    pub target_class: String,
    pub is_direct_exchange: bool,
    #[serde(default)]
    pub required_tests: Vec<String>,
    #[serde(default)]
    pub required_docs: Vec<String>,
    pub fees: f64,
    pub policy_citation: String,
    #[serde(default)]
    pub notes: String,
}

/// Everything one analysis call returns. Both halves arrive together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub license_data: ExtractedLicenseData,
    pub equivalency: EquivalencyResult,
}

impl AnalysisResult {
    /// Reject numeric fields the service should never produce.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let confidence = self.license_data.authenticity_confidence;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(AnalysisError::new(format!(
                "authenticity confidence {confidence} is outside [0, 1]"
            )));
        }
        let fees = self.equivalency.fees;
        if !fees.is_finite() || fees < 0.0 {
            return Err(AnalysisError::new(format!("fee amount {fees} is invalid")));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;

    #[test]
    fn payload_is_base64_encoded() {
        let image = ImagePayload::new("scan.png", "image/png", b"abc".to_vec());
        assert_eq!(image.to_base64(), "YWJj");
    }

    #[test]
    fn deserializes_camel_case_service_output() {
        let json = serde_json::json!({
            "licenseData": {
                "firstName": "Ana", "lastName": "Silva", "dob": "1990-01-01",
                "address": "1 Main St", "licenseNumber": "X1", "originProvince": "Alberta",
                "currentClass": "5", "expiryDate": "2030-01-01",
                "isAuthentic": true, "authenticityConfidence": 0.8
            },
            "equivalency": {
                "targetClass": "G", "isDirectExchange": false,
                "requiredTests": ["Road test"], "fees": 159.75,
                "policyCitation": "HTA s. 32"
            }
        });
        let result: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.license_data.full_name(), "Ana Silva");
        assert!(result.license_data.conditions.is_empty());
        assert_eq!(result.equivalency.required_tests, vec!["Road test"]);
        assert!(result.equivalency.required_docs.is_empty());
        assert!(result.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let mut result = fixtures::result();
        result.license_data.authenticity_confidence = 1.5;
        assert!(result.validate().is_err());
        result.license_data.authenticity_confidence = f64::NAN;
        assert!(result.validate().is_err());
    }

    #[test]
    fn rejects_negative_fees() {
        let mut result = fixtures::result();
        result.equivalency.fees = -1.0;
        let err = result.validate().unwrap_err();
        assert!(err.message().contains("fee"));
    }
}
