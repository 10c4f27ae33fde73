use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Probability above which the model's verdict is "hemorrhage"
pub const HEMORRHAGE_THRESHOLD: f64 = 0.5;

/// Optional free-form fields sent along with an uploaded scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanMetadata {
    pub patient_name: Option<String>,
    pub exam_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HemorrhageBase64Request {
    pub image_base64: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HemorrhageProbability {
    pub hemorrhage: f64,
    pub no_hemorrhage: f64,
}

/// Result of one hemorrhage detection run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HemorrhagePrediction {
    /// Backend label, e.g. "出血" / "未出血"
    pub prediction: String,
    /// Confidence tier, e.g. "高" / "中" / "低"
    pub confidence: String,
    pub probability: HemorrhageProbability,
    pub duration_ms: f64,
}

impl HemorrhagePrediction {
    pub fn is_hemorrhage(&self) -> bool {
        self.probability.hemorrhage > HEMORRHAGE_THRESHOLD
    }
}

/// A stored detection, as listed by the history endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HemorrhageRecord {
    pub id: i64,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub exam_id: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    pub prediction: String,
    #[serde(default)]
    pub confidence_level: Option<String>,
    pub hemorrhage_probability: f64,
    pub no_hemorrhage_probability: f64,
    #[serde(default)]
    pub analysis_duration: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prediction() {
        let json = r#"{"prediction":"出血","confidence":"高","probability":{"hemorrhage":0.9731,"no_hemorrhage":0.0269},"duration_ms":41.52}"#;
        let p: HemorrhagePrediction = serde_json::from_str(json).unwrap();
        assert!(p.is_hemorrhage());
        assert_eq!(p.confidence, "高");
        assert!((p.duration_ms - 41.52).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_record_with_timestamp() {
        let json = r#"{"id":7,"patient_name":"张伟","exam_id":"ACC10001","image_path":"/static/7.png",
            "prediction":"未出血","confidence_level":"中","hemorrhage_probability":0.21,
            "no_hemorrhage_probability":0.79,"analysis_duration":12.5,"created_at":"2026-03-01T08:30:00Z"}"#;
        let r: HemorrhageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.id, 7);
        assert_eq!(r.exam_id.as_deref(), Some("ACC10001"));
        assert!(r.created_at.is_some());
    }

    #[test]
    fn test_parse_record_minimal() {
        let json = r#"{"id":1,"prediction":"出血","hemorrhage_probability":0.8,"no_hemorrhage_probability":0.2}"#;
        let r: HemorrhageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.patient_name, None);
        assert_eq!(r.created_at, None);
    }
}
