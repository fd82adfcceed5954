use super::SensorSnapshot;
use serde::{Deserialize, Serialize};

/// Body for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rain_forecast: bool,
}

impl PredictionRequest {
    pub fn from_snapshot(snapshot: &SensorSnapshot, rain_forecast: bool) -> Self {
        Self {
            soil_moisture: snapshot.moisture,
            temperature: snapshot.temperature_c,
            humidity: snapshot.humidity_percent,
            rain_forecast,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub ml_prediction: serde_json::Value,
    pub final_decision: String,
    #[serde(default)]
    pub explanation: String,
}

/// Body for `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub crop_id: i64,
    pub final_decision: String,
    pub helpful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveStatus {
    pub valve_id: String,
    #[serde(default)]
    pub crop_id: Option<i64>,
    pub is_open: bool,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Body for `POST /valves/toggle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveToggle {
    pub valve_id: String,
    pub crop_id: i64,
    pub open: bool,
}

/// Body for `POST /valves/override`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveOverride {
    pub valve_id: String,
    pub crop_id: i64,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_request_from_snapshot() {
        let snap = SensorSnapshot::new(22.0, 6.8, 150.0).with_ambient(31.0, 40.0);
        let req = PredictionRequest::from_snapshot(&snap, true);
        assert_eq!(req.soil_moisture, 22.0);
        assert_eq!(req.temperature, 31.0);
        assert_eq!(req.humidity, 40.0);
        assert!(req.rain_forecast);
    }

    #[test]
    fn prediction_response_tolerates_missing_explanation() {
        let json = r#"{"ml_prediction": 1, "final_decision": "Irrigate"}"#;
        let resp: PredictionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.final_decision, "Irrigate");
        assert!(resp.explanation.is_empty());
    }

    #[test]
    fn override_omits_missing_duration() {
        let body = ValveOverride {
            valve_id: "v1".into(),
            crop_id: 2,
            open: true,
            duration_minutes: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("duration_minutes"));
    }
}
