use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Volumetric soil moisture, percent (0-100)
    pub moisture: f64,
    pub ph: f64,
    /// Composite nitrogen/phosphorus/potassium reading, mg/kg
    pub npk: f64,
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub captured_at: DateTime<Utc>,
}

impl SensorSnapshot {
    pub fn new(moisture: f64, ph: f64, npk: f64) -> Self {
        Self {
            moisture,
            ph,
            npk,
            temperature_c: 25.0,
            humidity_percent: 60.0,
            captured_at: Utc::now(),
        }
    }

    pub fn with_ambient(mut self, temperature_c: f64, humidity_percent: f64) -> Self {
        self.temperature_c = temperature_c;
        self.humidity_percent = humidity_percent;
        self
    }

    pub fn rounded_moisture(&self) -> i64 {
        self.moisture.round() as i64
    }

    pub fn rounded_ph(&self) -> i64 {
        self.ph.round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_uses_nearest_integer() {
        let s = SensorSnapshot::new(29.5, 6.4, 180.0);
        assert_eq!(s.rounded_moisture(), 30);
        assert_eq!(s.rounded_ph(), 6);

        let s = SensorSnapshot::new(29.49, 6.5, 180.0);
        assert_eq!(s.rounded_moisture(), 29);
        assert_eq!(s.rounded_ph(), 7);
    }
}
