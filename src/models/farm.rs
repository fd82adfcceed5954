use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub area_acres: Option<f64>,
    pub crop_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl Farm {
    /// Stand-in rendered when a screen references a farm that no longer
    /// exists.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            name: "Unknown farm".to_string(),
            location: None,
            area_acres: None,
            crop_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: i64,
    pub farm_id: i64,
    pub name: String,
    pub crop_type: String,
    pub planted_on: NaiveDate,
    pub area_acres: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Crop {
    pub fn placeholder(id: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            farm_id: 0,
            name: "Unknown crop".to_string(),
            crop_type: "Default".to_string(),
            planted_on: now.date_naive(),
            area_acres: None,
            created_at: now,
        }
    }

    /// Days after sowing. Negative when the planting date is in the future.
    pub fn days_since_planting(&self, today: NaiveDate) -> i64 {
        (today - self.planted_on).num_days()
    }
}

/// Registration form payload for a farm.
#[derive(Debug, Clone, Default)]
pub struct NewFarm {
    pub name: String,
    pub location: Option<String>,
    pub area_acres: Option<f64>,
}

impl NewFarm {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn with_area(mut self, acres: f64) -> Self {
        self.area_acres = Some(acres);
        self
    }
}

/// Registration form payload for a crop.
#[derive(Debug, Clone)]
pub struct NewCrop {
    pub farm_id: i64,
    pub name: String,
    pub crop_type: String,
    pub planted_on: NaiveDate,
    pub area_acres: Option<f64>,
}

impl NewCrop {
    pub fn new(farm_id: i64, name: &str, crop_type: &str, planted_on: NaiveDate) -> Self {
        Self {
            farm_id,
            name: name.to_string(),
            crop_type: crop_type.to_string(),
            planted_on,
            area_acres: None,
        }
    }

    pub fn with_area(mut self, acres: f64) -> Self {
        self.area_acres = Some(acres);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_since_planting() {
        let crop = Crop {
            planted_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            ..Crop::placeholder(1)
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        assert_eq!(crop.days_since_planting(today), 10);

        let before = NaiveDate::from_ymd_opt(2024, 5, 30).unwrap();
        assert_eq!(crop.days_since_planting(before), -2);
    }

    #[test]
    fn new_crop_builder() {
        let crop = NewCrop::new(
            3,
            "North field",
            "Maize",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
        .with_area(2.5);

        assert_eq!(crop.farm_id, 3);
        assert_eq!(crop.crop_type, "Maize");
        assert_eq!(crop.area_acres, Some(2.5));
    }
}
