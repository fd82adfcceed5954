use crate::db::Database;
use crate::error::Result;
use crate::models::{
    ActionTaken, ControlFlags, Crop, DetectionStatus, Farm, HealthDetection, HistoryEntry,
    ImageFormat, NewCrop, NewFarm, Outcome, SensorSnapshot,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use tracing::warn;

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// Farm Queries

impl Database {
    pub fn create_farm(&self, farm: &NewFarm) -> Result<Farm> {
        let created_at = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO farms (name, location, area_acres, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    farm.name,
                    farm.location,
                    farm.area_acres,
                    created_at.to_rfc3339()
                ],
            )?;
            Ok(Farm {
                id: conn.last_insert_rowid(),
                name: farm.name.clone(),
                location: farm.location.clone(),
                area_acres: farm.area_acres,
                crop_ids: Vec::new(),
                created_at,
            })
        })
    }

    /// All farms, with `crop_ids` filled from the crops table.
    pub fn get_farms(&self) -> Result<Vec<Farm>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM farms ORDER BY id")?;
            let mut farms: Vec<Farm> = stmt
                .query_map([], row_to_farm)?
                .filter_map(|r| r.ok())
                .collect();

            let mut stmt = conn.prepare("SELECT id, farm_id FROM crops ORDER BY id")?;
            let links = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
                .filter_map(|r| r.ok());
            for (crop_id, farm_id) in links {
                if let Some(farm) = farms.iter_mut().find(|f| f.id == farm_id) {
                    farm.crop_ids.push(crop_id);
                }
            }

            Ok(farms)
        })
    }
}

fn row_to_farm(row: &Row) -> rusqlite::Result<Farm> {
    let created_at_str: String = row.get("created_at")?;
    Ok(Farm {
        id: row.get("id")?,
        name: row.get("name")?,
        location: row.get("location")?,
        area_acres: row.get("area_acres")?,
        crop_ids: Vec::new(),
        created_at: parse_timestamp(&created_at_str),
    })
}

// Crop Queries

impl Database {
    pub fn create_crop(&self, crop: &NewCrop) -> Result<Crop> {
        let created_at = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO crops (farm_id, name, crop_type, planted_on, area_acres, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    crop.farm_id,
                    crop.name,
                    crop.crop_type,
                    crop.planted_on.format("%Y-%m-%d").to_string(),
                    crop.area_acres,
                    created_at.to_rfc3339(),
                ],
            )?;
            Ok(Crop {
                id: conn.last_insert_rowid(),
                farm_id: crop.farm_id,
                name: crop.name.clone(),
                crop_type: crop.crop_type.clone(),
                planted_on: crop.planted_on,
                area_acres: crop.area_acres,
                created_at,
            })
        })
    }

    pub fn get_crops(&self) -> Result<Vec<Crop>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM crops ORDER BY id")?;
            let crops = stmt
                .query_map([], row_to_crop)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(crops)
        })
    }
}

fn row_to_crop(row: &Row) -> rusqlite::Result<Crop> {
    let planted_str: String = row.get("planted_on")?;
    let created_at_str: String = row.get("created_at")?;

    let planted_on = NaiveDate::parse_from_str(&planted_str, "%Y-%m-%d").unwrap_or_else(|_| {
        warn!(planted_on = %planted_str, "Invalid planting date in database, using today");
        chrono::Local::now().date_naive()
    });

    Ok(Crop {
        id: row.get("id")?,
        farm_id: row.get("farm_id")?,
        name: row.get("name")?,
        crop_type: row.get("crop_type")?,
        planted_on,
        area_acres: row.get("area_acres")?,
        created_at: parse_timestamp(&created_at_str),
    })
}

// Control Flag Queries

fn write_controls(conn: &Connection, crop_id: i64, flags: &ControlFlags) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO crop_controls
            (crop_id, irrigation_running, fertilization_running, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            crop_id,
            flags.irrigation_running,
            flags.fertilization_running,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn write_history(conn: &Connection, entry: &HistoryEntry) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO crop_history
            (id, crop_id, farm_id, timestamp, moisture, ph, npk, temperature_c,
             humidity_percent, captured_at, action_taken, ai_recommendation, outcome)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
        params![
            entry.id,
            entry.crop_id,
            entry.farm_id,
            entry.timestamp.to_rfc3339(),
            entry.sensors.moisture,
            entry.sensors.ph,
            entry.sensors.npk,
            entry.sensors.temperature_c,
            entry.sensors.humidity_percent,
            entry.sensors.captured_at.to_rfc3339(),
            entry.action_taken.as_str(),
            entry.ai_recommendation,
            entry.outcome.as_str(),
        ],
    )?;
    Ok(())
}

impl Database {
    pub fn save_controls(&self, crop_id: i64, flags: &ControlFlags) -> Result<()> {
        self.with_conn(|conn| write_controls(conn, crop_id, flags))
    }

    pub fn get_all_controls(&self) -> Result<HashMap<i64, ControlFlags>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT crop_id, irrigation_running, fertilization_running FROM crop_controls",
            )?;
            let controls = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        ControlFlags {
                            irrigation_running: row.get(1)?,
                            fertilization_running: row.get(2)?,
                        },
                    ))
                })?
                .filter_map(|r| r.ok())
                .collect();
            Ok(controls)
        })
    }
}

// History Queries

impl Database {
    pub fn insert_history(&self, entry: &HistoryEntry) -> Result<()> {
        self.with_conn(|conn| write_history(conn, entry))
    }

    /// All history rows, oldest first.
    pub fn get_all_history(&self) -> Result<Vec<HistoryEntry>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM crop_history ORDER BY rowid")?;
            let entries = stmt
                .query_map([], row_to_history)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(entries)
        })
    }
}

fn row_to_history(row: &Row) -> rusqlite::Result<HistoryEntry> {
    let timestamp_str: String = row.get("timestamp")?;
    let captured_str: String = row.get("captured_at")?;
    let action_str: String = row.get("action_taken")?;
    let outcome_str: String = row.get("outcome")?;

    let action_taken = ActionTaken::from_str(&action_str).unwrap_or_else(|| {
        warn!(action_taken = %action_str, "Unknown action_taken in database, defaulting to no_action");
        ActionTaken::NoAction
    });
    let outcome = Outcome::from_str(&outcome_str).unwrap_or_else(|| {
        warn!(outcome = %outcome_str, "Unknown outcome in database, defaulting to neutral");
        Outcome::Neutral
    });

    Ok(HistoryEntry {
        id: row.get("id")?,
        crop_id: row.get("crop_id")?,
        farm_id: row.get("farm_id")?,
        timestamp: parse_timestamp(&timestamp_str),
        sensors: SensorSnapshot {
            moisture: row.get("moisture")?,
            ph: row.get("ph")?,
            npk: row.get("npk")?,
            temperature_c: row.get("temperature_c")?,
            humidity_percent: row.get("humidity_percent")?,
            captured_at: parse_timestamp(&captured_str),
        },
        action_taken,
        ai_recommendation: row.get("ai_recommendation")?,
        outcome,
    })
}

// Health Detection Queries

impl Database {
    pub fn insert_health_detection(&self, detection: &HealthDetection) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO health_detections
                    (crop_id, image_name, image_bytes, format, status, note, detected_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    detection.crop_id,
                    detection.image_name,
                    detection.image_bytes as i64,
                    detection.format.as_str(),
                    detection.status.as_str(),
                    detection.note,
                    detection.detected_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_health_detections(&self) -> Result<Vec<HealthDetection>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM health_detections ORDER BY id")?;
            let detections = stmt
                .query_map([], row_to_health_detection)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(detections)
        })
    }
}

fn row_to_health_detection(row: &Row) -> rusqlite::Result<HealthDetection> {
    let format_str: String = row.get("format")?;
    let status_str: String = row.get("status")?;
    let detected_str: String = row.get("detected_at")?;
    let image_bytes: i64 = row.get("image_bytes")?;

    let format = ImageFormat::from_str(&format_str).unwrap_or_else(|| {
        warn!(format = %format_str, "Unknown image format in database, defaulting to jpeg");
        ImageFormat::Jpeg
    });
    let status = DetectionStatus::from_str(&status_str).unwrap_or_else(|| {
        warn!(status = %status_str, "Unknown detection status in database, defaulting to pending");
        DetectionStatus::Pending
    });

    Ok(HealthDetection {
        id: Some(row.get("id")?),
        crop_id: row.get("crop_id")?,
        image_name: row.get("image_name")?,
        image_bytes: image_bytes.max(0) as u64,
        format,
        status,
        note: row.get("note")?,
        detected_at: parse_timestamp(&detected_str),
    })
}

// Settings Queries

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planted() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn farm_lists_its_crops() {
        let db = Database::open_in_memory().unwrap();
        let farm = db.create_farm(&NewFarm::new("Green Acres")).unwrap();
        let crop = db
            .create_crop(&NewCrop::new(farm.id, "Plot A", "Maize", planted()))
            .unwrap();

        let farms = db.get_farms().unwrap();
        assert_eq!(farms.len(), 1);
        assert_eq!(farms[0].crop_ids, vec![crop.id]);

        let crops = db.get_crops().unwrap();
        assert_eq!(crops[0].planted_on, planted());
        assert_eq!(crops[0].crop_type, "Maize");
    }

    #[test]
    fn crop_requires_existing_farm() {
        let db = Database::open_in_memory().unwrap();
        let result = db.create_crop(&NewCrop::new(99, "Orphan", "Rice", planted()));
        assert!(result.is_err());
    }

    #[test]
    fn history_persists_snapshot_and_action() {
        let db = Database::open_in_memory().unwrap();
        let farm = db.create_farm(&NewFarm::new("Farm")).unwrap();
        let crop = db
            .create_crop(&NewCrop::new(farm.id, "Plot", "Wheat", planted()))
            .unwrap();

        let entry = HistoryEntry::new(
            crop.id,
            farm.id,
            SensorSnapshot::new(21.5, 6.2, 140.0),
            ActionTaken::Irrigation,
            "Irrigate; Do not fertilize",
        );
        db.insert_history(&entry).unwrap();

        let rows = db.get_all_history().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, entry.id);
        assert_eq!(rows[0].action_taken, ActionTaken::Irrigation);
        assert_eq!(rows[0].sensors.moisture, 21.5);
        assert_eq!(rows[0].outcome, Outcome::Neutral);
    }

    #[test]
    fn controls_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let farm = db.create_farm(&NewFarm::new("Farm")).unwrap();
        let crop = db
            .create_crop(&NewCrop::new(farm.id, "Plot", "Rice", planted()))
            .unwrap();

        let flags = ControlFlags {
            irrigation_running: true,
            fertilization_running: false,
        };
        db.save_controls(crop.id, &flags).unwrap();
        assert_eq!(db.get_all_controls().unwrap().get(&crop.id), Some(&flags));
    }

    #[test]
    fn settings_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_setting("last_crop").unwrap(), None);
        db.set_setting("last_crop", "3").unwrap();
        assert_eq!(db.get_setting("last_crop").unwrap(), Some("3".to_string()));
    }
}
