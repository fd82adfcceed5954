//! Application state store.
//!
//! Owns every farm, crop, control flag, history entry and health detection
//! for the session. Mutations go through the methods here so the in-memory
//! view and the SQLite copy never diverge; reads borrow from memory.

use crate::db::Database;
use crate::error::{FieldOpsError, Result};
use crate::models::{
    ControlFlags, ControlKind, Crop, Farm, HealthDetection, HistoryEntry, NewCrop, NewFarm,
    UserProfile,
};
use std::collections::HashMap;

const LAST_CROP_KEY: &str = "last_crop_id";

pub struct AppStore {
    db: Database,
    farms: Vec<Farm>,
    crops: Vec<Crop>,
    controls: HashMap<i64, ControlFlags>,
    history: HashMap<i64, Vec<HistoryEntry>>,
    health_detections: Vec<HealthDetection>,
    profile: Option<UserProfile>,
}

impl AppStore {
    /// Load persisted state from the database.
    pub fn load(db: Database) -> Result<Self> {
        let farms = db.get_farms()?;
        let crops = db.get_crops()?;
        let controls = db.get_all_controls()?;

        let mut history: HashMap<i64, Vec<HistoryEntry>> = HashMap::new();
        for entry in db.get_all_history()? {
            history.entry(entry.crop_id).or_default().push(entry);
        }

        let health_detections = db.get_health_detections()?;

        tracing::info!(
            path = %db.path().display(),
            farms = farms.len(),
            crops = crops.len(),
            "Loaded application state"
        );

        Ok(Self {
            db,
            farms,
            crops,
            controls,
            history,
            health_detections,
            profile: None,
        })
    }

    // Profile

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn set_profile(&mut self, profile: Option<UserProfile>) {
        self.profile = profile;
    }

    // Farms and crops

    pub fn farms(&self) -> &[Farm] {
        &self.farms
    }

    pub fn crops(&self) -> &[Crop] {
        &self.crops
    }

    pub fn get_farm(&self, id: i64) -> Option<&Farm> {
        self.farms.iter().find(|f| f.id == id)
    }

    pub fn get_crop(&self, id: i64) -> Option<&Crop> {
        self.crops.iter().find(|c| c.id == id)
    }

    pub fn crops_for_farm(&self, farm_id: i64) -> Vec<&Crop> {
        self.crops.iter().filter(|c| c.farm_id == farm_id).collect()
    }

    pub fn add_farm(&mut self, farm: NewFarm) -> Result<i64> {
        if farm.name.trim().is_empty() {
            return Err(FieldOpsError::InvalidData("Farm name is required".into()));
        }
        let farm = self.db.create_farm(&farm)?;
        let id = farm.id;
        tracing::info!(farm_id = id, name = %farm.name, "Registered farm");
        self.farms.push(farm);
        Ok(id)
    }

    pub fn add_crop(&mut self, crop: NewCrop) -> Result<i64> {
        if crop.name.trim().is_empty() {
            return Err(FieldOpsError::InvalidData("Crop name is required".into()));
        }
        if crop.crop_type.trim().is_empty() {
            return Err(FieldOpsError::InvalidData("Crop type is required".into()));
        }
        if self.get_farm(crop.farm_id).is_none() {
            return Err(FieldOpsError::NotFound(format!("farm {}", crop.farm_id)));
        }

        let crop = self.db.create_crop(&crop)?;
        let id = crop.id;
        if let Some(farm) = self.farms.iter_mut().find(|f| f.id == crop.farm_id) {
            farm.crop_ids.push(id);
        }
        tracing::info!(
            crop_id = id,
            farm_id = crop.farm_id,
            crop_type = %crop.crop_type,
            "Registered crop"
        );
        self.crops.push(crop);
        Ok(id)
    }

    // Control flags

    pub fn controls(&self, crop_id: i64) -> ControlFlags {
        self.controls.get(&crop_id).copied().unwrap_or_default()
    }

    /// Set one control flag. History logging is the caller's job.
    pub fn set_crop_control(&mut self, crop_id: i64, kind: ControlKind, value: bool) -> Result<()> {
        let mut flags = self.controls(crop_id);
        flags.set(kind, value);
        self.db.save_controls(crop_id, &flags)?;
        self.controls.insert(crop_id, flags);
        tracing::debug!(crop_id, control = %kind, value, "Control flag updated");
        Ok(())
    }

    // History

    /// History for a crop, oldest first.
    pub fn crop_history(&self, crop_id: i64) -> &[HistoryEntry] {
        self.history
            .get(&crop_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn add_crop_history(&mut self, entry: HistoryEntry) -> Result<()> {
        self.db.insert_history(&entry)?;
        tracing::debug!(
            crop_id = entry.crop_id,
            action = %entry.action_taken,
            "History entry appended"
        );
        self.history.entry(entry.crop_id).or_default().push(entry);
        Ok(())
    }

    // Health detections

    pub fn health_detections(&self) -> &[HealthDetection] {
        &self.health_detections
    }

    pub fn add_health_detection(&mut self, mut detection: HealthDetection) -> Result<i64> {
        if self.get_crop(detection.crop_id).is_none() {
            return Err(FieldOpsError::NotFound(format!("crop {}", detection.crop_id)));
        }
        let id = self.db.insert_health_detection(&detection)?;
        detection.id = Some(id);
        self.health_detections.push(detection);
        Ok(id)
    }

    // Session bookkeeping

    pub fn last_crop_id(&self) -> Option<i64> {
        self.db
            .get_setting(LAST_CROP_KEY)
            .ok()
            .flatten()
            .and_then(|v| v.parse().ok())
    }

    pub fn remember_crop(&self, crop_id: i64) -> Result<()> {
        self.db.set_setting(LAST_CROP_KEY, &crop_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionTaken, ImageUpload, SensorSnapshot};
    use chrono::NaiveDate;

    fn store() -> AppStore {
        AppStore::load(Database::open_in_memory().unwrap()).unwrap()
    }

    fn planted() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn lookups_return_none_when_missing() {
        let s = store();
        assert!(s.get_farm(1).is_none());
        assert!(s.get_crop(1).is_none());
        assert!(s.crop_history(1).is_empty());
        assert_eq!(s.controls(1), ControlFlags::default());
    }

    #[test]
    fn add_crop_links_to_farm() {
        let mut s = store();
        let farm_id = s.add_farm(NewFarm::new("Riverside").with_area(12.0)).unwrap();
        let crop_id = s
            .add_crop(NewCrop::new(farm_id, "East plot", "Maize", planted()))
            .unwrap();

        assert_eq!(s.get_farm(farm_id).unwrap().crop_ids, vec![crop_id]);
        assert_eq!(s.get_crop(crop_id).unwrap().farm_id, farm_id);
        assert_eq!(s.crops_for_farm(farm_id).len(), 1);
    }

    #[test]
    fn add_crop_rejects_unknown_farm_and_blank_names() {
        let mut s = store();
        assert!(matches!(
            s.add_crop(NewCrop::new(7, "Plot", "Maize", planted())),
            Err(FieldOpsError::NotFound(_))
        ));
        assert!(matches!(
            s.add_farm(NewFarm::new("  ")),
            Err(FieldOpsError::InvalidData(_))
        ));
        assert!(s.crops().is_empty());
        assert!(s.farms().is_empty());
    }

    #[test]
    fn set_control_only_touches_the_flag() {
        let mut s = store();
        let farm_id = s.add_farm(NewFarm::new("Farm")).unwrap();
        let crop_id = s
            .add_crop(NewCrop::new(farm_id, "Plot", "Rice", planted()))
            .unwrap();

        s.set_crop_control(crop_id, ControlKind::Irrigation, true)
            .unwrap();
        assert!(s.controls(crop_id).irrigation_running);
        assert!(!s.controls(crop_id).fertilization_running);
        assert!(s.crop_history(crop_id).is_empty());
    }

    #[test]
    fn state_survives_reload() {
        let db = Database::open_in_memory().unwrap();
        let mut s = AppStore::load(db.clone()).unwrap();
        let farm_id = s.add_farm(NewFarm::new("Farm")).unwrap();
        let crop_id = s
            .add_crop(NewCrop::new(farm_id, "Plot", "Tomato", planted()))
            .unwrap();
        s.set_crop_control(crop_id, ControlKind::Fertilization, true)
            .unwrap();
        s.add_crop_history(HistoryEntry::new(
            crop_id,
            farm_id,
            SensorSnapshot::new(40.0, 6.5, 200.0),
            ActionTaken::Delay,
            "Do not irrigate; Do not fertilize",
        ))
        .unwrap();
        s.remember_crop(crop_id).unwrap();

        let reloaded = AppStore::load(db).unwrap();
        assert_eq!(reloaded.farms().len(), 1);
        assert_eq!(reloaded.get_farm(farm_id).unwrap().crop_ids, vec![crop_id]);
        assert!(reloaded.controls(crop_id).fertilization_running);
        assert_eq!(reloaded.crop_history(crop_id).len(), 1);
        assert_eq!(reloaded.last_crop_id(), Some(crop_id));
    }

    #[test]
    fn history_is_append_only_and_ordered() {
        let mut s = store();
        let farm_id = s.add_farm(NewFarm::new("Farm")).unwrap();
        let crop_id = s
            .add_crop(NewCrop::new(farm_id, "Plot", "Potato", planted()))
            .unwrap();

        for action in [ActionTaken::Irrigation, ActionTaken::NoAction] {
            s.add_crop_history(HistoryEntry::new(
                crop_id,
                farm_id,
                SensorSnapshot::new(20.0, 6.0, 100.0),
                action,
                "",
            ))
            .unwrap();
        }

        let actions: Vec<_> = s
            .crop_history(crop_id)
            .iter()
            .map(|e| e.action_taken)
            .collect();
        assert_eq!(actions, vec![ActionTaken::Irrigation, ActionTaken::NoAction]);
    }

    #[test]
    fn health_detection_requires_known_crop() {
        let mut s = store();
        let upload = ImageUpload::new("leaf.png", 1000);
        let detection = HealthDetection::pending(5, &upload).unwrap();
        assert!(s.add_health_detection(detection).is_err());
        assert!(s.health_detections().is_empty());

        let farm_id = s.add_farm(NewFarm::new("Farm")).unwrap();
        let crop_id = s
            .add_crop(NewCrop::new(farm_id, "Plot", "Maize", planted()))
            .unwrap();
        let detection = HealthDetection::pending(crop_id, &upload).unwrap();
        let id = s.add_health_detection(detection).unwrap();
        assert_eq!(s.health_detections()[0].id, Some(id));
    }
}
