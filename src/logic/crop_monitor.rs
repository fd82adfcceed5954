use super::decision::evaluate;
use super::history_logger::HistoryLogger;
use super::sensor_feed::SensorSubscription;
use super::stage_resolver::{next_stage, resolve_stage};
use crate::error::{FieldOpsError, Result};
use crate::models::{ControlKind, Crop, Decision, GrowthStage, SensorSnapshot};
use crate::store::AppStore;
use chrono::NaiveDate;

/// Live view of one crop: its sensor feed, latest decision and logger.
///
/// All store writes triggered by sensor ticks or control toggles for the
/// attached crop go through here.
pub struct CropMonitor {
    crop: Crop,
    logger: HistoryLogger,
    subscription: Option<SensorSubscription>,
    latest_snapshot: Option<SensorSnapshot>,
    latest_decision: Option<Decision>,
}

impl CropMonitor {
    pub fn new(crop: &Crop) -> Self {
        Self {
            crop: crop.clone(),
            logger: HistoryLogger::new(crop.id, crop.farm_id),
            subscription: None,
            latest_snapshot: None,
            latest_decision: None,
        }
    }

    /// Attach a running sensor feed and seed the logger with its first
    /// reading.
    pub fn attach(
        crop: &Crop,
        store: &mut AppStore,
        initial: SensorSnapshot,
        subscription: SensorSubscription,
    ) -> Result<Self> {
        let mut monitor = Self::new(crop);
        subscription.set_irrigating(store.controls(crop.id).irrigation_running);
        monitor.subscription = Some(subscription);
        monitor.on_snapshot(store, initial)?;
        Ok(monitor)
    }

    pub fn crop_id(&self) -> i64 {
        self.crop.id
    }

    pub fn latest_snapshot(&self) -> Option<&SensorSnapshot> {
        self.latest_snapshot.as_ref()
    }

    pub fn latest_decision(&self) -> Option<&Decision> {
        self.latest_decision.as_ref()
    }

    pub fn days_since_planting(&self, today: NaiveDate) -> i64 {
        self.crop.days_since_planting(today)
    }

    pub fn stage(&self, today: NaiveDate) -> &'static GrowthStage {
        resolve_stage(&self.crop.crop_type, self.days_since_planting(today))
    }

    pub fn next_stage(&self, today: NaiveDate) -> Option<&'static GrowthStage> {
        next_stage(&self.crop.crop_type, self.days_since_planting(today))
    }

    /// Apply every reading the feed produced since the last poll.
    /// Returns true if anything new arrived. A failed reading does not stop
    /// the rest; the first error is returned once all are applied.
    pub fn poll(&mut self, store: &mut AppStore) -> Result<bool> {
        let readings = match self.subscription.as_mut() {
            Some(sub) => sub.drain(),
            None => return Ok(false),
        };
        let updated = !readings.is_empty();
        let mut first_error = None;
        for snapshot in readings {
            if let Err(e) = self.on_snapshot(store, snapshot) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(updated),
        }
    }

    pub fn on_snapshot(&mut self, store: &mut AppStore, snapshot: SensorSnapshot) -> Result<()> {
        let decision = evaluate(&snapshot);
        let controls = store.controls(self.crop.id);

        if let Some(entry) = self.logger.observe(&snapshot, &decision, controls) {
            tracing::info!(
                crop_id = self.crop.id,
                action = %entry.action_taken,
                moisture = snapshot.moisture,
                "Decision changed"
            );
            if let Err(e) = store.add_crop_history(entry) {
                self.logger.revert_last_entry();
                self.latest_snapshot = Some(snapshot);
                self.latest_decision = Some(decision);
                return Err(e);
            }
        }

        self.latest_snapshot = Some(snapshot);
        self.latest_decision = Some(decision);
        Ok(())
    }

    /// Flip manual irrigation. Returns the new state.
    pub fn handle_irrigation(&mut self, store: &mut AppStore) -> Result<bool> {
        let running = self.toggle(store, ControlKind::Irrigation)?;
        if let Some(sub) = &self.subscription {
            sub.set_irrigating(running);
        }
        Ok(running)
    }

    /// Flip manual fertilization. Returns the new state.
    pub fn handle_fertilization(&mut self, store: &mut AppStore) -> Result<bool> {
        self.toggle(store, ControlKind::Fertilization)
    }

    /// The flag is restored if the history entry cannot be written, so a
    /// toggle either lands with its entry or not at all.
    fn toggle(&mut self, store: &mut AppStore, kind: ControlKind) -> Result<bool> {
        let snapshot = self
            .latest_snapshot
            .as_ref()
            .ok_or_else(|| FieldOpsError::InvalidData("No sensor reading yet".into()))?;

        let previous = store.controls(self.crop.id).get(kind);
        let running = !previous;
        let entry = self
            .logger
            .manual_entry(kind, running, snapshot, self.latest_decision.as_ref());

        store.set_crop_control(self.crop.id, kind, running)?;
        if let Err(e) = store.add_crop_history(entry) {
            tracing::warn!(
                crop_id = self.crop.id,
                control = %kind,
                error = %e,
                "History write failed, restoring control flag"
            );
            store.set_crop_control(self.crop.id, kind, previous)?;
            return Err(e);
        }

        tracing::info!(crop_id = self.crop.id, control = %kind, running, "Manual control toggled");
        Ok(running)
    }

    /// Stop the sensor feed. Readings already queued are discarded.
    pub fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }
}

impl Drop for CropMonitor {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::logic::sensor_feed::SensorSimulator;
    use crate::models::{ActionTaken, NewCrop, NewFarm};
    use std::time::Duration;

    fn setup() -> (AppStore, Crop) {
        let (store, crop, _) = setup_with_db();
        (store, crop)
    }

    fn setup_with_db() -> (AppStore, Crop, Database) {
        let db = Database::open_in_memory().unwrap();
        let mut store = AppStore::load(db.clone()).unwrap();
        let farm_id = store.add_farm(NewFarm::new("Farm")).unwrap();
        let crop_id = store
            .add_crop(NewCrop::new(
                farm_id,
                "Plot",
                "Maize",
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            ))
            .unwrap();
        let crop = store.get_crop(crop_id).unwrap().clone();
        (store, crop, db)
    }

    fn set_history_table(db: &Database, available: bool) {
        let sql = if available {
            "ALTER TABLE crop_history_offline RENAME TO crop_history"
        } else {
            "ALTER TABLE crop_history RENAME TO crop_history_offline"
        };
        db.with_conn(|conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
        .unwrap();
    }

    fn reading(moisture: f64) -> SensorSnapshot {
        SensorSnapshot::new(moisture, 6.5, 200.0)
    }

    #[test]
    fn first_reading_seeds_without_logging() {
        let (mut store, crop) = setup();
        let mut monitor = CropMonitor::new(&crop);

        monitor.on_snapshot(&mut store, reading(45.0)).unwrap();
        assert!(store.crop_history(crop.id).is_empty());
        assert!(monitor.latest_decision().is_some());

        monitor.on_snapshot(&mut store, reading(20.0)).unwrap();
        let history = store.crop_history(crop.id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action_taken, ActionTaken::Irrigation);
    }

    #[test]
    fn toggle_logs_on_and_off() {
        let (mut store, crop) = setup();
        let mut monitor = CropMonitor::new(&crop);
        monitor.on_snapshot(&mut store, reading(45.0)).unwrap();

        assert!(monitor.handle_irrigation(&mut store).unwrap());
        assert!(store.controls(crop.id).irrigation_running);
        assert!(!monitor.handle_irrigation(&mut store).unwrap());

        let actions: Vec<_> = store
            .crop_history(crop.id)
            .iter()
            .map(|e| e.action_taken)
            .collect();
        assert_eq!(actions, vec![ActionTaken::Irrigation, ActionTaken::NoAction]);
    }

    #[test]
    fn no_auto_entries_while_fertilizing() {
        let (mut store, crop) = setup();
        let mut monitor = CropMonitor::new(&crop);
        monitor.on_snapshot(&mut store, reading(45.0)).unwrap();
        monitor.handle_fertilization(&mut store).unwrap();

        monitor.on_snapshot(&mut store, reading(15.0)).unwrap();
        monitor.on_snapshot(&mut store, reading(55.0)).unwrap();

        let history = store.crop_history(crop.id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action_taken, ActionTaken::Fertilization);
    }

    #[test]
    fn toggle_before_any_reading_fails_cleanly() {
        let (mut store, crop) = setup();
        let mut monitor = CropMonitor::new(&crop);
        assert!(monitor.handle_irrigation(&mut store).is_err());
        assert!(!store.controls(crop.id).irrigation_running);
        assert!(store.crop_history(crop.id).is_empty());
    }

    #[test]
    fn toggle_is_undone_when_history_write_fails() {
        let (mut store, crop, db) = setup_with_db();
        let mut monitor = CropMonitor::new(&crop);
        monitor.on_snapshot(&mut store, reading(45.0)).unwrap();

        set_history_table(&db, false);
        assert!(monitor.handle_irrigation(&mut store).is_err());
        assert!(!store.controls(crop.id).irrigation_running);
        assert!(store.crop_history(crop.id).is_empty());
        let persisted = db.get_all_controls().unwrap();
        assert!(!persisted.get(&crop.id).is_some_and(|f| f.irrigation_running));

        set_history_table(&db, true);
        assert!(monitor.handle_irrigation(&mut store).unwrap());
        assert_eq!(store.crop_history(crop.id).len(), 1);
    }

    #[test]
    fn decision_change_is_retried_after_failed_write() {
        let (mut store, crop, db) = setup_with_db();
        let mut monitor = CropMonitor::new(&crop);
        monitor.on_snapshot(&mut store, reading(45.0)).unwrap();

        set_history_table(&db, false);
        assert!(monitor.on_snapshot(&mut store, reading(20.0)).is_err());
        assert_eq!(monitor.latest_snapshot().map(|s| s.moisture), Some(20.0));

        set_history_table(&db, true);
        monitor.on_snapshot(&mut store, reading(20.0)).unwrap();
        let history = store.crop_history(crop.id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action_taken, ActionTaken::Irrigation);
    }

    #[test]
    fn stage_follows_planting_date() {
        let (_, crop) = setup();
        let monitor = CropMonitor::new(&crop);
        let today = NaiveDate::from_ymd_opt(2024, 6, 6).unwrap();
        assert_eq!(monitor.days_since_planting(today), 5);
        assert_eq!(monitor.stage(today).stage_name, "Planting & Germination");
        assert_eq!(
            monitor.next_stage(today).map(|s| s.stage_name),
            Some("Vegetative Growth")
        );
    }

    #[tokio::test]
    async fn attach_seeds_from_initial_reading() {
        let (mut store, crop) = setup();
        let sim = SensorSimulator::with_seed(&crop.crop_type, 11);
        let (initial, sub) = SensorSubscription::spawn(crop.id, sim, Duration::from_millis(5));

        let mut monitor = CropMonitor::attach(&crop, &mut store, initial, sub).unwrap();
        assert!(monitor.latest_snapshot().is_some());
        assert!(store.crop_history(crop.id).is_empty());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(monitor.poll(&mut store).unwrap());

        monitor.detach();
        assert!(!monitor.poll(&mut store).unwrap());
    }
}
