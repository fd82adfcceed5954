use crate::models::{
    ActionTaken, ControlFlags, ControlKind, Decision, FertilizationAction, HistoryEntry,
    IrrigationAction, SensorSnapshot,
};

/// The parts of an observation that decide whether it is worth logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ObservationKey {
    irrigation: IrrigationAction,
    fertilization: FertilizationAction,
    moisture: i64,
    ph: i64,
}

impl ObservationKey {
    fn new(snapshot: &SensorSnapshot, decision: &Decision) -> Self {
        Self {
            irrigation: decision.irrigation,
            fertilization: decision.fertilization,
            moisture: snapshot.rounded_moisture(),
            ph: snapshot.rounded_ph(),
        }
    }
}

/// Action recorded for an automatic entry.
pub fn auto_action(decision: &Decision) -> ActionTaken {
    if decision.irrigation == IrrigationAction::Irrigate {
        ActionTaken::Irrigation
    } else if decision.fertilization == FertilizationAction::Fertilize {
        ActionTaken::Fertilization
    } else {
        ActionTaken::Delay
    }
}

/// Change-detecting logger for one crop.
///
/// The first observation only seeds the last-seen key. After that, an
/// entry is produced whenever the key changes while no control is running
/// under manual command. The key is updated even when logging is
/// suppressed, so a change that happened during manual control is not
/// logged after the control stops.
#[derive(Debug)]
pub struct HistoryLogger {
    crop_id: i64,
    farm_id: i64,
    last_seen: Option<ObservationKey>,
    // Key in effect before the most recent automatic entry.
    before_entry: Option<ObservationKey>,
}

impl HistoryLogger {
    pub fn new(crop_id: i64, farm_id: i64) -> Self {
        Self {
            crop_id,
            farm_id,
            last_seen: None,
            before_entry: None,
        }
    }

    pub fn observe(
        &mut self,
        snapshot: &SensorSnapshot,
        decision: &Decision,
        controls: ControlFlags,
    ) -> Option<HistoryEntry> {
        let key = ObservationKey::new(snapshot, decision);
        let previous = self.last_seen.replace(key);
        self.before_entry = None;

        match previous {
            None => None,
            Some(prev) if prev == key => None,
            Some(_) if controls.any_running() => {
                tracing::debug!(
                    crop_id = self.crop_id,
                    "Decision changed under manual control, not logging"
                );
                None
            }
            Some(prev) => {
                self.before_entry = Some(prev);
                Some(HistoryEntry::new(
                    self.crop_id,
                    self.farm_id,
                    snapshot.clone(),
                    auto_action(decision),
                    format!("{}. {}", decision.summary(), decision.explanation),
                ))
            }
        }
    }

    /// Forget the change behind the last automatic entry, for when that
    /// entry could not be stored. The next matching observation logs it
    /// again.
    pub fn revert_last_entry(&mut self) {
        if let Some(prev) = self.before_entry.take() {
            self.last_seen = Some(prev);
        }
    }

    /// Entry for a user toggle. Not subject to change detection.
    pub fn manual_entry(
        &self,
        kind: ControlKind,
        turned_on: bool,
        snapshot: &SensorSnapshot,
        decision: Option<&Decision>,
    ) -> HistoryEntry {
        let action = match (kind, turned_on) {
            (ControlKind::Irrigation, true) => ActionTaken::Irrigation,
            (ControlKind::Fertilization, true) => ActionTaken::Fertilization,
            (_, false) => ActionTaken::NoAction,
        };

        let verb = if turned_on { "started" } else { "stopped" };
        let recommendation = match decision {
            Some(d) => format!("Manual {} {} (recommended: {})", kind, verb, d.summary()),
            None => format!("Manual {} {}", kind, verb),
        };

        HistoryEntry::new(
            self.crop_id,
            self.farm_id,
            snapshot.clone(),
            action,
            recommendation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::decision::evaluate;
    use crate::models::Outcome;

    fn observe(
        logger: &mut HistoryLogger,
        moisture: f64,
        controls: ControlFlags,
    ) -> Option<HistoryEntry> {
        let snap = SensorSnapshot::new(moisture, 6.5, 200.0);
        let decision = evaluate(&snap);
        logger.observe(&snap, &decision, controls)
    }

    fn idle() -> ControlFlags {
        ControlFlags::default()
    }

    #[test]
    fn first_observation_only_seeds() {
        let mut logger = HistoryLogger::new(1, 1);
        assert!(observe(&mut logger, 25.0, idle()).is_none());
    }

    #[test]
    fn logs_on_second_distinct_observation() {
        let mut logger = HistoryLogger::new(1, 9);
        assert!(observe(&mut logger, 45.0, idle()).is_none());

        let entry = observe(&mut logger, 25.0, idle()).unwrap();
        assert_eq!(entry.action_taken, ActionTaken::Irrigation);
        assert_eq!(entry.outcome, Outcome::Neutral);
        assert_eq!(entry.farm_id, 9);
        assert!(entry.ai_recommendation.starts_with("Irrigate"));
    }

    #[test]
    fn unchanged_key_is_not_logged() {
        let mut logger = HistoryLogger::new(1, 1);
        observe(&mut logger, 45.0, idle());
        // Rounds to the same integer moisture
        assert!(observe(&mut logger, 45.2, idle()).is_none());
        assert!(observe(&mut logger, 44.6, idle()).is_none());
    }

    #[test]
    fn moisture_change_without_decision_change_is_logged_as_delay() {
        let mut logger = HistoryLogger::new(1, 1);
        observe(&mut logger, 45.0, idle());
        let entry = observe(&mut logger, 50.0, idle()).unwrap();
        assert_eq!(entry.action_taken, ActionTaken::Delay);
    }

    #[test]
    fn suppressed_while_controls_run() {
        let mut logger = HistoryLogger::new(1, 1);
        observe(&mut logger, 45.0, idle());

        let irrigating = ControlFlags {
            irrigation_running: true,
            fertilization_running: false,
        };
        assert!(observe(&mut logger, 20.0, irrigating).is_none());

        let fertilizing = ControlFlags {
            irrigation_running: false,
            fertilization_running: true,
        };
        assert!(observe(&mut logger, 55.0, fertilizing).is_none());
    }

    #[test]
    fn change_seen_under_manual_control_is_not_replayed() {
        let mut logger = HistoryLogger::new(1, 1);
        observe(&mut logger, 45.0, idle());

        let irrigating = ControlFlags {
            irrigation_running: true,
            fertilization_running: false,
        };
        observe(&mut logger, 20.0, irrigating);
        assert!(observe(&mut logger, 20.0, idle()).is_none());
    }

    #[test]
    fn reverted_entry_is_produced_again() {
        let mut logger = HistoryLogger::new(1, 1);
        observe(&mut logger, 45.0, idle());
        assert!(observe(&mut logger, 20.0, idle()).is_some());

        logger.revert_last_entry();
        let entry = observe(&mut logger, 20.0, idle()).unwrap();
        assert_eq!(entry.action_taken, ActionTaken::Irrigation);

        // Only the latest observation can be reverted
        assert!(observe(&mut logger, 20.0, idle()).is_none());
        logger.revert_last_entry();
        assert!(observe(&mut logger, 20.0, idle()).is_none());
    }

    #[test]
    fn manual_toggle_actions() {
        let logger = HistoryLogger::new(3, 4);
        let snap = SensorSnapshot::new(25.0, 6.5, 200.0);
        let decision = evaluate(&snap);

        let on = logger.manual_entry(ControlKind::Irrigation, true, &snap, Some(&decision));
        assert_eq!(on.action_taken, ActionTaken::Irrigation);
        assert!(on.ai_recommendation.contains("Manual irrigation started"));

        let off = logger.manual_entry(ControlKind::Irrigation, false, &snap, Some(&decision));
        assert_eq!(off.action_taken, ActionTaken::NoAction);

        let fert = logger.manual_entry(ControlKind::Fertilization, true, &snap, None);
        assert_eq!(fert.action_taken, ActionTaken::Fertilization);
        assert_eq!(fert.ai_recommendation, "Manual fertilization started");
    }

    #[test]
    fn auto_action_prefers_irrigation() {
        let decision = Decision {
            irrigation: IrrigationAction::Irrigate,
            fertilization: FertilizationAction::Fertilize,
            explanation: String::new(),
        };
        assert_eq!(auto_action(&decision), ActionTaken::Irrigation);

        let decision = Decision {
            irrigation: IrrigationAction::DoNotIrrigate,
            fertilization: FertilizationAction::Fertilize,
            explanation: String::new(),
        };
        assert_eq!(auto_action(&decision), ActionTaken::Fertilization);
    }
}
