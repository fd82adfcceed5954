use super::SensorSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTaken {
    Irrigation,
    Fertilization,
    Delay,
    NoAction,
}

impl ActionTaken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTaken::Irrigation => "irrigation",
            ActionTaken::Fertilization => "fertilization",
            ActionTaken::Delay => "delay",
            ActionTaken::NoAction => "no_action",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "irrigation" => Some(ActionTaken::Irrigation),
            "fertilization" => Some(ActionTaken::Fertilization),
            "delay" => Some(ActionTaken::Delay),
            "no_action" | "noaction" => Some(ActionTaken::NoAction),
            _ => None,
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            ActionTaken::Irrigation => Color::Blue,
            ActionTaken::Fertilization => Color::Green,
            ActionTaken::Delay => Color::Yellow,
            ActionTaken::NoAction => Color::Gray,
        }
    }
}

impl std::fmt::Display for ActionTaken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Neutral,
    Negative,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Neutral => "neutral",
            Outcome::Negative => "negative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "success" => Some(Outcome::Success),
            "neutral" => Some(Outcome::Neutral),
            "negative" => Some(Outcome::Negative),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decision or manual control event recorded against a crop.
///
/// Entries are append-only: the store never edits or removes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub crop_id: i64,
    pub farm_id: i64,
    pub timestamp: DateTime<Utc>,
    pub sensors: SensorSnapshot,
    pub action_taken: ActionTaken,
    pub ai_recommendation: String,
    pub outcome: Outcome,
}

impl HistoryEntry {
    pub fn new(
        crop_id: i64,
        farm_id: i64,
        sensors: SensorSnapshot,
        action_taken: ActionTaken,
        ai_recommendation: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            crop_id,
            farm_id,
            timestamp: Utc::now(),
            sensors,
            action_taken,
            ai_recommendation: ai_recommendation.into(),
            outcome: Outcome::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_taken_from_str() {
        assert_eq!(
            ActionTaken::from_str("irrigation"),
            Some(ActionTaken::Irrigation)
        );
        assert_eq!(
            ActionTaken::from_str("no_action"),
            Some(ActionTaken::NoAction)
        );
        assert_eq!(
            ActionTaken::from_str("No Action"),
            Some(ActionTaken::NoAction)
        );
        assert_eq!(ActionTaken::from_str("spray"), None);
    }

    #[test]
    fn new_entry_is_neutral_with_unique_id() {
        let snap = SensorSnapshot::new(25.0, 6.5, 200.0);
        let a = HistoryEntry::new(1, 2, snap.clone(), ActionTaken::Delay, "Do not irrigate");
        let b = HistoryEntry::new(1, 2, snap, ActionTaken::Delay, "Do not irrigate");

        assert_eq!(a.outcome, Outcome::Neutral);
        assert_eq!(a.crop_id, 1);
        assert_eq!(a.farm_id, 2);
        assert_ne!(a.id, b.id);
    }
}
