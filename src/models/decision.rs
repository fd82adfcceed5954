use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrrigationAction {
    Irrigate,
    DoNotIrrigate,
}

impl IrrigationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationAction::Irrigate => "Irrigate",
            IrrigationAction::DoNotIrrigate => "Do not irrigate",
        }
    }
}

impl std::fmt::Display for IrrigationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FertilizationAction {
    Fertilize,
    DoNotFertilize,
}

impl FertilizationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FertilizationAction::Fertilize => "Fertilize",
            FertilizationAction::DoNotFertilize => "Do not fertilize",
        }
    }
}

impl std::fmt::Display for FertilizationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub irrigation: IrrigationAction,
    pub fertilization: FertilizationAction,
    pub explanation: String,
}

impl Decision {
    /// Short form used as the recommendation text in history entries.
    pub fn summary(&self) -> String {
        format!("{}; {}", self.irrigation, self.fertilization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_joins_both_actions() {
        let d = Decision {
            irrigation: IrrigationAction::Irrigate,
            fertilization: FertilizationAction::DoNotFertilize,
            explanation: String::new(),
        };
        assert_eq!(d.summary(), "Irrigate; Do not fertilize");
    }
}
