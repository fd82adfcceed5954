use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Irrigation,
    Fertilization,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Irrigation => "irrigation",
            ControlKind::Fertilization => "fertilization",
        }
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFlags {
    pub irrigation_running: bool,
    pub fertilization_running: bool,
}

impl ControlFlags {
    pub fn get(&self, kind: ControlKind) -> bool {
        match kind {
            ControlKind::Irrigation => self.irrigation_running,
            ControlKind::Fertilization => self.fertilization_running,
        }
    }

    pub fn set(&mut self, kind: ControlKind, value: bool) {
        match kind {
            ControlKind::Irrigation => self.irrigation_running = value,
            ControlKind::Fertilization => self.fertilization_running = value,
        }
    }

    /// True when any control is running under manual command.
    pub fn any_running(&self) -> bool {
        self.irrigation_running || self.fertilization_running
    }
}
