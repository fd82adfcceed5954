/// One lifecycle phase of a crop, keyed by days after sowing.
///
/// Stage tables are compiled into the binary, so every text field is
/// `'static`. `day_start..=day_end` is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthStage {
    pub stage_name: &'static str,
    pub day_start: i64,
    pub day_end: i64,
    pub icon: &'static str,
    pub description: &'static str,
    pub tasks: &'static [&'static str],
    pub irrigation: &'static str,
    pub fertilization: Option<&'static str>,
    pub pest_watch: &'static [&'static str],
    pub observations: &'static [&'static str],
}

impl GrowthStage {
    pub fn contains(&self, day: i64) -> bool {
        self.day_start <= day && day <= self.day_end
    }

    pub fn duration_days(&self) -> i64 {
        self.day_end - self.day_start + 1
    }

    /// Progress through this stage as a 0.0-1.0 ratio, clamped.
    pub fn progress(&self, day: i64) -> f64 {
        let elapsed = (day - self.day_start) as f64;
        (elapsed / self.duration_days() as f64).clamp(0.0, 1.0)
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (day {}-{})",
            self.icon, self.stage_name, self.day_start, self.day_end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> GrowthStage {
        GrowthStage {
            stage_name: "Vegetative",
            day_start: 11,
            day_end: 40,
            icon: "🌿",
            description: "",
            tasks: &[],
            irrigation: "",
            fertilization: None,
            pest_watch: &[],
            observations: &[],
        }
    }

    #[test]
    fn contains_is_inclusive() {
        let s = stage();
        assert!(!s.contains(10));
        assert!(s.contains(11));
        assert!(s.contains(40));
        assert!(!s.contains(41));
    }

    #[test]
    fn progress_is_clamped() {
        let s = stage();
        assert_eq!(s.duration_days(), 30);
        assert_eq!(s.progress(0), 0.0);
        assert!((s.progress(26) - 0.5).abs() < 0.001);
        assert_eq!(s.progress(500), 1.0);
    }
}
