use super::stage_table::{default_stages, stages_for, DEFAULT_CROP_TYPE};
use crate::models::GrowthStage;

/// Map a user-entered crop name onto a stage-table key.
///
/// A leading "wild " is dropped. Any name mentioning onion is mapped to
/// Maize; the onion entries in the crop catalogue share the maize table
/// until they get one of their own.
pub fn normalize_crop_type(crop_type: &str) -> String {
    let trimmed = crop_type.trim();
    let lower = trimmed.to_lowercase();

    if lower.contains("onion") {
        return "Maize".to_string();
    }

    if lower.starts_with("wild ") {
        if let Some(rest) = trimmed.get("wild ".len()..) {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Stage list for a crop type, falling back to the Default table.
pub fn stage_list(crop_type: &str) -> &'static [GrowthStage] {
    let normalized = normalize_crop_type(crop_type);
    stages_for(&normalized).unwrap_or_else(|| {
        tracing::debug!(
            crop_type = %crop_type,
            "No stage table for crop type, using {}",
            DEFAULT_CROP_TYPE
        );
        default_stages()
    })
}

/// Current growth stage for a crop `days_since_planting` days after sowing.
///
/// Days before the first stage resolve to the first stage and days past
/// the maturity ceiling resolve to the last one, so every input yields a
/// stage.
pub fn resolve_stage(crop_type: &str, days_since_planting: i64) -> &'static GrowthStage {
    let stages = stage_list(crop_type);

    if let Some(stage) = stages.iter().find(|s| s.contains(days_since_planting)) {
        return stage;
    }

    // Tables are non-empty by construction
    if days_since_planting < stages[0].day_start {
        &stages[0]
    } else {
        &stages[stages.len() - 1]
    }
}

/// Stage following the current one, if the crop is not yet in its last stage.
pub fn next_stage(crop_type: &str, days_since_planting: i64) -> Option<&'static GrowthStage> {
    let stages = stage_list(crop_type);
    let current = resolve_stage(crop_type, days_since_planting);
    stages
        .iter()
        .position(|s| s.stage_name == current.stage_name)
        .and_then(|i| stages.get(i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_wild_prefix() {
        assert_eq!(normalize_crop_type("Wild Rice"), "Rice");
        assert_eq!(normalize_crop_type("wild tomato"), "tomato");
        assert_eq!(normalize_crop_type("  Wheat "), "Wheat");
    }

    #[test]
    fn onion_variants_map_to_maize() {
        assert_eq!(normalize_crop_type("Onion"), "Maize");
        assert_eq!(normalize_crop_type("Wild Onion"), "Maize");
        assert_eq!(normalize_crop_type("red onion"), "Maize");
    }

    #[test]
    fn wild_onion_day_five_is_maize_germination() {
        let stage = resolve_stage("Wild Onion", 5);
        assert_eq!(stage.stage_name, "Planting & Germination");
    }

    #[test]
    fn unknown_crop_past_ceiling_is_default_maturity() {
        let stage = resolve_stage("Soybean", 200);
        assert_eq!(stage.stage_name, "Maturity");
        assert_eq!(stage.day_end, 150);
    }

    #[test]
    fn negative_days_resolve_to_first_stage() {
        assert_eq!(resolve_stage("Maize", -3).stage_name, "Planting & Germination");
        assert_eq!(resolve_stage("Soybean", -1).stage_name, "Early");
    }

    #[test]
    fn past_ceiling_resolves_to_last_stage() {
        for crop in ["Maize", "Wheat", "Rice", "Tomato", "Potato", "Soybean"] {
            let stages = stage_list(crop);
            let last = stages.last().unwrap();
            assert_eq!(resolve_stage(crop, last.day_end + 1), last);
            assert_eq!(resolve_stage(crop, 10_000), last);
        }
    }

    #[test]
    fn boundaries_resolve_to_their_own_stage() {
        assert_eq!(resolve_stage("Maize", 10).stage_name, "Planting & Germination");
        assert_eq!(resolve_stage("Maize", 11).stage_name, "Vegetative Growth");
        assert_eq!(resolve_stage("Soybean", 30).stage_name, "Early");
        assert_eq!(resolve_stage("Soybean", 31).stage_name, "Mid");
    }

    #[test]
    fn every_day_in_range_resolves() {
        for day in -5..=200 {
            let stage = resolve_stage("Tomato", day);
            assert!(!stage.stage_name.is_empty());
        }
    }

    #[test]
    fn next_stage_is_none_at_the_end() {
        assert_eq!(
            next_stage("Maize", 0).map(|s| s.stage_name),
            Some("Vegetative Growth")
        );
        assert!(next_stage("Maize", 500).is_none());
    }
}
