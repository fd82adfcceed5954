use crate::models::{Decision, FertilizationAction, IrrigationAction, SensorSnapshot};

/// Below this soil moisture (percent) irrigation is recommended.
pub const IRRIGATION_THRESHOLD: f64 = 30.0;

/// Upper bound of the optimal moisture band; above it the soil is wet.
pub const SATURATION_THRESHOLD: f64 = 60.0;

/// Derive the irrigation/fertilization recommendation for a snapshot.
///
/// Fertilization is never recommended: nutrient readings are reported in
/// the explanation but do not drive a fertilization decision yet.
pub fn evaluate(sensors: &SensorSnapshot) -> Decision {
    let irrigation = if sensors.moisture < IRRIGATION_THRESHOLD {
        IrrigationAction::Irrigate
    } else {
        IrrigationAction::DoNotIrrigate
    };
    let fertilization = FertilizationAction::DoNotFertilize;

    let moisture_text = if sensors.moisture < IRRIGATION_THRESHOLD {
        format!(
            "Soil moisture is {:.1}%, below the {:.0}% threshold; irrigate to avoid water stress.",
            sensors.moisture, IRRIGATION_THRESHOLD
        )
    } else if sensors.moisture <= SATURATION_THRESHOLD {
        format!(
            "Soil moisture is {:.1}%, within the optimal {:.0}-{:.0}% band; no irrigation needed.",
            sensors.moisture, IRRIGATION_THRESHOLD, SATURATION_THRESHOLD
        )
    } else {
        format!(
            "Soil moisture is {:.1}%, above {:.0}%; hold irrigation and check drainage.",
            sensors.moisture, SATURATION_THRESHOLD
        )
    };

    let explanation = format!(
        "{} pH {:.1} and NPK {:.0} mg/kg recorded; no fertilizer scheduled.",
        moisture_text, sensors.ph, sensors.npk
    );

    Decision {
        irrigation,
        fertilization,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irrigates_below_threshold() {
        let d = evaluate(&SensorSnapshot::new(29.0, 6.5, 200.0));
        assert_eq!(d.irrigation, IrrigationAction::Irrigate);
    }

    #[test]
    fn threshold_itself_does_not_irrigate() {
        let d = evaluate(&SensorSnapshot::new(30.0, 6.5, 200.0));
        assert_eq!(d.irrigation, IrrigationAction::DoNotIrrigate);

        let d = evaluate(&SensorSnapshot::new(29.99, 6.5, 200.0));
        assert_eq!(d.irrigation, IrrigationAction::Irrigate);
    }

    #[test]
    fn never_fertilizes() {
        for moisture in [0.0, 15.0, 30.0, 45.0, 90.0] {
            let d = evaluate(&SensorSnapshot::new(moisture, 4.0, 0.0));
            assert_eq!(d.fertilization, FertilizationAction::DoNotFertilize);
        }
    }

    #[test]
    fn explanation_references_readings() {
        let d = evaluate(&SensorSnapshot::new(42.3, 6.8, 185.0));
        assert!(d.explanation.contains("42.3%"));
        assert!(d.explanation.contains("optimal"));
        assert!(d.explanation.contains("pH 6.8"));
        assert!(d.explanation.contains("185"));

        let wet = evaluate(&SensorSnapshot::new(75.0, 6.8, 185.0));
        assert!(wet.explanation.contains("drainage"));
    }

    #[test]
    fn evaluate_is_deterministic() {
        let s = SensorSnapshot::new(12.0, 7.1, 90.0);
        assert_eq!(evaluate(&s), evaluate(&s));
    }
}
