//! Static reference content: support schemes, crop insurance and sensor
//! installation steps.

use super::stage_resolver::normalize_crop_type;

#[derive(Debug, Clone, PartialEq)]
pub struct Scheme {
    pub name: &'static str,
    pub summary: &'static str,
    pub eligibility: &'static str,
    pub link: &'static str,
}

pub const SCHEMES: &[Scheme] = &[
    Scheme {
        name: "PM-KISAN",
        summary: "Income support of 6,000 per year paid in three instalments",
        eligibility: "Landholding farmer families with cultivable land in their name",
        link: "https://pmkisan.gov.in",
    },
    Scheme {
        name: "Pradhan Mantri Fasal Bima Yojana",
        summary: "Crop insurance against yield loss from natural calamities, pests and disease",
        eligibility: "All farmers growing notified crops in notified areas",
        link: "https://pmfby.gov.in",
    },
    Scheme {
        name: "Soil Health Card",
        summary: "Free soil testing with nutrient and fertilizer recommendations per plot",
        eligibility: "All farmers",
        link: "https://soilhealth.dac.gov.in",
    },
    Scheme {
        name: "Pradhan Mantri Krishi Sinchayee Yojana",
        summary: "Subsidy for drip and sprinkler irrigation under Per Drop More Crop",
        eligibility: "Farmers and groups with their own water source",
        link: "https://pmksy.gov.in",
    },
    Scheme {
        name: "Kisan Credit Card",
        summary: "Short-term crop credit at concessional interest",
        eligibility: "Owner cultivators, tenant farmers and sharecroppers",
        link: "https://www.myscheme.gov.in/schemes/kcc",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct InsurancePlan {
    pub plan: &'static str,
    pub premium: &'static str,
    pub notes: &'static str,
}

const FOOD_GRAIN_PLAN: InsurancePlan = InsurancePlan {
    plan: "Pradhan Mantri Fasal Bima Yojana",
    premium: "2% of sum insured (kharif), 1.5% (rabi)",
    notes: "Covers sowing failure, standing crop loss and post-harvest loss up to 14 days",
};

const HORTICULTURE_PLAN: InsurancePlan = InsurancePlan {
    plan: "Restructured Weather Based Crop Insurance Scheme",
    premium: "5% of sum insured",
    notes: "Payout triggered by weather indices such as rainfall deficit and temperature",
};

const GENERAL_PLAN: InsurancePlan = InsurancePlan {
    plan: "Pradhan Mantri Fasal Bima Yojana (if notified in your area)",
    premium: "Check with your bank or the local agriculture office",
    notes: "Coverage depends on whether the crop is notified for your district",
};

/// Recommended insurance plan for a crop type.
pub fn recommend_insurance(crop_type: &str) -> &'static InsurancePlan {
    match normalize_crop_type(crop_type).to_lowercase().as_str() {
        "maize" | "wheat" | "rice" => &FOOD_GRAIN_PLAN,
        "tomato" | "potato" => &HORTICULTURE_PLAN,
        _ => &GENERAL_PLAN,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupStep {
    pub title: &'static str,
    pub detail: &'static str,
}

pub const SENSOR_SETUP_STEPS: &[SetupStep] = &[
    SetupStep {
        title: "Choose the probe location",
        detail: "Pick a spot representative of the plot, away from field edges and drip emitters",
    },
    SetupStep {
        title: "Install the moisture probe",
        detail: "Insert the probe vertically into the root zone, 10-15 cm deep",
    },
    SetupStep {
        title: "Install the pH and NPK sensor",
        detail: "Place it within 30 cm of the moisture probe and firm the soil around it",
    },
    SetupStep {
        title: "Mount the ambient sensor",
        detail: "Fix the temperature and humidity sensor in shade about 1.5 m above ground",
    },
    SetupStep {
        title: "Power and connect the gateway",
        detail: "Connect the sensors to the gateway and confirm it reaches the farm network",
    },
    SetupStep {
        title: "Verify readings",
        detail: "Open the crop view and check that moisture, pH and NPK update every few seconds",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insurance_for_grains() {
        assert_eq!(recommend_insurance("Rice").plan, FOOD_GRAIN_PLAN.plan);
        assert_eq!(recommend_insurance("  wheat ").plan, FOOD_GRAIN_PLAN.plan);
    }

    #[test]
    fn insurance_uses_crop_type_normalization() {
        // Onion varieties resolve as maize everywhere
        assert_eq!(recommend_insurance("Wild Onion"), &FOOD_GRAIN_PLAN);
        assert_eq!(recommend_insurance("Wild Tomato"), &HORTICULTURE_PLAN);
    }

    #[test]
    fn insurance_for_unknown_crop() {
        assert_eq!(recommend_insurance("Soybean"), &GENERAL_PLAN);
        assert_eq!(recommend_insurance(""), &GENERAL_PLAN);
    }

    #[test]
    fn static_content_is_populated() {
        assert!(!SCHEMES.is_empty());
        assert!(SCHEMES.iter().all(|s| s.link.starts_with("https://")));
        assert_eq!(SENSOR_SETUP_STEPS.len(), 6);
    }
}
