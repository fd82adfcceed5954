//! Static growth-stage tables, one ordered list per crop type.
//!
//! Every list starts at day 0 and its ranges are contiguous. The last
//! stage's `day_end` is the maturity ceiling; later days resolve to it.

use crate::models::GrowthStage;

pub const KNOWN_CROP_TYPES: &[&str] = &["Maize", "Wheat", "Rice", "Tomato", "Potato"];

pub const DEFAULT_CROP_TYPE: &str = "Default";

/// Stage list for an already-normalized crop type, if one is known.
pub fn stages_for(crop_type: &str) -> Option<&'static [GrowthStage]> {
    match crop_type.to_lowercase().as_str() {
        "maize" => Some(MAIZE),
        "wheat" => Some(WHEAT),
        "rice" => Some(RICE),
        "tomato" => Some(TOMATO),
        "potato" => Some(POTATO),
        _ => None,
    }
}

pub fn default_stages() -> &'static [GrowthStage] {
    DEFAULT
}

static MAIZE: &[GrowthStage] = &[
    GrowthStage {
        stage_name: "Planting & Germination",
        day_start: 0,
        day_end: 10,
        icon: "🌱",
        description: "Seed absorbs water, radicle and coleoptile emerge.",
        tasks: &[
            "Check seeding depth (4-5 cm)",
            "Confirm even emergence across rows",
            "Fill gaps where stand is thin",
        ],
        irrigation: "Keep topsoil moist; light irrigation every 3-4 days if dry.",
        fertilization: Some("Apply basal NPK at sowing if not done."),
        pest_watch: &["Cutworms", "Seedcorn maggot"],
        observations: &["Emergence percentage", "Crusting on soil surface"],
    },
    GrowthStage {
        stage_name: "Vegetative Growth",
        day_start: 11,
        day_end: 45,
        icon: "🌿",
        description: "Rapid leaf development from V3 to V12; root system expands.",
        tasks: &["Weed control between rows", "Earth up around stems"],
        irrigation: "Irrigate when top 5 cm is dry; avoid waterlogging.",
        fertilization: Some("Top-dress nitrogen at knee height."),
        pest_watch: &["Fall armyworm", "Stem borer"],
        observations: &["Leaf colour (yellowing means N deficiency)", "Plant height"],
    },
    GrowthStage {
        stage_name: "Tasseling & Silking",
        day_start: 46,
        day_end: 65,
        icon: "🌾",
        description: "Tassels shed pollen and silks emerge; the most water-sensitive stage.",
        tasks: &["Scout for silk clipping", "Avoid field traffic during pollination"],
        irrigation: "Critical stage: do not let soil moisture drop below 40%.",
        fertilization: None,
        pest_watch: &["Corn earworm", "Aphids on tassels"],
        observations: &["Silk emergence date", "Pollen shed"],
    },
    GrowthStage {
        stage_name: "Grain Filling",
        day_start: 66,
        day_end: 100,
        icon: "🌽",
        description: "Kernels progress from blister to dent as starch accumulates.",
        tasks: &["Monitor ear fill", "Plan harvest logistics"],
        irrigation: "Maintain moderate moisture until dent stage, then taper off.",
        fertilization: None,
        pest_watch: &["Ear rot", "Birds"],
        observations: &["Kernel milk line", "Husk colour"],
    },
    GrowthStage {
        stage_name: "Maturity & Harvest",
        day_start: 101,
        day_end: 120,
        icon: "🧺",
        description: "Black layer forms; grain dries down in the field.",
        tasks: &["Check grain moisture", "Harvest at 20-25% moisture"],
        irrigation: "Stop irrigation.",
        fertilization: None,
        pest_watch: &["Storage weevils"],
        observations: &["Black layer formation", "Grain moisture"],
    },
];

static WHEAT: &[GrowthStage] = &[
    GrowthStage {
        stage_name: "Germination & Emergence",
        day_start: 0,
        day_end: 15,
        icon: "🌱",
        description: "Seedlings break the surface and the first leaf unfolds.",
        tasks: &["Check stand density", "Roll soil if cloddy"],
        irrigation: "Pre-sowing irrigation is usually enough; irrigate if soil crusts.",
        fertilization: Some("Apply half the nitrogen with full P and K at sowing."),
        pest_watch: &["Termites", "Shoot fly"],
        observations: &["Emergence uniformity"],
    },
    GrowthStage {
        stage_name: "Tillering",
        day_start: 16,
        day_end: 45,
        icon: "🌿",
        description: "Side shoots form; crown root initiation sets yield potential.",
        tasks: &["First weeding", "Herbicide application if needed"],
        irrigation: "Irrigate at crown root initiation (around day 21).",
        fertilization: Some("Top-dress remaining nitrogen after first irrigation."),
        pest_watch: &["Aphids", "Pink stem borer"],
        observations: &["Tillers per plant"],
    },
    GrowthStage {
        stage_name: "Stem Extension & Booting",
        day_start: 46,
        day_end: 75,
        icon: "🎋",
        description: "Internodes elongate and the head swells inside the flag leaf sheath.",
        tasks: &["Scout for rust", "Check lodging risk"],
        irrigation: "Irrigate at jointing and booting.",
        fertilization: None,
        pest_watch: &["Yellow rust", "Powdery mildew"],
        observations: &["Flag leaf health"],
    },
    GrowthStage {
        stage_name: "Heading & Flowering",
        day_start: 76,
        day_end: 95,
        icon: "🌾",
        description: "Ears emerge and anthesis occurs.",
        tasks: &["Avoid spraying during anthesis"],
        irrigation: "Irrigate at flowering; moisture stress now cuts grain number.",
        fertilization: None,
        pest_watch: &["Head blight", "Armyworm"],
        observations: &["Date of 50% heading"],
    },
    GrowthStage {
        stage_name: "Grain Fill & Ripening",
        day_start: 96,
        day_end: 125,
        icon: "🧺",
        description: "Grain moves through milk and dough stages to hard ripe.",
        tasks: &["Plan harvest", "Arrange storage"],
        irrigation: "Last irrigation at milk stage; stop afterwards.",
        fertilization: None,
        pest_watch: &["Birds", "Storage pests"],
        observations: &["Grain hardness"],
    },
];

static RICE: &[GrowthStage] = &[
    GrowthStage {
        stage_name: "Seedling",
        day_start: 0,
        day_end: 20,
        icon: "🌱",
        description: "Nursery growth until transplanting.",
        tasks: &["Maintain nursery bed", "Transplant at 3-4 leaves"],
        irrigation: "Keep nursery saturated without standing water over seedlings.",
        fertilization: Some("Light nitrogen dose in nursery."),
        pest_watch: &["Thrips"],
        observations: &["Seedling vigour"],
    },
    GrowthStage {
        stage_name: "Tillering",
        day_start: 21,
        day_end: 50,
        icon: "🌿",
        description: "Tillers form after transplanting.",
        tasks: &["Gap filling", "Weed control"],
        irrigation: "Maintain 2-5 cm standing water.",
        fertilization: Some("Top-dress nitrogen at active tillering."),
        pest_watch: &["Stem borer", "Leaf folder"],
        observations: &["Tillers per hill"],
    },
    GrowthStage {
        stage_name: "Panicle Initiation & Booting",
        day_start: 51,
        day_end: 75,
        icon: "🎋",
        description: "Panicle forms inside the stem.",
        tasks: &["Scout for blast"],
        irrigation: "Keep field flooded; do not allow drying.",
        fertilization: Some("Final nitrogen split at panicle initiation."),
        pest_watch: &["Blast", "Brown planthopper"],
        observations: &["Panicle length"],
    },
    GrowthStage {
        stage_name: "Flowering",
        day_start: 76,
        day_end: 90,
        icon: "🌾",
        description: "Panicles emerge and spikelets open.",
        tasks: &["Avoid disturbance during anthesis"],
        irrigation: "Maintain standing water.",
        fertilization: None,
        pest_watch: &["Gundhi bug", "False smut"],
        observations: &["Spikelet fertility"],
    },
    GrowthStage {
        stage_name: "Ripening",
        day_start: 91,
        day_end: 120,
        icon: "🧺",
        description: "Grain filling through dough to mature grain.",
        tasks: &["Drain field 10 days before harvest", "Plan harvest"],
        irrigation: "Drain and stop irrigation before harvest.",
        fertilization: None,
        pest_watch: &["Rats", "Birds"],
        observations: &["Grain colour", "Grain moisture"],
    },
];

static TOMATO: &[GrowthStage] = &[
    GrowthStage {
        stage_name: "Seedling",
        day_start: 0,
        day_end: 20,
        icon: "🌱",
        description: "Seedlings establish after transplanting.",
        tasks: &["Stake young plants", "Replace failed transplants"],
        irrigation: "Light, frequent watering to settle roots.",
        fertilization: Some("Starter fertilizer high in phosphorus."),
        pest_watch: &["Damping off", "Cutworms"],
        observations: &["Transplant survival"],
    },
    GrowthStage {
        stage_name: "Vegetative",
        day_start: 21,
        day_end: 45,
        icon: "🌿",
        description: "Stem and foliage growth before first flower trusses.",
        tasks: &["Prune suckers", "Tie to stakes"],
        irrigation: "Deep watering twice a week.",
        fertilization: Some("Side-dress nitrogen."),
        pest_watch: &["Whitefly", "Leaf miner"],
        observations: &["Leaf curl symptoms"],
    },
    GrowthStage {
        stage_name: "Flowering",
        day_start: 46,
        day_end: 65,
        icon: "🌼",
        description: "Flower trusses open; fruit set begins.",
        tasks: &["Gentle shaking to aid pollination"],
        irrigation: "Keep moisture even to avoid blossom drop.",
        fertilization: Some("Potassium-rich feed."),
        pest_watch: &["Thrips", "Early blight"],
        observations: &["Flowers per truss"],
    },
    GrowthStage {
        stage_name: "Fruit Set & Development",
        day_start: 66,
        day_end: 90,
        icon: "🍅",
        description: "Fruits enlarge on the vine.",
        tasks: &["Remove lower leaves", "Mulch to keep fruit off soil"],
        irrigation: "Consistent watering to prevent cracking and blossom-end rot.",
        fertilization: Some("Calcium supplement if blossom-end rot appears."),
        pest_watch: &["Fruit borer", "Late blight"],
        observations: &["Fruit size", "Cracking"],
    },
    GrowthStage {
        stage_name: "Ripening & Harvest",
        day_start: 91,
        day_end: 120,
        icon: "🧺",
        description: "Fruits colour up and are picked in successive harvests.",
        tasks: &["Harvest at breaker stage for transport"],
        irrigation: "Reduce watering slightly to improve flavour.",
        fertilization: None,
        pest_watch: &["Fruit flies"],
        observations: &["Colour stage"],
    },
];

static POTATO: &[GrowthStage] = &[
    GrowthStage {
        stage_name: "Sprouting",
        day_start: 0,
        day_end: 15,
        icon: "🌱",
        description: "Sprouts develop from seed tubers and emerge.",
        tasks: &["Check emergence", "Ridge soil lightly"],
        irrigation: "Light irrigation only if soil is dry; seed tubers rot in wet soil.",
        fertilization: Some("Full basal dose at planting."),
        pest_watch: &["Cutworms"],
        observations: &["Emergence uniformity"],
    },
    GrowthStage {
        stage_name: "Vegetative",
        day_start: 16,
        day_end: 35,
        icon: "🌿",
        description: "Leaves and stems develop; stolons form.",
        tasks: &["Earthing up", "Weeding"],
        irrigation: "Irrigate every 7-10 days.",
        fertilization: Some("Top-dress nitrogen at earthing up."),
        pest_watch: &["Aphids"],
        observations: &["Canopy cover"],
    },
    GrowthStage {
        stage_name: "Tuber Initiation",
        day_start: 36,
        day_end: 50,
        icon: "🥔",
        description: "Tubers begin forming at stolon tips.",
        tasks: &["Scout for late blight"],
        irrigation: "Critical stage: keep soil evenly moist.",
        fertilization: None,
        pest_watch: &["Late blight", "Tuber moth"],
        observations: &["Tubers per plant"],
    },
    GrowthStage {
        stage_name: "Tuber Bulking",
        day_start: 51,
        day_end: 90,
        icon: "🥔",
        description: "Tubers enlarge rapidly.",
        tasks: &["Maintain ridges to cover tubers"],
        irrigation: "Highest water demand; irrigate every 5-7 days.",
        fertilization: None,
        pest_watch: &["Late blight", "White grubs"],
        observations: &["Greening of exposed tubers"],
    },
    GrowthStage {
        stage_name: "Maturation",
        day_start: 91,
        day_end: 110,
        icon: "🧺",
        description: "Vines senesce and tuber skins set.",
        tasks: &["Cut haulms 10-15 days before harvest"],
        irrigation: "Stop irrigation two weeks before harvest.",
        fertilization: None,
        pest_watch: &["Storage rot"],
        observations: &["Skin set"],
    },
];

static DEFAULT: &[GrowthStage] = &[
    GrowthStage {
        stage_name: "Early",
        day_start: 0,
        day_end: 30,
        icon: "🌱",
        description: "Establishment phase after sowing.",
        tasks: &["Check emergence", "Control early weeds"],
        irrigation: "Keep soil moist for establishment.",
        fertilization: Some("Apply basal fertilizer if not done."),
        pest_watch: &["Seedling pests"],
        observations: &["Stand count"],
    },
    GrowthStage {
        stage_name: "Mid",
        day_start: 31,
        day_end: 90,
        icon: "🌿",
        description: "Active vegetative and reproductive growth.",
        tasks: &["Scout regularly", "Weed control"],
        irrigation: "Irrigate when the top few centimetres are dry.",
        fertilization: Some("Top-dress according to soil test."),
        pest_watch: &["Leaf-feeding insects", "Fungal disease"],
        observations: &["Canopy colour", "Flowering"],
    },
    GrowthStage {
        stage_name: "Maturity",
        day_start: 91,
        day_end: 150,
        icon: "🧺",
        description: "Crop ripens and approaches harvest.",
        tasks: &["Plan harvest", "Prepare storage"],
        irrigation: "Taper off irrigation.",
        fertilization: None,
        pest_watch: &["Storage pests"],
        observations: &["Harvest readiness"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(name: &str, stages: &[GrowthStage]) {
        assert!(!stages.is_empty(), "{} has no stages", name);
        assert_eq!(stages[0].day_start, 0, "{} does not start at day 0", name);
        for stage in stages {
            assert!(
                stage.day_start <= stage.day_end,
                "{}: {} has an inverted range",
                name,
                stage.stage_name
            );
        }
        for pair in stages.windows(2) {
            assert_eq!(
                pair[0].day_end + 1,
                pair[1].day_start,
                "{}: gap or overlap between {} and {}",
                name,
                pair[0].stage_name,
                pair[1].stage_name
            );
        }
    }

    #[test]
    fn known_tables_are_contiguous() {
        for crop in KNOWN_CROP_TYPES {
            let stages = stages_for(crop).unwrap();
            assert_contiguous(crop, stages);
        }
        assert_contiguous(DEFAULT_CROP_TYPE, default_stages());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(stages_for("maize").is_some());
        assert!(stages_for("TOMATO").is_some());
        assert!(stages_for("Soybean").is_none());
    }

    #[test]
    fn default_table_has_three_stages() {
        let names: Vec<_> = default_stages().iter().map(|s| s.stage_name).collect();
        assert_eq!(names, vec!["Early", "Mid", "Maturity"]);
        assert_eq!(default_stages().last().unwrap().day_end, 150);
    }
}
