//! Static coordinates of the campus buildings that appear in room codes.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Display name and map position of a building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuildingInfo {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

const BUILDINGS: &[(&str, &str, f64, f64)] = &[
    // Fairfax
    ("AB", "Art and Design Building", 38.8285, -77.3094),
    ("ACGC", "Angel Cabrera Global Center", 38.8355, -77.3005),
    ("AFC", "Aquatic and Fitness Center", 38.8263, -77.3115),
    ("AQ", "Aquia Building", 38.8311, -77.3072),
    ("BL", "Blue Ridge Hall", 38.8332, -77.3055),
    ("BUCHAN", "Buchanan Hall", 38.8298, -77.3088),
    ("CAROW", "Carow Hall", 38.8268, -77.3082),
    ("CFA", "Center for the Arts", 38.8290, -77.3089),
    ("CH", "College Hall", 38.8324, -77.3085),
    ("DK", "David J. King Hall", 38.8306, -77.3060),
    ("E", "East Building", 38.8327, -77.3088),
    ("ENGR", "Nguyen Engineering Building", 38.8270, -77.3054),
    ("ENT", "Enterprise Hall", 38.8276, -77.3059),
    ("ESNHWR", "Eisenhower", 38.8340, -77.3060),
    ("ESTSHR", "Eastern Shore", 38.8325, -77.3045),
    ("EXPL", "Exploratory Hall", 38.8288, -77.3059),
    ("FENWCK", "Fenwick Library", 38.8306, -77.3076),
    ("FH", "Field House", 38.8250, -77.3150),
    ("FIELD", "Athletic Fields (West Campus)", 38.8320, -77.3250),
    ("FINLEY", "Finley Building", 38.8320, -77.3080),
    ("HNOVR", "Hanover Hall", 38.8350, -77.3065),
    ("HORIZN", "Horizon Hall", 38.8294, -77.3065),
    ("HR", "Hampton Roads", 38.8335, -77.3040),
    ("HT", "Harris Theater", 38.8300, -77.3085),
    ("HUB", "The Hub", 38.8299, -77.3051),
    ("IN", "Innovation Hall", 38.8282, -77.3073),
    ("JC", "Johnson Center", 38.8299, -77.3074),
    ("KB", "Krasnow Building", 38.8260, -77.3020),
    ("KH", "Krug Hall", 38.8319, -77.3064),
    ("LH", "Lecture Hall", 38.8315, -77.3085),
    ("MAINST", "Main Street (9900 Main Street)", 38.8360, -77.3000),
    ("MERTEN", "Merten Hall", 38.8348, -77.3087),
    ("MTB", "Music Theater Building", 38.8289, -77.3089),
    ("PAB", "de Laski Performing Arts Building", 38.8289, -77.3089),
    ("PETRSN", "Peterson Hall", 38.8335, -77.3081),
    ("PIEDMT", "Piedmont Hall", 38.8328, -77.3035),
    ("PLANET", "Planetary Hall", 38.8283, -77.3053),
    ("RAC", "Recreation Athletic Complex", 38.8305, -77.3130),
    ("ROGER", "Roger Hall", 38.8265, -77.3065),
    ("RSCH", "Research Hall", 38.8276, -77.3049),
    ("SNDBGE", "Sandbridge Hall", 38.8330, -77.3038),
    ("SUBI", "Student Union I", 38.8315, -77.3068),
    ("T", "Thompson Hall", 38.8327, -77.3099),
    ("W", "West Building", 38.8325, -77.3091),
    // Arlington
    ("ARL1", "Hazel Hall", 38.8850, -77.1030),
    ("ARLVM", "Van Metre Hall", 38.8845, -77.1025),
    ("ARLVSH", "Vernon Smith Hall", 38.8842, -77.1020),
    ("ARFUSE", "Fuse at Mason Square", 38.8848, -77.1035),
    // SciTech
    ("PW-ABR", "Advanced Biomedical Research", 38.7580, -77.5220),
    ("PW-CH", "Colgan Hall", 38.7590, -77.5230),
    ("PW-DH", "Discovery Hall", 38.7585, -77.5215),
    ("PW-FC", "Freedom Aquatic Center", 38.7550, -77.5180),
    ("PW-KJH", "Katherine Johnson Hall", 38.7595, -77.5225),
    ("PW-LSEB", "Life Sciences and Engineering", 38.7588, -77.5210),
    // Other
    ("C", "Commerce Building", 38.8500, -77.3000),
    ("OFF_CAMPUS", "Off Campus", 0.0, 0.0),
    ("ON_LINE", "Online", 0.0, 0.0),
];

static BY_CODE: LazyLock<BTreeMap<&'static str, BuildingInfo>> = LazyLock::new(|| {
    BUILDINGS
        .iter()
        .map(|&(code, name, lat, lng)| (code, BuildingInfo { name, lat, lng }))
        .collect()
});

/// Looks up a building by the code used in room ids, e.g. `HORIZN`.
pub fn lookup(code: &str) -> Option<&'static BuildingInfo> {
    BY_CODE.get(code)
}

/// Every known building keyed by code.
pub fn all() -> &'static BTreeMap<&'static str, BuildingInfo> {
    &BY_CODE
}
