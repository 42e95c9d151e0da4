use itertools::Itertools;
use uom::si::{angle::degree, f64::Angle};

use crate::model::Location;

/// Typical clear-day figures used by the quick estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceClimate {
    /// Peak global horizontal irradiance [W/m^2]
    pub peak_ghi: f64,
    /// Morning ambient temperature [°C]
    pub base_temperature: f64,
}

#[derive(Debug, PartialEq)]
pub struct Site {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub timezone: &'static str,
    pub latitude: f64,  // [deg]
    pub longitude: f64, // [deg]
    pub climate: Option<ReferenceClimate>,
}

impl Site {
    pub fn location(&self) -> Location {
        Location {
            latitude: Angle::new::<degree>(self.latitude),
            longitude: Angle::new::<degree>(self.longitude),
        }
    }
}

pub static SITES: [Site; 7] = [
    Site {
        key: "sydney",
        name: "Sydney",
        description: "Sydney, New South Wales",
        timezone: "Australia/Sydney",
        latitude: -33.87,
        longitude: 151.21,
        climate: Some(ReferenceClimate {
            peak_ghi: 1045.0,
            base_temperature: 25.0,
        }),
    },
    Site {
        key: "melbourne",
        name: "Melbourne",
        description: "Melbourne, Victoria",
        timezone: "Australia/Melbourne",
        latitude: -37.81,
        longitude: 144.96,
        climate: Some(ReferenceClimate {
            peak_ghi: 985.0,
            base_temperature: 22.0,
        }),
    },
    Site {
        key: "brisbane",
        name: "Brisbane",
        description: "Brisbane, Queensland",
        timezone: "Australia/Brisbane",
        latitude: -27.47,
        longitude: 153.03,
        climate: Some(ReferenceClimate {
            peak_ghi: 1125.0,
            base_temperature: 28.0,
        }),
    },
    Site {
        key: "perth",
        name: "Perth",
        description: "Perth, Western Australia",
        timezone: "Australia/Perth",
        latitude: -31.95,
        longitude: 115.86,
        climate: Some(ReferenceClimate {
            peak_ghi: 1165.0,
            base_temperature: 26.0,
        }),
    },
    Site {
        key: "adelaide",
        name: "Adelaide",
        description: "Adelaide, South Australia",
        timezone: "Australia/Adelaide",
        latitude: -34.93,
        longitude: 138.60,
        climate: Some(ReferenceClimate {
            peak_ghi: 1055.0,
            base_temperature: 24.0,
        }),
    },
    Site {
        key: "darwin",
        name: "Darwin",
        description: "Darwin, Northern Territory",
        timezone: "Australia/Darwin",
        latitude: -12.46,
        longitude: 130.84,
        climate: None,
    },
    Site {
        key: "hobart",
        name: "Hobart",
        description: "Hobart, Tasmania",
        timezone: "Australia/Hobart",
        latitude: -42.88,
        longitude: 147.33,
        climate: None,
    },
];

/// Look up a site by its key, ignoring case.
pub fn find_site(key: &str) -> anyhow::Result<&'static Site> {
    SITES
        .iter()
        .find(|site| site.key.eq_ignore_ascii_case(key.trim()))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Could not find site {:?}, known sites are: {}",
                key,
                SITES.iter().map(|site| site.key).join(", ")
            )
        })
}
