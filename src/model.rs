use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use uom::si::{
    angle::degree,
    f64::{Angle, Area, Power},
};

use crate::power::ModuleParameters;
use crate::sites::{find_site, Site};
use crate::tools::sun::BeamClipping;
use crate::tools::{check_range, wrap_degrees};

pub const DEFAULT_HOUR_OF_DAY: f64 = 12.0;
pub const DEFAULT_CLEARNESS_INDEX: f64 = 0.75;
pub const DEFAULT_ALBEDO: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub latitude: Angle,
    pub longitude: Angle,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        Ok(Location {
            latitude: Angle::new::<degree>(check_range("latitude", latitude, -90.0, 90.0)?),
            longitude: Angle::new::<degree>(check_range("longitude", longitude, -180.0, 180.0)?),
        })
    }
}

/// Orientation of the panels. Azimuth is measured clockwise from south,
/// so 180 degrees faces the equator for sites in the southern hemisphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelOrientation {
    pub tilt: Angle,
    pub azimuth: Angle,
}

impl PanelOrientation {
    pub fn new(tilt: f64, azimuth: f64) -> anyhow::Result<Self> {
        let tilt = check_range("tilt", tilt, 0.0, 90.0)?;
        if !azimuth.is_finite() {
            anyhow::bail!("azimuth must be a finite number, got {}", azimuth)
        }
        Ok(PanelOrientation {
            tilt: Angle::new::<degree>(tilt),
            azimuth: Angle::new::<degree>(wrap_degrees(azimuth)),
        })
    }
}

/// Rectangular array of identical panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayConfig {
    pub width_panels: u32,
    pub height_panels: u32,
}

impl ArrayConfig {
    pub fn new(width_panels: u32, height_panels: u32) -> anyhow::Result<Self> {
        if width_panels == 0 || height_panels == 0 {
            anyhow::bail!(
                "Array must have at least one panel in each direction, got {}x{}",
                width_panels,
                height_panels
            )
        }
        Ok(ArrayConfig {
            width_panels,
            height_panels,
        })
    }

    pub fn panel_count(&self) -> u32 {
        self.width_panels * self.height_panels
    }

    pub fn total_area(&self, module: &ModuleParameters) -> Area {
        f64::from(self.panel_count()) * module.panel_area
    }

    /// Nameplate DC capacity of the whole array
    pub fn capacity(&self, module: &ModuleParameters) -> Power {
        f64::from(self.panel_count()) * module.nameplate_power
    }
}

/// Snapshot of every parameter a computation needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub site: Option<&'static Site>,
    pub location: Location,
    pub orientation: PanelOrientation,
    pub array: ArrayConfig,
    pub module: ModuleParameters,
    pub day_of_year: u32,
    pub hour_of_day: f64,
    pub clearness_index: f64,
    pub albedo: f64,
    pub beam_clipping: BeamClipping,
}

impl Scenario {
    /// Create a scenario with the default sky, module and clipping settings.
    pub fn new(
        location: Location,
        orientation: PanelOrientation,
        array: ArrayConfig,
        day_of_year: u32,
        hour_of_day: f64,
    ) -> anyhow::Result<Self> {
        if !(1..=365).contains(&day_of_year) {
            anyhow::bail!("day of year {} is outside [1, 365]", day_of_year)
        }
        Ok(Scenario {
            site: None,
            location,
            orientation,
            array,
            module: ModuleParameters::default(),
            day_of_year,
            hour_of_day: check_range("hour of day", hour_of_day, 0.0, 24.0)?,
            clearness_index: DEFAULT_CLEARNESS_INDEX,
            albedo: DEFAULT_ALBEDO,
            beam_clipping: BeamClipping::default(),
        })
    }

    /// Create a scenario for one of the named sites.
    pub fn for_site(
        site_key: &str,
        orientation: PanelOrientation,
        array: ArrayConfig,
        day_of_year: u32,
        hour_of_day: f64,
    ) -> anyhow::Result<Self> {
        let site = find_site(site_key)?;
        let mut scenario = Scenario::new(site.location(), orientation, array, day_of_year, hour_of_day)?;
        scenario.site = Some(site);
        Ok(scenario)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let string = fs::read_to_string(path)?;
        Self::from_json(&string)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let loaded: as_loaded::Scenario = json5::from_str(json)?;
        let converted = loaded.try_into()?;
        Ok(converted)
    }
}

impl TryFrom<as_loaded::Scenario> for Scenario {
    type Error = anyhow::Error;
    fn try_from(value: as_loaded::Scenario) -> Result<Self, Self::Error> {
        let day_of_year = match (value.day_of_year, value.date) {
            (Some(day_of_year), None) => day_of_year,
            (None, Some(date)) => day_of_year_from_date(&date)?,
            (Some(_), Some(_)) => {
                anyhow::bail!("Scenario must give either day_of_year or date, not both")
            }
            (None, None) => anyhow::bail!("Scenario must give day_of_year or date"),
        };

        value.module.check()?;

        let orientation = PanelOrientation::new(value.orientation.tilt, value.orientation.azimuth)?;
        let array = ArrayConfig::new(value.array.width, value.array.height)?;
        let mut scenario = match value.location {
            as_loaded::Location::Site { site } => {
                Scenario::for_site(&site, orientation, array, day_of_year, value.hour_of_day)?
            }
            as_loaded::Location::Coordinates {
                latitude,
                longitude,
            } => Scenario::new(
                Location::new(latitude, longitude)?,
                orientation,
                array,
                day_of_year,
                value.hour_of_day,
            )?,
        };
        scenario.module = value.module;
        scenario.clearness_index = check_range("clearness index", value.clearness_index, 0.0, 1.0)?;
        scenario.albedo = check_range("albedo", value.albedo, 0.0, 1.0)?;
        scenario.beam_clipping = value.beam_clipping;
        Ok(scenario)
    }
}

/// Ordinal day of a `YYYY-MM-DD` date. The last day of a leap year maps to 365.
fn day_of_year_from_date(date: &str) -> anyhow::Result<u32> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Could not parse date {:?}: {}", date, e))?;
    Ok(parsed.ordinal().min(365))
}

mod as_loaded {
    use serde::Deserialize;

    use crate::power::ModuleParameters;
    use crate::tools::sun::BeamClipping;

    #[derive(Clone, Debug, Deserialize)]
    pub struct Scenario {
        pub location: Location,
        pub orientation: Orientation,
        pub array: Array,
        pub day_of_year: Option<u32>,
        pub date: Option<String>,
        #[serde(default = "default_hour_of_day")]
        pub hour_of_day: f64,
        #[serde(default = "default_clearness_index")]
        pub clearness_index: f64,
        #[serde(default = "default_albedo")]
        pub albedo: f64,
        #[serde(default)]
        pub beam_clipping: BeamClipping,
        #[serde(default)]
        pub module: ModuleParameters,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq)]
    #[serde(untagged)]
    pub enum Location {
        Site { site: String },
        Coordinates { latitude: f64, longitude: f64 },
    }

    #[derive(Clone, Debug, Deserialize, PartialEq)]
    pub struct Orientation {
        pub tilt: f64,
        pub azimuth: f64,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq)]
    pub struct Array {
        pub width: u32,
        pub height: u32,
    }

    fn default_hour_of_day() -> f64 {
        super::DEFAULT_HOUR_OF_DAY
    }

    fn default_clearness_index() -> f64 {
        super::DEFAULT_CLEARNESS_INDEX
    }

    fn default_albedo() -> f64 {
        super::DEFAULT_ALBEDO
    }
}
