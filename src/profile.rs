use std::fmt;

use log::debug;
use uom::si::{
    angle::degree,
    area::square_meter,
    energy::kilowatt_hour,
    f64::{Angle, Area, Energy, HeatFluxDensity, Power, Ratio, Time},
    heat_flux_density::watt_per_square_meter,
    power::{kilowatt, watt},
    ratio::{percent, ratio},
    time::hour,
};

use crate::irradiance::{Irradiance, PlaneOfArrayIrradiance};
use crate::model::Scenario;
use crate::power::get_ac_power;
use crate::tools::sun::{get_angle_of_incidence, solar_position, SolarPosition};

pub const FIRST_HOUR: u32 = 6;
pub const LAST_HOUR: u32 = 18;

// fixed approximation, not derived from sunrise and sunset
const ASSUMED_DAYLIGHT_HOURS: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Model outputs for a single instant of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample {
    pub hour_of_day: f64,
    pub position: SolarPosition,
    pub angle_of_incidence: Angle,
    /// None while the sun is below the horizon
    pub irradiance: Option<Irradiance>,
    pub plane_of_array: Option<PlaneOfArrayIrradiance>,
    pub ac_power: Power,
}

impl HourlySample {
    pub fn poa_global(&self) -> HeatFluxDensity {
        self.plane_of_array
            .map(|poa| poa.global())
            .unwrap_or_else(|| HeatFluxDensity::new::<watt_per_square_meter>(0.0))
    }

    /// AC output relative to the irradiance falling on the array
    pub fn system_efficiency(&self, array_area: Area) -> Ratio {
        let incident = self.poa_global().get::<watt_per_square_meter>() * array_area.get::<square_meter>();
        if incident > 0.0 {
            Ratio::new::<ratio>(self.ac_power.get::<watt>() / incident)
        } else {
            Ratio::new::<ratio>(0.0)
        }
    }
}

/// Evaluate the whole chain for one time of the day. Irradiance is only
/// computed when the sun is above the horizon, otherwise the power is zero.
///
/// # Arguments
/// * `scenario` - parameter snapshot
/// * `hour_of_day` - solar time in hours
///
/// # Returns
/// * `HourlySample` - sun position, irradiance and AC power
pub fn get_sample(scenario: &Scenario, hour_of_day: f64) -> anyhow::Result<HourlySample> {
    let position = solar_position(&scenario.location, scenario.day_of_year, hour_of_day)?;
    let angle_of_incidence =
        get_angle_of_incidence(&position, &scenario.orientation, scenario.beam_clipping);

    if !position.is_above_horizon() {
        return Ok(HourlySample {
            hour_of_day,
            position,
            angle_of_incidence,
            irradiance: None,
            plane_of_array: None,
            ac_power: Power::new::<watt>(0.0),
        });
    }

    let irradiance = Irradiance::clear_sky(&position.elevation, scenario.clearness_index)?;
    let plane_of_array = irradiance.get_plane_of_array(
        &angle_of_incidence,
        &scenario.orientation.tilt,
        scenario.albedo,
    );
    let ac_power = get_ac_power(plane_of_array.global(), &scenario.array, &scenario.module);

    Ok(HourlySample {
        hour_of_day,
        position,
        angle_of_incidence,
        irradiance: Some(irradiance),
        plane_of_array: Some(plane_of_array),
        ac_power,
    })
}

/// Which per-hour value to plot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    /// AC power [kW]
    Power,
    /// Plane of array irradiance [W/m^2]
    Irradiance,
    /// System efficiency [%]
    Efficiency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyProfile {
    pub samples: Vec<HourlySample>,
    pub capacity: Power,
    pub array_area: Area,
    pub daily_energy: Energy,
    pub peak_power: Power,
    pub capacity_factor: Ratio,
    /// Daily energy scaled to a full year, ignoring seasons
    pub annual_yield: Energy,
}

impl DailyProfile {
    pub fn series(&self, series: Series) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .map(|sample| {
                let value = match series {
                    Series::Power => sample.ac_power.get::<kilowatt>(),
                    Series::Irradiance => sample.poa_global().get::<watt_per_square_meter>(),
                    Series::Efficiency => sample.system_efficiency(self.array_area).get::<percent>(),
                };
                (sample.hour_of_day, value)
            })
            .collect()
    }
}

/// Sweep the model over whole hours from 6:00 to 18:00 and reduce the result.
/// Each sample stands for a one hour interval.
pub fn get_daily_profile(scenario: &Scenario) -> anyhow::Result<DailyProfile> {
    let capacity = scenario.array.capacity(&scenario.module);
    let interval = Time::new::<hour>(1.0);

    let mut samples = Vec::with_capacity((LAST_HOUR - FIRST_HOUR + 1) as usize);
    let mut daily_energy = Energy::new::<kilowatt_hour>(0.0);
    let mut peak_power = Power::new::<kilowatt>(0.0);

    for hour_of_day in FIRST_HOUR..=LAST_HOUR {
        let sample = get_sample(scenario, f64::from(hour_of_day))?;
        debug!(
            "{:02}:00 elevation {:.1} deg, aoi {:.1} deg, poa {:.1} W/m^2, ac {:.3} kW",
            hour_of_day,
            sample.position.elevation.get::<degree>(),
            sample.angle_of_incidence.get::<degree>(),
            sample.poa_global().get::<watt_per_square_meter>(),
            sample.ac_power.get::<kilowatt>()
        );

        daily_energy += sample.ac_power * interval;
        if sample.ac_power > peak_power {
            peak_power = sample.ac_power;
        }
        samples.push(sample);
    }

    let energy_kwh = daily_energy.get::<kilowatt_hour>();
    let capacity_factor = if energy_kwh > 0.0 {
        Ratio::new::<ratio>(energy_kwh / (capacity.get::<kilowatt>() * ASSUMED_DAYLIGHT_HOURS))
    } else {
        Ratio::new::<ratio>(0.0)
    };

    Ok(DailyProfile {
        samples,
        capacity,
        array_area: scenario.array.total_area(&scenario.module),
        daily_energy,
        peak_power,
        capacity_factor,
        annual_yield: daily_energy * DAYS_PER_YEAR,
    })
}

/// Energy shown in kWh, switching to MWh from 1000 kWh upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyReadout(pub Energy);

impl fmt::Display for EnergyReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kwh = self.0.get::<kilowatt_hour>();
        if kwh >= 1000.0 {
            write!(f, "{:.1} MWh", kwh / 1000.0)
        } else {
            write!(f, "{:.0} kWh", kwh)
        }
    }
}

impl fmt::Display for DailyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Daily energy: {:.1} kWh", self.daily_energy.get::<kilowatt_hour>())?;
        writeln!(f, "Peak power: {:.2} kW", self.peak_power.get::<kilowatt>())?;
        writeln!(f, "Capacity factor: {:.1}%", self.capacity_factor.get::<percent>())?;
        write!(f, "Annual yield: {}", EnergyReadout(self.annual_yield))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArrayConfig, Location, PanelOrientation};
    use crate::tools::sun::BeamClipping;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;
    use test_strategy::proptest;

    fn sydney(tilt: f64, azimuth: f64, day_of_year: u32) -> Scenario {
        Scenario::for_site(
            "sydney",
            PanelOrientation::new(tilt, azimuth).unwrap(),
            ArrayConfig::new(4, 3).unwrap(),
            day_of_year,
            12.0,
        )
        .unwrap()
    }

    #[test]
    fn samples_cover_daytime_hours() {
        let profile = get_daily_profile(&sydney(30.0, 180.0, 172)).unwrap();
        let hours: Vec<f64> = profile.samples.iter().map(|sample| sample.hour_of_day).collect();
        assert_eq!(hours, (6..=18).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn sydney_winter_noon_sample() {
        let scenario = sydney(30.0, 180.0, 172);
        let sample = get_sample(&scenario, 12.0).unwrap();
        let nameplate = scenario.array.capacity(&scenario.module);

        assert!(sample.position.elevation.get::<degree>() > 0.0);
        assert!(sample.angle_of_incidence.get::<degree>() < 30.0);
        assert!(sample.ac_power.get::<watt>() > 0.0);
        assert!(sample.ac_power <= nameplate * scenario.module.inverter_efficiency);
        assert_abs_diff_eq!(sample.ac_power.get::<kilowatt>(), 3.0357, epsilon = 1e-3);
    }

    #[test]
    fn sydney_winter_day() {
        let scenario = sydney(30.0, 180.0, 172);
        let profile = get_daily_profile(&scenario).unwrap();

        assert_abs_diff_eq!(profile.capacity.get::<kilowatt>(), 3.84, epsilon = 1e-9);
        assert!(profile.peak_power <= profile.capacity);
        assert_abs_diff_eq!(profile.daily_energy.get::<kilowatt_hour>(), 25.41, epsilon = 0.01);
        assert_abs_diff_eq!(profile.peak_power.get::<kilowatt>(), 3.036, epsilon = 1e-3);
        assert_abs_diff_eq!(profile.capacity_factor.get::<percent>(), 55.14, epsilon = 0.01);
        assert_abs_diff_eq!(
            profile.annual_yield.get::<kilowatt_hour>(),
            profile.daily_energy.get::<kilowatt_hour>() * 365.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn sunrise_and_sunset_hours_are_dark() {
        let profile = get_daily_profile(&sydney(30.0, 180.0, 172)).unwrap();
        for sample in profile.samples.iter().filter(|sample| sample.hour_of_day < 8.0) {
            assert!(!sample.position.is_above_horizon());
            assert!(sample.irradiance.is_none());
            assert_eq!(sample.ac_power.get::<watt>(), 0.0);
        }
    }

    #[proptest]
    fn no_power_below_horizon(
        #[strategy(-90f64..=90f64)] latitude: f64,
        #[strategy(1u32..=365)] day_of_year: u32,
        #[strategy(0f64..=90f64)] tilt: f64,
        #[strategy(0f64..360f64)] azimuth: f64,
    ) {
        let scenario = Scenario::new(
            Location::new(latitude, 0.0).unwrap(),
            PanelOrientation::new(tilt, azimuth).unwrap(),
            ArrayConfig::new(2, 2).unwrap(),
            day_of_year,
            12.0,
        )
        .unwrap();
        let profile = get_daily_profile(&scenario).unwrap();

        for sample in profile.samples.iter() {
            if sample.position.elevation.get::<degree>() <= 0.0 {
                assert_eq!(sample.ac_power.get::<watt>(), 0.0);
            }
            assert!(sample.ac_power.get::<watt>() >= 0.0);
        }
    }

    #[test]
    fn polar_night() {
        let scenario = Scenario::new(
            Location::new(-80.0, 0.0).unwrap(),
            PanelOrientation::new(30.0, 180.0).unwrap(),
            ArrayConfig::new(4, 3).unwrap(),
            172,
            12.0,
        )
        .unwrap();
        let profile = get_daily_profile(&scenario).unwrap();

        assert_eq!(profile.daily_energy.get::<kilowatt_hour>(), 0.0);
        assert_eq!(profile.peak_power.get::<kilowatt>(), 0.0);
        assert_eq!(profile.capacity_factor.get::<percent>(), 0.0);
        assert_eq!(format!("{}", EnergyReadout(profile.annual_yield)), "0 kWh");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let scenario = sydney(25.0, 170.0, 45);
        let first = get_daily_profile(&scenario).unwrap();
        let second = get_daily_profile(&scenario).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tilt_near_latitude_collects_more_beam() {
        let annual_beam = |tilt: f64| -> f64 {
            (1..=365)
                .step_by(7)
                .flat_map(|day| {
                    let scenario = sydney(tilt, 180.0, day);
                    (FIRST_HOUR..=LAST_HOUR)
                        .map(move |hour_of_day| {
                            get_sample(&scenario, f64::from(hour_of_day)).unwrap()
                        })
                })
                .filter_map(|sample| sample.plane_of_array)
                .map(|poa| poa.beam.get::<watt_per_square_meter>())
                .sum()
        };

        let matched = annual_beam(34.0);
        assert!(matched > annual_beam(10.0));
        assert!(matched > annual_beam(60.0));
    }

    #[test]
    fn unclipped_beam_behind_the_panel() {
        // a vertical panel facing south, with the winter sun due north
        let mut scenario = sydney(90.0, 0.0, 172);
        let clipped = get_sample(&scenario, 12.0).unwrap();

        scenario.beam_clipping = BeamClipping::Unclipped;
        let unclipped = get_sample(&scenario, 12.0).unwrap();

        assert!(clipped.ac_power.get::<watt>() > 0.0);
        assert!(unclipped.poa_global().get::<watt_per_square_meter>() < 0.0);
        assert_eq!(unclipped.ac_power.get::<watt>(), 0.0);
    }

    #[test]
    fn series_follow_samples() {
        let profile = get_daily_profile(&sydney(30.0, 180.0, 172)).unwrap();

        let power = profile.series(Series::Power);
        let irradiance = profile.series(Series::Irradiance);
        let efficiency = profile.series(Series::Efficiency);

        assert_eq!(power.len(), profile.samples.len());
        assert_eq!(power[0], (6.0, 0.0));
        assert_eq!(irradiance[0], (6.0, 0.0));
        assert_eq!(efficiency[0], (6.0, 0.0));
        assert_abs_diff_eq!(power[6].1, profile.peak_power.get::<kilowatt>(), epsilon = 1e-12);
        assert_abs_diff_eq!(irradiance[6].1, 886.32, epsilon = 0.01);
        // 20 % module efficiency, hot cells and the inverter pull it down
        for (_, value) in efficiency.iter().filter(|(_, value)| *value > 0.0) {
            assert!(*value > 15.0 && *value < 20.0, "efficiency {}", value);
        }
    }

    #[test]
    fn summary_display() {
        let profile = get_daily_profile(&sydney(30.0, 180.0, 172)).unwrap();
        assert_eq!(
            format!("{}", profile),
            "Daily energy: 25.4 kWh\nPeak power: 3.04 kW\nCapacity factor: 55.1%\nAnnual yield: 9.3 MWh"
        );
    }

    #[test_case(0.0, "0 kWh"; "nothing")]
    #[test_case(999.4, "999 kWh"; "just below")]
    #[test_case(1000.0, "1.0 MWh"; "switch")]
    #[test_case(9274.9, "9.3 MWh"; "a year")]
    fn energy_readout(kwh: f64, expected: &str) {
        assert_eq!(
            format!("{}", EnergyReadout(Energy::new::<kilowatt_hour>(kwh))),
            expected
        );
    }
}
