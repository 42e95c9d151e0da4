//! Rough single day estimate built from a bell shaped irradiance curve and
//! typical clear day figures of a site. It does not use the sun geometry.

use std::f64::consts::PI;

use uom::si::{
    angle::degree,
    energy::kilowatt_hour,
    f64::{Angle, Energy, HeatFluxDensity, Power, Ratio},
    heat_flux_density::watt_per_square_meter,
    power::kilowatt,
    ratio::{percent, ratio},
};

use crate::sites::Site;

const START_HOUR: f64 = 6.0;
const DAY_LENGTH: f64 = 12.0; // hours
const STEP: f64 = 0.5; // hours
const SAMPLE_COUNT: usize = 25;

const TILT_GAIN: f64 = 0.3;
const AMBIENT_SWING: f64 = 8.0; // °C
const CELL_HEATING: f64 = 25.0; // °C above ambient
const REFERENCE_CELL_TEMPERATURE: f64 = 25.0; // °C
const TEMPERATURE_COEFFICIENT: f64 = -0.004; // 1/°C
const INVERTER_EFFICIENCY: f64 = 0.96;
const MAX_REPORTED_EFFICIENCY: f64 = 25.0; // %

// kWh/m^2/day, January to December
const MONTHLY_INSOLATION: [f64; 12] = [3.5, 4.5, 5.5, 6.5, 7.0, 7.5, 7.2, 6.8, 6.0, 5.0, 4.0, 3.2];
const OPTIMAL_TILT: f64 = 32.0; // degrees
const TILT_PENALTY: f64 = 0.005; // per degree away from the optimum
const DAYS_PER_MONTH: f64 = 30.0;
const PERFORMANCE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickSample {
    pub hour_of_day: f64,
    pub ghi: HeatFluxDensity,
    pub poa: HeatFluxDensity,
    pub ac_power: Power,
    pub efficiency: Ratio,
}

impl QuickSample {
    /// Clock label of the sample, e.g. `06:30`
    pub fn label(&self) -> String {
        let minutes = (self.hour_of_day * 60.0).round() as u32;
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickEstimate {
    pub samples: Vec<QuickSample>,
    pub peak_power: Power,
    pub daily_energy: Energy,
    pub capacity_factor: Ratio,
}

/// Estimate a day of production every half an hour between 6:00 and 18:00.
///
/// # Arguments
/// * `site` - site with reference climate data
/// * `system_size` - nameplate capacity of the system
/// * `tilt` - tilt of the panels
///
/// # Returns
/// * `QuickEstimate` - samples and daily summary
pub fn get_quick_estimate(
    site: &Site,
    system_size: Power,
    tilt: &Angle,
) -> anyhow::Result<QuickEstimate> {
    let climate = site
        .climate
        .ok_or_else(|| anyhow::anyhow!("Site {:?} has no reference climate data", site.key))?;
    let size = system_size.get::<kilowatt>();
    if size.is_nan() || size <= 0.0 {
        anyhow::bail!("System size must be positive, got {} kW", size)
    }

    let tilt_factor =
        1.0 + TILT_GAIN * Angle::new::<degree>(tilt.get::<degree>() - site.latitude)
            .cos()
            .get::<ratio>();

    let samples: Vec<QuickSample> = (0..SAMPLE_COUNT)
        .map(|index| {
            let hour_of_day = START_HOUR + index as f64 * STEP;
            let solar_factor = ((hour_of_day - START_HOUR) / DAY_LENGTH * PI).sin().max(0.0);

            let ghi = climate.peak_ghi * solar_factor;
            let poa = ghi * tilt_factor;

            let ambient = climate.base_temperature + AMBIENT_SWING * solar_factor;
            let cell = ambient + CELL_HEATING;
            let derate = 1.0 + TEMPERATURE_COEFFICIENT * (cell - REFERENCE_CELL_TEMPERATURE);

            let ac_power = (size * (poa / 1000.0) * derate * INVERTER_EFFICIENCY).max(0.0);
            let efficiency = if ghi > 0.0 {
                (ac_power / size * (1000.0 / ghi) * 100.0).min(MAX_REPORTED_EFFICIENCY)
            } else {
                0.0
            };

            QuickSample {
                hour_of_day,
                ghi: HeatFluxDensity::new::<watt_per_square_meter>(ghi),
                poa: HeatFluxDensity::new::<watt_per_square_meter>(poa),
                ac_power: Power::new::<kilowatt>(ac_power),
                efficiency: Ratio::new::<percent>(efficiency),
            }
        })
        .collect();

    let peak_power = samples
        .iter()
        .map(|sample| sample.ac_power.get::<kilowatt>())
        .fold(0.0, f64::max);
    let daily_energy: f64 = samples
        .iter()
        .map(|sample| sample.ac_power.get::<kilowatt>() * STEP)
        .sum();

    Ok(QuickEstimate {
        samples,
        peak_power: Power::new::<kilowatt>(peak_power),
        daily_energy: Energy::new::<kilowatt_hour>(daily_energy),
        capacity_factor: Ratio::new::<percent>(daily_energy / (size * DAY_LENGTH) * 100.0),
    })
}

/// Energy per square meter of panel for every month, for a given tilt.
pub fn get_monthly_energy(tilt: &Angle) -> [Energy; 12] {
    let tilt_loss = 1.0 - TILT_PENALTY * (tilt.get::<degree>() - OPTIMAL_TILT).abs();
    MONTHLY_INSOLATION.map(|insolation| {
        Energy::new::<kilowatt_hour>(insolation * tilt_loss * DAYS_PER_MONTH * PERFORMANCE_RATIO)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::find_site;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use test_case::test_case;

    fn sydney_estimate() -> QuickEstimate {
        get_quick_estimate(
            find_site("sydney").unwrap(),
            Power::new::<kilowatt>(5.0),
            &Angle::new::<degree>(30.0),
        )
        .unwrap()
    }

    #[test]
    fn half_hour_grid() {
        let estimate = sydney_estimate();
        assert_eq!(estimate.samples.len(), 25);
        assert_eq!(estimate.samples[0].label(), "06:00");
        assert_eq!(estimate.samples[1].label(), "06:30");
        assert_eq!(estimate.samples[24].label(), "18:00");
    }

    #[test]
    fn sydney_day() {
        let estimate = sydney_estimate();

        assert_abs_diff_eq!(estimate.peak_power.get::<kilowatt>(), 4.9291, epsilon = 1e-4);
        assert_abs_diff_eq!(estimate.daily_energy.get::<kilowatt_hour>(), 37.898, epsilon = 1e-3);
        assert_abs_diff_eq!(estimate.capacity_factor.get::<percent>(), 63.163, epsilon = 1e-3);
        // the peak is at noon
        assert_abs_diff_eq!(
            estimate.samples[12].ac_power.get::<kilowatt>(),
            estimate.peak_power.get::<kilowatt>(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn edges_of_the_day() {
        let estimate = sydney_estimate();
        let first = estimate.samples[0];
        let last = estimate.samples[24];

        assert_eq!(first.ac_power.get::<kilowatt>(), 0.0);
        assert_eq!(first.efficiency.get::<percent>(), 0.0);
        assert!(last.ac_power.get::<kilowatt>() < 1e-9);
    }

    #[test]
    fn efficiency_is_capped() {
        for sample in sydney_estimate().samples {
            assert!(sample.efficiency.get::<percent>() <= MAX_REPORTED_EFFICIENCY + 1e-9);
        }
    }

    #[test]
    fn site_without_climate_data() {
        let result = get_quick_estimate(
            find_site("darwin").unwrap(),
            Power::new::<kilowatt>(5.0),
            &Angle::new::<degree>(30.0),
        );
        assert_matches!(result, Err(error) => {
            error.to_string().find("darwin").expect("Error message should name the site");
        });
    }

    #[test]
    fn zero_size_is_rejected() {
        let result = get_quick_estimate(
            find_site("perth").unwrap(),
            Power::new::<kilowatt>(0.0),
            &Angle::new::<degree>(30.0),
        );
        assert!(result.is_err());
    }

    #[test_case(32.0, 84.0; "optimal")]
    #[test_case(42.0, 79.8; "ten degrees steep")]
    #[test_case(22.0, 79.8; "ten degrees flat")]
    fn january_energy(tilt: f64, expected: f64) {
        let months = get_monthly_energy(&Angle::new::<degree>(tilt));
        assert_abs_diff_eq!(months[0].get::<kilowatt_hour>(), expected, epsilon = 1e-9);
    }

    #[test]
    fn optimal_tilt_gives_most_energy() {
        let total = |tilt: f64| -> f64 {
            get_monthly_energy(&Angle::new::<degree>(tilt))
                .iter()
                .map(|energy| energy.get::<kilowatt_hour>())
                .sum()
        };
        assert!(total(32.0) > total(20.0));
        assert!(total(32.0) > total(45.0));
    }
}
