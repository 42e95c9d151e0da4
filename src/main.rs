extern crate nalgebra as na;

mod irradiance;
mod model;
mod power;
mod profile;
mod quick_estimate;
mod sites;
mod tools;

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::info;
use uom::si::{
    angle::degree, energy::kilowatt_hour, heat_flux_density::watt_per_square_meter,
    power::kilowatt, ratio::percent,
};

use model::*;
use profile::*;
use quick_estimate::*;
use tools::sun::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Clear sky PV production estimate for a single day")]
struct Args {
    /// JSON5 scenario file
    #[arg(default_value = "scenario.json5")]
    scenario: PathBuf,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();
    let args = Args::parse();

    let scenario = Scenario::load(&args.scenario)?;
    info!("loaded scenario from {}", args.scenario.display());

    if let Some(site) = scenario.site {
        println!("Site: {} - {} ({})", site.name, site.description, site.timezone);
    }
    println!(
        "Location: {:.2}°, {:.2}°",
        scenario.location.latitude.get::<degree>(),
        scenario.location.longitude.get::<degree>()
    );
    println!(
        "System: {} panels, {:.2} kW",
        scenario.array.panel_count(),
        scenario.array.capacity(&scenario.module).get::<kilowatt>()
    );

    let current = get_sample(&scenario, scenario.hour_of_day)?;
    let marker = get_sun_marker(&current.position);
    println!(
        "Sun at {:.1}h: elevation {:.1}°, zenith {:.1}°, azimuth {:.1}°, angle of incidence {:.1}°",
        scenario.hour_of_day,
        current.position.elevation.get::<degree>(),
        current.position.zenith().get::<degree>(),
        current.position.azimuth.get::<degree>(),
        current.angle_of_incidence.get::<degree>()
    );
    println!(
        "Sun marker: ({:.2}, {:.2}, {:.2}), light intensity {:.2}",
        marker.position.x, marker.position.y, marker.position.z, marker.light_intensity
    );
    if let Some(irradiance) = current.irradiance {
        println!(
            "GHI {:.1} W/m^2, DNI {:.1} W/m^2, DHI {:.1} W/m^2",
            irradiance.global_horizontal_irradiance.get::<watt_per_square_meter>(),
            irradiance.direct_normal_irradiance.get::<watt_per_square_meter>(),
            irradiance.diffuse_horizontal_irradiance.get::<watt_per_square_meter>()
        );
    }
    println!("AC power now: {:.2} kW", current.ac_power.get::<kilowatt>());

    let profile = get_daily_profile(&scenario)?;
    println!();
    println!("Hour   Power [kW]  POA [W/m^2]  Efficiency [%]");
    let rows = profile
        .series(Series::Power)
        .into_iter()
        .zip(profile.series(Series::Irradiance))
        .zip(profile.series(Series::Efficiency));
    for (((hour_of_day, power), (_, irradiance)), (_, efficiency)) in rows {
        println!(
            "{:02}:00 {:>11.2} {:>12.1} {:>15.1}",
            hour_of_day as u32, power, irradiance, efficiency
        );
    }
    println!();
    println!("{}", profile);
    info!("annual yield {}", EnergyReadout(profile.annual_yield));

    if let Some(site) = scenario.site.filter(|site| site.climate.is_some()) {
        let estimate = get_quick_estimate(site, profile.capacity, &scenario.orientation.tilt)?;
        println!();
        println!("Time   GHI [W/m^2]  POA [W/m^2]  Power [kW]  Efficiency [%]");
        for sample in estimate.samples.iter() {
            println!(
                "{} {:>12.1} {:>12.1} {:>11.2} {:>15.1}",
                sample.label(),
                sample.ghi.get::<watt_per_square_meter>(),
                sample.poa.get::<watt_per_square_meter>(),
                sample.ac_power.get::<kilowatt>(),
                sample.efficiency.get::<percent>()
            );
        }
        println!(
            "Quick estimate: peak {:.2} kW, {:.1} kWh per day, capacity factor {:.1}%",
            estimate.peak_power.get::<kilowatt>(),
            estimate.daily_energy.get::<kilowatt_hour>(),
            estimate.capacity_factor.get::<percent>()
        );
        let months = get_monthly_energy(&scenario.orientation.tilt)
            .iter()
            .map(|energy| EnergyReadout(*energy))
            .join(", ");
        println!("Monthly energy per m^2: {}", months);
    }

    anyhow::Result::Ok(())
}
