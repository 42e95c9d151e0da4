use serde::Deserialize;
use uom::si::{
    area::square_meter,
    f64::{Area, HeatFluxDensity, Power, Ratio, ThermodynamicTemperature},
    heat_flux_density::watt_per_square_meter,
    power::watt,
    ratio::ratio,
    thermodynamic_temperature::degree_celsius,
};

use crate::model::ArrayConfig;
use crate::tools::{check_finite, check_positive, check_range};

const REFERENCE_CELL_TEMPERATURE: f64 = 25.0; // °C
const REFERENCE_IRRADIANCE: f64 = 1000.0; // W/m^2

/// Electrical parameters of a single panel and of the inverter.
/// All quantities are given in SI base units when loaded from a file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModuleParameters {
    pub panel_area: Area,
    /// DC power of one panel at standard test conditions
    pub nameplate_power: Power,
    pub module_efficiency: Ratio,
    /// Relative power change per degree of cell temperature [1/°C]
    pub temperature_coefficient: f64,
    /// Cell temperature rise above ambient at 1000 W/m^2 [°C]
    pub cell_heating: f64,
    pub inverter_efficiency: Ratio,
}

impl Default for ModuleParameters {
    fn default() -> Self {
        ModuleParameters {
            panel_area: Area::new::<square_meter>(1.6),
            nameplate_power: Power::new::<watt>(320.0),
            module_efficiency: Ratio::new::<ratio>(0.20),
            temperature_coefficient: -0.004,
            cell_heating: 20.0,
            inverter_efficiency: Ratio::new::<ratio>(0.96),
        }
    }
}

impl ModuleParameters {
    /// Reject parameters that would make the power model produce NaN,
    /// infinite or meaningless values.
    pub fn check(&self) -> anyhow::Result<()> {
        check_positive("panel area", self.panel_area.get::<square_meter>())?;
        check_positive("nameplate power", self.nameplate_power.get::<watt>())?;
        check_positive("module efficiency", self.module_efficiency.get::<ratio>())?;
        check_range("module efficiency", self.module_efficiency.get::<ratio>(), 0.0, 1.0)?;
        check_positive("inverter efficiency", self.inverter_efficiency.get::<ratio>())?;
        check_range("inverter efficiency", self.inverter_efficiency.get::<ratio>(), 0.0, 1.0)?;
        check_finite("temperature coefficient", self.temperature_coefficient)?;
        check_finite("cell heating", self.cell_heating)?;
        Ok(())
    }
}

/// Linear cell temperature proxy. There is no wind or ambient temperature
/// input, cells are assumed to sit at 25 °C without irradiance.
pub fn get_cell_temperature(
    poa_global: HeatFluxDensity,
    module: &ModuleParameters,
) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<degree_celsius>(
        REFERENCE_CELL_TEMPERATURE
            + poa_global.get::<watt_per_square_meter>() / REFERENCE_IRRADIANCE * module.cell_heating,
    )
}

/// Multiplier applied to the DC output for a given cell temperature.
/// Not floored, extreme temperatures may push it below zero.
pub fn get_temperature_factor(
    cell_temperature: ThermodynamicTemperature,
    module: &ModuleParameters,
) -> f64 {
    1.0 + module.temperature_coefficient
        * (cell_temperature.get::<degree_celsius>() - REFERENCE_CELL_TEMPERATURE)
}

/// DC output of the whole array, derated by cell temperature.
pub fn get_dc_power(
    poa_global: HeatFluxDensity,
    array: &ArrayConfig,
    module: &ModuleParameters,
) -> Power {
    let temperature_factor = get_temperature_factor(get_cell_temperature(poa_global, module), module);
    poa_global * array.total_area(module) * module.module_efficiency * temperature_factor
}

/// AC output of the whole array after the inverter.
/// The output is floored at zero, the inverter never draws power from the grid.
///
/// # Arguments
/// * `poa_global` - total irradiance on the plane of array
/// * `array` - size of the array
/// * `module` - panel and inverter parameters
///
/// # Returns
/// * `Power` - AC power, never negative
pub fn get_ac_power(
    poa_global: HeatFluxDensity,
    array: &ArrayConfig,
    module: &ModuleParameters,
) -> Power {
    let ac_power = get_dc_power(poa_global, array, module) * module.inverter_efficiency;
    Power::new::<watt>(ac_power.get::<watt>().max(0.0))
}
