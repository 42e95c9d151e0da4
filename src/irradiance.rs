use log::warn;
use uom::si::{
    angle::degree,
    f64::{Angle, HeatFluxDensity},
    heat_flux_density::watt_per_square_meter,
    ratio::ratio,
};

// simplified clear sky attenuation curve, not a validated model
const CLEAR_SKY_IRRADIANCE: f64 = 1000.0; // W/m^2
const ATMOSPHERIC_TRANSMITTANCE: f64 = 0.7;
const AIR_MASS_EXPONENT: f64 = 0.678;

// logistic fit between clearness index and diffuse fraction
const DIFFUSE_FRACTION_OFFSET: f64 = -5.0;
const DIFFUSE_FRACTION_SLOPE: f64 = 8.6;

/// Horizontal irradiance split into its components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Irradiance {
    pub diffuse_horizontal_irradiance: HeatFluxDensity,
    pub direct_normal_irradiance: HeatFluxDensity,
    pub global_horizontal_irradiance: HeatFluxDensity,
}

/// Irradiance transposed onto a tilted plane, isotropic sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneOfArrayIrradiance {
    pub beam: HeatFluxDensity,
    pub sky_diffuse: HeatFluxDensity,
    pub ground_diffuse: HeatFluxDensity,
}

impl PlaneOfArrayIrradiance {
    pub fn global(&self) -> HeatFluxDensity {
        self.beam + self.sky_diffuse + self.ground_diffuse
    }
}

/// Relative optical path length through the atmosphere, plane parallel approximation.
pub fn get_air_mass(elevation: &Angle) -> f64 {
    1.0 / elevation.sin().get::<ratio>()
}

/// Fraction of the global irradiance that arrives as diffuse light.
pub fn get_diffuse_fraction(clearness_index: f64) -> f64 {
    1.0 / (1.0 + (DIFFUSE_FRACTION_OFFSET + DIFFUSE_FRACTION_SLOPE * clearness_index).exp())
}

impl Irradiance {
    /// Estimate clear sky irradiance for a sun above the horizon.
    ///
    /// # Arguments
    /// * `elevation` - solar elevation, must be positive
    /// * `clearness_index` - atmospheric clarity, typically 0.75
    ///
    /// # Returns
    /// * `Irradiance` - horizontal irradiance components
    pub fn clear_sky(elevation: &Angle, clearness_index: f64) -> anyhow::Result<Irradiance> {
        let elevation_degrees = elevation.get::<degree>();
        if elevation_degrees.is_nan() || elevation_degrees <= 0.0 {
            anyhow::bail!(
                "Clear sky irradiance needs the sun above the horizon, elevation is {} deg",
                elevation_degrees
            )
        }

        let air_mass = get_air_mass(elevation);
        let ghi = CLEAR_SKY_IRRADIANCE * ATMOSPHERIC_TRANSMITTANCE.powf(air_mass.powf(AIR_MASS_EXPONENT));
        let dhi = ghi * get_diffuse_fraction(clearness_index);
        // cos(zenith) equals sin(elevation)
        let dni = (ghi - dhi) / elevation.sin().get::<ratio>();

        Ok(Irradiance {
            diffuse_horizontal_irradiance: HeatFluxDensity::new::<watt_per_square_meter>(dhi),
            direct_normal_irradiance: HeatFluxDensity::new::<watt_per_square_meter>(dni),
            global_horizontal_irradiance: HeatFluxDensity::new::<watt_per_square_meter>(ghi),
        })
    }

    /// Transpose the horizontal components onto a tilted surface using the isotropic sky model.
    /// The beam part is `DNI * cos(AOI)` as is, it only stays non-negative when the
    /// angle of incidence was clipped at 90 degrees.
    ///
    /// # Arguments
    /// * `angle_of_incidence` - angle between the sun and the surface normal
    /// * `surface_angle` - angle between the surface and horizontal plane
    /// * `albedo` - whiteness of the ground surface
    ///
    /// # Returns
    /// * `PlaneOfArrayIrradiance` - beam, sky diffuse and ground reflected irradiance
    pub fn get_plane_of_array(
        &self,
        angle_of_incidence: &Angle,
        surface_angle: &Angle,
        albedo: f64,
    ) -> PlaneOfArrayIrradiance {
        let cos_tilt = surface_angle.cos().get::<ratio>();

        let beam = self.direct_normal_irradiance * angle_of_incidence.cos().get::<ratio>();
        if beam.get::<watt_per_square_meter>() < 0.0 {
            warn!(
                "Negative beam irradiance {:.1} W/m^2 at angle of incidence {:.1} deg",
                beam.get::<watt_per_square_meter>(),
                angle_of_incidence.get::<degree>()
            );
        }
        let sky_diffuse = self.diffuse_horizontal_irradiance * (1.0 + cos_tilt) / 2.0;
        let ground_diffuse = self.global_horizontal_irradiance * albedo * (1.0 - cos_tilt) / 2.0;

        PlaneOfArrayIrradiance {
            beam,
            sky_diffuse,
            ground_diffuse,
        }
    }
}
