use na::Vector3;
use uom::si::{
    angle::{degree, radian},
    f64::Angle,
    ratio::ratio,
};

use crate::model::{Location, PanelOrientation};
use crate::tools::{check_range, wrap_degrees};

const MAX_DECLINATION: f64 = 23.45; // degrees
const DECLINATION_DAY_OFFSET: f64 = 284.0;
const DAYS_PER_YEAR: f64 = 365.0;
const DEGREES_PER_HOUR: f64 = 15.0;
const SOLAR_NOON: f64 = 12.0;

/// Distance of the sun marker from the origin of the scene
pub const SUN_DISTANCE: f64 = 15.0;
const MIN_SUN_MARKER_HEIGHT: f64 = 0.5;

/// Position of the sun on the sky as seen from a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Angle between the sun and the horizon, negative below the horizon
    pub elevation: Angle,
    /// Azimuth of the sun, clockwise from north, in [0, 360) degrees
    pub azimuth: Angle,
}

impl SolarPosition {
    pub fn zenith(&self) -> Angle {
        Angle::new::<degree>(90.0) - self.elevation
    }

    pub fn is_above_horizon(&self) -> bool {
        self.elevation.get::<degree>() > 0.0
    }

    /// Unit vector pointing from the array toward the sun.
    pub fn sun_vector(&self) -> Vector3<f64> {
        // The scene frame measures azimuth from south, same as the panel azimuth
        let scene_azimuth = self.azimuth - Angle::new::<degree>(180.0);
        get_vector_from_azimuth_elevation(&scene_azimuth, &self.elevation)
    }
}

/// Whether a panel facing away from the sun can see negative beam irradiance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamClipping {
    /// cos(AOI) is clamped to [0, 1], AOI never exceeds 90 degrees
    #[default]
    Clipped,
    /// cos(AOI) is clamped to [-1, 1], AOI may reach 180 degrees
    Unclipped,
}

/// Numeric parameters of the sun marker in the 3D scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunMarker {
    pub position: Vector3<f64>,
    pub light_intensity: f64,
}

/// Get three dimensional Vector from azimuth and zenith angle.
/// This can be used to get the norm vector of a surface or the Sun.
///
/// Output vector coordinate system is following:
/// - azimuth 0 -> positive z axis
/// - azimuth 90 -> positive x axis
/// - y: up
///
/// # Arguments
/// * `azimuth` - angle of the horizontal projection, clockwise from the z axis
/// * `zenith_angle` - angle between the vector and the vertical axis
///
/// # Returns
/// * `Vector3<f64>` - three dimensional unit vector
pub fn get_vector_from_azimuth_zenith(azimuth: &Angle, zenith_angle: &Angle) -> Vector3<f64> {
    let x = azimuth.sin().get::<ratio>() * zenith_angle.sin().get::<ratio>();
    let y = zenith_angle.cos().get::<ratio>();
    let z = azimuth.cos().get::<ratio>() * zenith_angle.sin().get::<ratio>();
    Vector3::new(x, y, z).normalize()
}

/// Get three dimensional Vector from azimuth and elevation angle.
/// Uses the same coordinate system as `get_vector_from_azimuth_zenith`.
///
/// # Arguments
/// * `azimuth` - angle of the horizontal projection, clockwise from the z axis
/// * `elevation_angle` - angle between the vector and the horizontal plane
///
/// # Returns
/// * `Vector3<f64>` - three dimensional unit vector
pub fn get_vector_from_azimuth_elevation(azimuth: &Angle, elevation_angle: &Angle) -> Vector3<f64> {
    let x = azimuth.sin().get::<ratio>() * elevation_angle.cos().get::<ratio>();
    let y = elevation_angle.sin().get::<ratio>();
    let z = azimuth.cos().get::<ratio>() * elevation_angle.cos().get::<ratio>();
    Vector3::new(x, y, z).normalize()
}

/// Normal vector of a panel. A panel's zenith angle equals its tilt.
pub fn get_surface_normal(orientation: &PanelOrientation) -> Vector3<f64> {
    get_vector_from_azimuth_zenith(&orientation.azimuth, &orientation.tilt)
}

/// Solar declination for a day of the year (Cooper's equation).
pub fn get_declination(day_of_year: u32) -> Angle {
    let day_angle = Angle::new::<degree>(
        360.0 * (DECLINATION_DAY_OFFSET + f64::from(day_of_year)) / DAYS_PER_YEAR,
    );
    Angle::new::<degree>(MAX_DECLINATION * day_angle.sin().get::<ratio>())
}

/// Hour angle, zero at solar noon and positive in the afternoon.
/// No equation of time or longitude correction is applied.
pub fn get_hour_angle(hour_of_day: f64) -> Angle {
    Angle::new::<degree>(DEGREES_PER_HOUR * (hour_of_day - SOLAR_NOON))
}

/// Calculate the position of the sun for a location and time.
/// This is the simplified textbook formula, without refraction.
///
/// # Arguments
/// * `location` - where the array is
/// * `day_of_year` - day of the year in [1, 365]
/// * `hour_of_day` - solar time in hours, [0, 24]
///
/// # Returns
/// * `SolarPosition` - elevation and azimuth of the sun
pub fn solar_position(
    location: &Location,
    day_of_year: u32,
    hour_of_day: f64,
) -> anyhow::Result<SolarPosition> {
    if !(1..=365).contains(&day_of_year) {
        anyhow::bail!("day of year {} is outside [1, 365]", day_of_year)
    }
    check_range("hour of day", hour_of_day, 0.0, 24.0)?;

    let latitude = location.latitude;
    let declination = get_declination(day_of_year);
    let hour_angle = get_hour_angle(hour_of_day);

    let sin_elevation = declination.sin().get::<ratio>() * latitude.sin().get::<ratio>()
        + declination.cos().get::<ratio>()
            * latitude.cos().get::<ratio>()
            * hour_angle.cos().get::<ratio>();
    let elevation = Angle::new::<radian>(sin_elevation.clamp(-1.0, 1.0).asin());

    // measured from south, positive toward west
    let azimuth_from_south = hour_angle.sin().get::<ratio>().atan2(
        hour_angle.cos().get::<ratio>() * latitude.sin().get::<ratio>()
            - declination.tan().get::<ratio>() * latitude.cos().get::<ratio>(),
    );
    let azimuth = Angle::new::<degree>(wrap_degrees(
        Angle::new::<radian>(azimuth_from_south).get::<degree>() + 180.0,
    ));

    Ok(SolarPosition {
        elevation,
        azimuth,
    })
}

/// Get the angle of incidence between the sun and the panel normal.
///
/// # Arguments
/// * `position` - position of the sun
/// * `orientation` - orientation of the panel
/// * `clipping` - whether a sun behind the panel is clamped to 90 degrees
///
/// # Returns
/// * `Angle` - angle of incidence
pub fn get_angle_of_incidence(
    position: &SolarPosition,
    orientation: &PanelOrientation,
    clipping: BeamClipping,
) -> Angle {
    let cos_aoi = get_surface_normal(orientation).dot(&position.sun_vector());
    // clamp also guards acos against rounding overshoot
    let cos_aoi = match clipping {
        BeamClipping::Clipped => cos_aoi.clamp(0.0, 1.0),
        BeamClipping::Unclipped => cos_aoi.clamp(-1.0, 1.0),
    };
    Angle::new::<radian>(cos_aoi.acos())
}

/// Get the placement and brightness of the sun in the 3D scene.
pub fn get_sun_marker(position: &SolarPosition) -> SunMarker {
    let mut marker = position.sun_vector() * SUN_DISTANCE;
    // keep the marker visible above the ground plane
    marker.y = marker.y.max(MIN_SUN_MARKER_HEIGHT);
    SunMarker {
        position: marker,
        light_intensity: position.elevation.sin().get::<ratio>().max(0.0),
    }
}
