pub mod sun;

/// Wrap an angle given in degrees into the range [0, 360).
pub fn wrap_degrees(value: f64) -> f64 {
    let wrapped = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Ensure that a configuration value is a finite number.
pub fn check_finite(label: &str, value: f64) -> anyhow::Result<f64> {
    if !value.is_finite() {
        anyhow::bail!("{} must be a finite number, got {}", label, value)
    }
    Ok(value)
}

/// Ensure that a configuration value is a finite number greater than zero.
pub fn check_positive(label: &str, value: f64) -> anyhow::Result<f64> {
    if check_finite(label, value)? <= 0.0 {
        anyhow::bail!("{} must be positive, got {}", label, value)
    }
    Ok(value)
}

/// Ensure that a configuration value is a finite number inside `[min, max]`.
pub fn check_range(label: &str, value: f64, min: f64, max: f64) -> anyhow::Result<f64> {
    check_finite(label, value)?;
    if value < min || value > max {
        anyhow::bail!("{} {} is outside [{}, {}]", label, value, min, max)
    }
    Ok(value)
}
