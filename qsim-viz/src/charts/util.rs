use crate::error::VizError;

/// Map a plotters error into [`VizError::RenderingError`] with context.
pub(crate) fn rendering<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> VizError {
    move |e| VizError::RenderingError(format!("{context}: {e}"))
}

/// Upper bound for an axis starting at zero, with 10% headroom.
pub(crate) fn padded_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), VizError> {
    if width == 0 || height == 0 {
        return Err(VizError::InvalidConfiguration(format!(
            "chart dimensions must be nonzero, got {width}x{height}"
        )));
    }
    Ok(())
}
