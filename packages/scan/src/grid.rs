//! Raster definition.

use seismiq_engine_models::config::GridParams;

use crate::ScanError;

/// Slack for bounds that are an exact multiple of the step apart.
const AXIS_EPSILON: f64 = 1e-9;

/// Regular lat/lon raster. Coordinates are derived from integer indices,
/// so no rounding error accumulates along an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl Grid {
    /// Builds the raster described by `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidGrid`] for a non-positive or non-finite
    /// step or inverted bounds.
    pub fn new(params: &GridParams) -> Result<Self, ScanError> {
        let invalid = |message: &str| ScanError::InvalidGrid {
            message: message.to_string(),
        };

        if !params.step_deg.is_finite() || params.step_deg <= 0.0 {
            return Err(invalid("step must be a positive number of degrees"));
        }
        let bounds = [params.lat_min, params.lat_max, params.lon_min, params.lon_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(invalid("bounds must be finite"));
        }
        if params.lat_min > params.lat_max || params.lon_min > params.lon_max {
            return Err(invalid("minimum bound exceeds maximum"));
        }

        Ok(Self {
            lats: axis(params.lat_min, params.lat_max, params.step_deg),
            lons: axis(params.lon_min, params.lon_max, params.step_deg),
        })
    }

    #[must_use]
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    #[must_use]
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(lat, lon)` of every cell, latitude-major.
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lats
            .iter()
            .flat_map(move |lat| self.lons.iter().map(move |lon| (*lat, *lon)))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    let steps = ((max - min) / step + AXIS_EPSILON).floor() as usize;
    (0..=steps).map(|i| i as f64).map(|i| step.mul_add(i, min)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_raster() {
        let grid = Grid::new(&GridParams::default()).unwrap();
        assert_eq!(grid.lats().len(), 13);
        assert_eq!(grid.lons().len(), 39);
        assert_eq!(grid.len(), 507);

        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells[0], (36.0, 26.0));
        assert_eq!(cells[1], (36.0, 26.5));
        assert_eq!(cells[506], (42.0, 45.0));
    }

    #[test]
    fn inexact_step_stops_inside_bounds() {
        let grid = Grid::new(&GridParams {
            lat_min: 0.0,
            lat_max: 1.0,
            lon_min: 0.0,
            lon_max: 0.0,
            step_deg: 0.3,
            ..GridParams::default()
        })
        .unwrap();
        assert_eq!(grid.lats().len(), 4);
        assert!((grid.lats()[3] - 0.9).abs() < 1e-12);
        assert_eq!(grid.lons(), [0.0]);
    }

    #[test]
    fn indices_do_not_drift() {
        let grid = Grid::new(&GridParams {
            lat_min: 0.0,
            lat_max: 1.0,
            lon_min: 0.0,
            lon_max: 0.0,
            step_deg: 0.1,
            ..GridParams::default()
        })
        .unwrap();
        assert_eq!(grid.lats().len(), 11);
        assert!((grid.lats()[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_step() {
        for step_deg in [0.0, -0.5, f64::NAN] {
            let err = Grid::new(&GridParams {
                step_deg,
                ..GridParams::default()
            })
            .unwrap_err();
            assert!(matches!(err, ScanError::InvalidGrid { .. }));
        }
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = Grid::new(&GridParams {
            lat_min: 42.0,
            lat_max: 36.0,
            ..GridParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, ScanError::InvalidGrid { .. }));
    }
}
