use crate::core::error::PlateError;
use crate::core::model::{PlateType, Well};
use crate::core::table::WellAreaRow;

pub fn log_transform(area: f64) -> f64 {
    (area + 1.0).log10()
}

pub fn inverse_log_transform(v: f64) -> f64 {
    10f64.powf(v) - 1.0
}

/// Dense `log10(area + 1)` values laid out as the physical plate.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateGrid {
    pub plate: PlateType,
    values: Vec<f64>,
}

impl PlateGrid {
    pub fn zeros(plate: PlateType) -> Self {
        Self {
            plate,
            values: vec![0.0; plate.well_count()],
        }
    }

    pub fn from_rows(rows: &[WellAreaRow], plate: PlateType) -> Result<Self, PlateError> {
        let mut grid = Self::zeros(plate);
        for r in rows {
            let well = Well::parse(&r.well)?;
            if !well.in_plate(plate) {
                return Err(PlateError::WellOutOfBounds {
                    well: r.well.clone(),
                    plate: plate.as_str(),
                });
            }
            grid.set(well.row as usize, well.col as usize, log_transform(r.area));
        }
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.plate.rows()
    }

    pub fn cols(&self) -> usize {
        self.plate.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols() + col]
    }

    fn set(&mut self, row: usize, col: usize, v: f64) {
        let cols = self.cols();
        self.values[row * cols + col] = v;
    }

    /// (min, max) over all cells.
    pub fn range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(well: &str, area: f64) -> WellAreaRow {
        WellAreaRow {
            well: well.to_string(),
            area,
        }
    }

    #[test]
    fn cells_hold_log_values() {
        let rows = [row("A1", 100.0), row("B2", 0.0), row("p24", 9.0)];
        let grid = PlateGrid::from_rows(&rows, PlateType::P384).unwrap();
        assert!((grid.get(0, 0) - 101f64.log10()).abs() < 1e-12);
        assert!((grid.get(0, 0) - 2.0043).abs() < 1e-4);
        assert_eq!(grid.get(1, 1), 0.0);
        assert!((grid.get(15, 23) - 1.0).abs() < 1e-12);
        assert_eq!(grid.get(5, 5), 0.0);
        let (lo, hi) = grid.range();
        assert_eq!(lo, 0.0);
        assert!((hi - 101f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn out_of_bounds_well_is_rejected() {
        let err = PlateGrid::from_rows(&[row("I1", 1.0)], PlateType::P96).unwrap_err();
        assert!(matches!(err, PlateError::WellOutOfBounds { .. }));
        let err = PlateGrid::from_rows(&[row("A13", 1.0)], PlateType::P96).unwrap_err();
        assert!(matches!(err, PlateError::WellOutOfBounds { .. }));
        let err = PlateGrid::from_rows(&[row("??", 1.0)], PlateType::P96).unwrap_err();
        assert!(matches!(err, PlateError::InvalidWell(_)));
    }

    proptest! {
        #[test]
        fn log_transform_inverts(area in 0.0f64..1e9) {
            let back = inverse_log_transform(log_transform(area));
            prop_assert!((back - area).abs() <= 1e-9 * area.max(1.0));
        }
    }
}
