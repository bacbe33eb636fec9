use crate::core::model::{PlateType, Quadrant, Well};

/// All wells of a plate in row-major order (A1, A2, .., B1, ..).
pub fn plate_wells(plate: PlateType) -> Vec<Well> {
    let mut out = Vec::with_capacity(plate.well_count());
    for row in 0..plate.rows() {
        for col in 0..plate.cols() {
            out.push(Well::new(row as u8, col as u8));
        }
    }
    out
}

/// The 96 wells of one 384-plate quadrant, row-major within the quadrant.
pub fn quadrant_wells(quadrant: Quadrant) -> Vec<Well> {
    let (row0, col0) = match quadrant {
        Quadrant::A1 => (0, 0),
        Quadrant::A2 => (0, 1),
        Quadrant::B1 => (1, 0),
        Quadrant::B2 => (1, 1),
    };
    let mut out = Vec::with_capacity(PlateType::P96.well_count());
    for row in (row0..PlateType::P384.rows()).step_by(2) {
        for col in (col0..PlateType::P384.cols()).step_by(2) {
            out.push(Well::new(row as u8, col as u8));
        }
    }
    out
}

/// Quadrants A1, A2, B1, B2 concatenated: the order a four-tip head
/// dispenses into a 384-well plate.
pub fn dispense_order() -> Vec<Well> {
    Quadrant::ALL
        .iter()
        .flat_map(|&q| quadrant_wells(q))
        .collect()
}
