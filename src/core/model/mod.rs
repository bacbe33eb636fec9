use crate::core::error::PlateError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PlateType {
    P384,
    P96,
}

impl PlateType {
    pub fn rows(self) -> usize {
        match self {
            PlateType::P384 => 16,
            PlateType::P96 => 8,
        }
    }

    pub fn cols(self) -> usize {
        match self {
            PlateType::P384 => 24,
            PlateType::P96 => 12,
        }
    }

    pub fn well_count(self) -> usize {
        self.rows() * self.cols()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlateType::P384 => "384",
            PlateType::P96 => "96",
        }
    }

    /// Infers the plate from a completed table's row count.
    pub fn from_row_count(rows: usize) -> Option<PlateType> {
        match rows {
            384 => Some(PlateType::P384),
            96 => Some(PlateType::P96),
            _ => None,
        }
    }
}

impl fmt::Display for PlateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four interleaved 96-well sub-grids of a 384-well plate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Quadrant {
    A1,
    A2,
    B1,
    B2,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::A1, Quadrant::A2, Quadrant::B1, Quadrant::B2];

    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::A1 => "A1",
            Quadrant::A2 => "A2",
            Quadrant::B1 => "B1",
            Quadrant::B2 => "B2",
        }
    }

    /// Even row offsets (A, C, .., O) belong to the `A` half, odd columns
    /// (1, 3, .., 23) to the `1` half.
    pub fn of(well: Well) -> Quadrant {
        let row_a = well.row % 2 == 0;
        let col_1 = well.col % 2 == 0;
        match (row_a, col_1) {
            (true, true) => Quadrant::A1,
            (true, false) => Quadrant::A2,
            (false, true) => Quadrant::B1,
            (false, false) => Quadrant::B2,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based well coordinates. `Display` yields the canonical label.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Well {
    pub row: u8,
    pub col: u8,
}

impl Well {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Decodes `A1`, `p24`, `B03`, ... Row is the letter offset from `A`,
    /// column is the number minus one.
    pub fn parse(label: &str) -> Result<Well, PlateError> {
        let s = label.trim();
        let invalid = || PlateError::InvalidWell(label.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        if !letter.is_ascii_alphabetic() {
            return Err(invalid());
        }
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: u32 = digits.parse().map_err(|_| invalid())?;
        if number == 0 || number > u8::MAX as u32 {
            return Err(invalid());
        }
        let row = letter.to_ascii_uppercase() as u8 - b'A';
        Ok(Well::new(row, (number - 1) as u8))
    }

    pub fn in_plate(self, plate: PlateType) -> bool {
        (self.row as usize) < plate.rows() && (self.col as usize) < plate.cols()
    }

    pub fn row_letter(self) -> char {
        (b'A' + self.row) as char
    }
}

impl fmt::Display for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col as u32 + 1)
    }
}

/// A report row as loaded; the well label is kept verbatim so the reshaper
/// can tell canonical wells from instrument noise.
#[derive(Clone, Debug, PartialEq)]
pub struct WellRecord {
    pub well: String,
    pub compound: String,
    pub area: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WellArea {
    pub well: Well,
    pub area: f64,
}

/// Rows of one compound from one report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompoundTable {
    pub rows: Vec<WellArea>,
}

impl CompoundTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub fn area(&self, well: Well) -> Option<f64> {
        self.rows.iter().find(|r| r.well == well).map(|r| r.area)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuadrantTable {
    pub quadrant: Quadrant,
    /// True when the rows were relabeled onto 96-well coordinates.
    pub remapped: bool,
    pub table: CompoundTable,
}
