/// Errors raised by the plate algebra and the table readers.
#[derive(Debug, thiserror::Error)]
pub enum PlateError {
    #[error("invalid well label: {0:?}")]
    InvalidWell(String),

    #[error("well {well} is outside a {plate}-well plate")]
    WellOutOfBounds { well: String, plate: &'static str },

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
