use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Invalid geometry configuration: {0}")]
    Configuration(String),

    #[error("Inconsistent shot counts: {what} implies {found} shots, expected {expected}")]
    ShotCountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Shot index {index} out of bounds for a geometry with {nsrc} shots")]
    ShotIndexOutOfBounds { index: usize, nsrc: usize },

    #[error("Invalid geometry key: {0} (expected \"source\" or \"receiver\")")]
    InvalidGeometryKey(String),

    #[error("Unknown trace header field: {0}")]
    UnknownHeaderField(String),

    #[error("Cannot build a geometry without shots")]
    EmptyGeometry,

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Trace header file error: {0}")]
    CsvError(#[from] csv::Error),
}

impl GeometryError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        GeometryError::Configuration(msg.into())
    }
}

impl PartialEq for GeometryError {
    fn eq(&self, other: &Self) -> bool {
        use GeometryError::*;
        match (self, other) {
            (Configuration(a), Configuration(b)) => a == b,
            (
                ShotCountMismatch {
                    what: wa,
                    expected: ea,
                    found: fa,
                },
                ShotCountMismatch {
                    what: wb,
                    expected: eb,
                    found: fb,
                },
            ) => wa == wb && ea == eb && fa == fb,
            (
                ShotIndexOutOfBounds {
                    index: ia,
                    nsrc: na,
                },
                ShotIndexOutOfBounds {
                    index: ib,
                    nsrc: nb,
                },
            ) => ia == ib && na == nb,
            (InvalidGeometryKey(a), InvalidGeometryKey(b)) => a == b,
            (UnknownHeaderField(a), UnknownHeaderField(b)) => a == b,
            (EmptyGeometry, EmptyGeometry) => true,

            // foreign payloads are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
