/// Errors from parsing the `lat:lng` text format.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected `lat:lng`, got {0:?}")]
    MalformedLatLng(String),

    #[error("invalid number {text:?} in {context:?}")]
    InvalidNumber { text: String, context: String },

    #[error("coordinate out of range: {0:?}")]
    OutOfRange(String),

    #[error("expected exactly one point, got {0}")]
    NotOnePoint(usize),

    #[error("index text must have 3 `#`-separated sections, got {0}")]
    SectionCount(usize),

    #[error("polyline needs at least 2 vertices, got {0}")]
    ShortPolyline(usize),
}

pub type Result<T> = std::result::Result<T, ParseError>;
