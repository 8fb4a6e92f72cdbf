use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Historical segment is empty, nothing to project from")]
    EmptySegment,

    #[error("Last historical year {last_year} must come before the anchor years {first} and {second}")]
    AnchorOrder {
        last_year: i32,
        first: i32,
        second: i32,
    },

    #[error("Projection horizon of {horizon} years exceeds the maximum of {max}")]
    HorizonTooLong { horizon: i32, max: i32 },
}
