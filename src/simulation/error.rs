use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrafficError {
    #[error("lane id {0} is outside 0..=3")]
    InvalidLane(usize),

    #[error("unknown lane direction {0:?}")]
    UnknownLaneName(String),

    #[error("malformed vehicle counts: {0}")]
    MalformedCounts(String),
}

pub type TrafficResult<T> = Result<T, TrafficError>;
