use crate::mapping::MappingError;
use crate::upstream::UpstreamError;
use thiserror::Error;

/// Fatal failures of a reach computation.
///
/// Invalid input is not an error: it is recorded on the
/// [`ReachResult`](super::ReachResult) as a terminal status instead.
#[derive(Debug, Error)]
pub enum ReachError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}
