use crate::plan::{EndpointId, PlanKind};
use thiserror::Error;

/// Fatal errors raised by the plan passes.
///
/// Neither variant is recoverable: a pass either returns a complete plan (or
/// pattern list) or fails outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("{pass}: unsupported plan node `{kind}`")]
    UnsupportedPlanNode { kind: PlanKind, pass: &'static str },

    #[error("cannot merge a request for `{found}` into a group for `{expected}`")]
    InvalidMergeTarget {
        expected: EndpointId,
        found: EndpointId,
    },
}

pub type Result<T> = std::result::Result<T, PlanError>;
