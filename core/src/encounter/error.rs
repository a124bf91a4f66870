//! Error types for encounter aggregation

use thiserror::Error;

use crate::combat_log::{AgentId, SkillId};

/// Ways an event sequence can fail timeline indexing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineFault {
    #[error("event sequence is empty")]
    NoEvents,

    #[error("event at {time}ms references unknown agent {agent}")]
    UnknownAgent { time: u64, agent: AgentId },

    #[error("agent {agent} is listed more than once")]
    DuplicateAgent { agent: AgentId },
}

/// Errors that abort an aggregation run.
///
/// A run either completes or fails entirely; partial reports are never
/// returned.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("malformed timeline: {0}")]
    MalformedTimeline(#[from] TimelineFault),

    #[error("incomplete aggregate: no agent record for {agent}")]
    IncompleteAggregate { agent: AgentId },

    /// Recoverable: logged while the buff is treated as a single duration stack
    #[error("buff {buff} has no catalog entry")]
    UnknownBuffType { buff: SkillId },

    #[error("damage total overflowed for agent {agent}, skill {skill}")]
    ArithmeticOverflow { agent: AgentId, skill: SkillId },

    #[error("failed to build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
