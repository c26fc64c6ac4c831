//! Operation notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User-facing operation a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    QueryPool,
    QueryShares,
    AddLiquidity,
    RemoveLiquidity,
    Swap,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QueryPool => "query_pool",
            Self::QueryShares => "query_shares",
            Self::AddLiquidity => "add_liquidity",
            Self::RemoveLiquidity => "remove_liquidity",
            Self::Swap => "swap",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure,
    /// The operation went through but a follow-up step did not.
    Warning,
}

/// One report about an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub outcome: Outcome,
    pub message: String,
}

impl Notification {
    pub fn new(operation: Operation, outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            operation,
            outcome,
            message: message.into(),
        }
    }

    pub fn success(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, Outcome::Success, message)
    }

    pub fn failure(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, Outcome::Failure, message)
    }

    pub fn warning(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, Outcome::Warning, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.outcome, self.operation, self.message)
    }
}
