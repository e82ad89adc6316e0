//! Error types for latch

use thiserror::Error;

use crate::{ChoreId, GoalId, InstanceId};

/// Core error type for latch operations
#[derive(Debug, Error)]
pub enum LatchError {
    #[error("Chore not found: {0}")]
    ChoreNotFound(ChoreId),

    #[error("Chore instance not found: {0}")]
    InstanceNotFound(InstanceId),

    #[error("Learning goal not found: {0}")]
    GoalNotFound(GoalId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Device error: {0}")]
    DeviceError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::DeviceError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LatchError>;
