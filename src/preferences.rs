//! The dashboard's two scalar preferences.
//!
//! Both slots belong to the presentation layer. Values are stored as plain
//! strings and never validated on write; reads fall back to the dashboard
//! defaults when a slot is absent or unreadable as expected.

use std::sync::Arc;

use crate::storage::{FIELD_OF_STUDY, GOAL_HOURS};
use crate::substrate::{Substrate, SubstrateError};

pub const DEFAULT_FIELD_OF_STUDY: &str = "BTech";
pub const DEFAULT_GOAL_HOURS: u32 = 10;
pub const MIN_GOAL_HOURS: u32 = 1;

pub struct Preferences {
    substrate: Arc<dyn Substrate>,
}

impl Clone for Preferences {
    fn clone(&self) -> Self {
        Self {
            substrate: Arc::clone(&self.substrate),
        }
    }
}

impl Preferences {
    pub fn new(substrate: Arc<dyn Substrate>) -> Self {
        Self { substrate }
    }

    pub fn field_of_study(&self) -> Result<String, SubstrateError> {
        Ok(self
            .substrate
            .get(FIELD_OF_STUDY)?
            .unwrap_or_else(|| DEFAULT_FIELD_OF_STUDY.to_string()))
    }

    pub fn set_field_of_study(&self, field: &str) -> Result<(), SubstrateError> {
        self.substrate.set(FIELD_OF_STUDY, field)
    }

    /// Weekly goal in hours. Anything that is not an integer reads as the default.
    pub fn goal_hours(&self) -> Result<u32, SubstrateError> {
        let raw = self.substrate.get(GOAL_HOURS)?;
        Ok(match raw.as_deref().map(str::trim).map(str::parse::<u32>) {
            Some(Ok(hours)) => hours,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Unparseable goal hours, using default");
                DEFAULT_GOAL_HOURS
            }
            None => DEFAULT_GOAL_HOURS,
        })
    }

    pub fn set_goal_hours(&self, hours: u32) -> Result<(), SubstrateError> {
        self.substrate.set(GOAL_HOURS, &hours.to_string())
    }

    pub fn increase_goal_hours(&self) -> Result<u32, SubstrateError> {
        let hours = self.goal_hours()?.saturating_add(1);
        self.set_goal_hours(hours)?;
        Ok(hours)
    }

    /// Step the goal down by one hour, never below [`MIN_GOAL_HOURS`].
    pub fn decrease_goal_hours(&self) -> Result<u32, SubstrateError> {
        let current = self.goal_hours()?;
        if current <= MIN_GOAL_HOURS {
            return Ok(current);
        }
        let hours = current - 1;
        self.set_goal_hours(hours)?;
        Ok(hours)
    }
}
