use crate::constants::{CONDITION_READY, CONDITION_SYNCED};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The status of a `Condition`.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl Default for ConditionStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Display for ConditionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionStatus::True => write!(f, "True"),
            ConditionStatus::False => write!(f, "False"),
            ConditionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// An entry of a requirement's `status.conditions` list. A condition set holds at most one
/// condition of each `type_`.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Condition {
    fn new<S1, S2>(type_: S1, status: ConditionStatus, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            type_: type_.into(),
            status,
            last_transition_time: Some(Time(chrono::Utc::now())),
            reason: reason.into(),
            message: String::new(),
        }
    }

    /// The fulfilling side reports the resource as ready for use.
    pub fn available() -> Self {
        Self::new(CONDITION_READY, ConditionStatus::True, "Available")
    }

    /// The last sync pass failed with `message`.
    pub fn reconcile_error<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            ..Self::new(CONDITION_SYNCED, ConditionStatus::False, "ReconcileError")
        }
    }

    /// Whether `self` and `other` describe the same state, ignoring the transition time.
    pub fn equal(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Collapse `conditions` so that each type appears once. The last condition of a type wins and
/// keeps the position of the first one.
pub(crate) fn unique_by_type(conditions: Vec<Condition>) -> Vec<Condition> {
    let mut unique: Vec<Condition> = Vec::with_capacity(conditions.len());
    for condition in conditions {
        match unique.iter_mut().find(|c| c.type_ == condition.type_) {
            Some(existing) => *existing = condition,
            None => unique.push(condition),
        }
    }
    unique
}
