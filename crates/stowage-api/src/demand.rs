//! The demand record: what an instance group is asking the cluster scaler
//! for.
//!
//! Two on-wire versions of this record exist in the control plane; version
//! conversion happens in its webhook, and the engine only ever sees this
//! unified shape.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stowage_resources::{Quantity, Resources};

use crate::convert::resources_from_quantities;

/// Lifecycle phase of a demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandPhase {
    /// Freshly created, not yet acknowledged by the scaler.
    #[default]
    #[serde(rename = "")]
    Empty,
    /// Acknowledged, capacity not yet provisioned.
    #[serde(rename = "pending")]
    Pending,
    /// Capacity exists to meet the demand.
    #[serde(rename = "fulfilled")]
    Fulfilled,
    /// The scaler cannot satisfy it, e.g. a unit larger than any instance
    /// the group is configured to use.
    #[serde(rename = "cannot-fulfill")]
    CannotFulfill,
}

impl DemandPhase {
    pub fn all() -> [DemandPhase; 4] {
        [
            DemandPhase::Empty,
            DemandPhase::Pending,
            DemandPhase::Fulfilled,
            DemandPhase::CannotFulfill,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandPhase::Empty => "",
            DemandPhase::Pending => "pending",
            DemandPhase::Fulfilled => "fulfilled",
            DemandPhase::CannotFulfill => "cannot-fulfill",
        }
    }
}

impl fmt::Display for DemandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from parsing a demand phase string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown demand phase {0:?}")]
pub struct UnknownPhase(pub String);

impl FromStr for DemandPhase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DemandPhase::all()
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// One homogeneous batch of instances within a demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandUnit {
    /// Named quantities per instance (`cpu`, `memory`, `nvidia.com/gpu`, ...).
    pub resources: BTreeMap<String, Quantity>,
    /// How many instances of this shape are needed.
    pub count: usize,
}

impl DemandUnit {
    /// Per-instance demand as the engine's packing vector.
    pub fn to_resources(&self) -> Resources {
        resources_from_quantities(&self.resources)
    }
}

/// Status block of a demand record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandStatus {
    pub phase: DemandPhase,
    #[serde(
        rename = "last-transition-time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_transition_time: Option<DateTime<Utc>>,
}

/// A request for cluster capacity on behalf of one instance group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    #[serde(rename = "instance-group")]
    pub instance_group: String,
    /// Long-lived demands keep their capacity until deleted; short-lived
    /// ones are released once fulfilled.
    #[serde(rename = "is-long-lived", default)]
    pub is_long_lived: bool,
    pub units: Vec<DemandUnit>,
    #[serde(default)]
    pub status: DemandStatus,
}

impl Demand {
    /// Total instance count across all units.
    pub fn total_count(&self) -> usize {
        self.units.iter().map(|unit| unit.count).sum()
    }
}
