//! The resource-reservation record: a placement made durable.
//!
//! Binds the driver and each executor of one application to the node the
//! engine chose for it. The control plane stores these records and binds
//! pods to them as they materialize (`status.pods`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stowage_binpack::PackingResult;
use stowage_resources::{NodeGroupResources, NodeId, Quantity, Resources};

use crate::convert::{quantities_from_resources, resources_from_quantities};

/// Reservation name of the driver.
pub const DRIVER_RESERVATION_NAME: &str = "driver";

/// Reservation name of the `index`-th executor (zero-based index,
/// one-based name).
pub fn executor_reservation_name(index: usize) -> String {
    format!("executor-{}", index + 1)
}

/// One reserved slot: a node and the quantities committed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub node: NodeId,
    pub resources: BTreeMap<String, Quantity>,
}

impl Reservation {
    pub fn new(node: impl Into<NodeId>, resources: &Resources) -> Self {
        Reservation {
            node: node.into(),
            resources: quantities_from_resources(resources),
        }
    }

    /// The committed quantities as the engine's vector.
    pub fn to_resources(&self) -> Resources {
        resources_from_quantities(&self.resources)
    }
}

/// Spec block: reservation name (`driver`, `executor-1`, ...) → slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReservationSpec {
    pub reservations: BTreeMap<String, Reservation>,
}

/// Status block: reservation name → name of the pod bound to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReservationStatus {
    pub pods: BTreeMap<String, String>,
}

/// A full reservation record for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReservation {
    pub spec: ResourceReservationSpec,
    #[serde(default)]
    pub status: ResourceReservationStatus,
}

impl ResourceReservation {
    /// Materializes a successful packing into a reservation record: one
    /// slot for the driver, one per executor in placement order. Returns
    /// `None` for a no-capacity result.
    pub fn from_packing(
        result: &PackingResult,
        driver_resources: &Resources,
        executor_resources: &Resources,
    ) -> Option<Self> {
        if !result.has_capacity {
            return None;
        }

        let mut reservations = BTreeMap::new();
        reservations.insert(
            DRIVER_RESERVATION_NAME.to_string(),
            Reservation::new(result.driver_node.clone(), driver_resources),
        );
        for (index, node) in result.executor_nodes.iter().enumerate() {
            reservations.insert(
                executor_reservation_name(index),
                Reservation::new(node.clone(), executor_resources),
            );
        }

        Some(ResourceReservation {
            spec: ResourceReservationSpec { reservations },
            status: ResourceReservationStatus::default(),
        })
    }

    /// Aggregates the record into per-node committed resources, the shape
    /// the engine takes existing reservations in.
    pub fn node_group_resources(&self) -> NodeGroupResources {
        let mut group = NodeGroupResources::new();
        for reservation in self.spec.reservations.values() {
            group.add_to(&reservation.node, &reservation.to_resources());
        }
        group
    }
}
