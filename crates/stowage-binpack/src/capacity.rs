//! How many executors fit on a node.

use stowage_resources::{
    NodeGroupResources, NodeGroupSchedulingMetadata, NodeId, Quantity, Resources,
};

/// Capacity reported for a node that requires nothing in some dimension:
/// that dimension never constrains the count.
pub const UNBOUNDED: usize = usize::MAX;

/// A node paired with the number of executors it can still accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCapacity {
    pub node: NodeId,
    pub capacity: usize,
}

/// How many times `required` fits within `available - reserved` along one
/// dimension, computed exactly.
///
/// Returns 0 when `reserved` already exceeds `available` (which a correct
/// reservation map never produces, but a stale one might) and
/// [`UNBOUNDED`] when nothing is required.
pub fn dimension_capacity(available: Quantity, reserved: Quantity, required: Quantity) -> usize {
    if reserved > available {
        return 0;
    }
    if required.is_zero() {
        return UNBOUNDED;
    }
    if required.is_negative() {
        return 0;
    }
    available
        .saturating_sub(reserved)
        .div_floor(required)
        .map_or(0, |count| count.min(UNBOUNDED as i128) as usize)
}

/// Executors of shape `per_executor` fitting on a node, accounting for an
/// existing reservation: the minimum of the per-dimension capacities.
pub fn node_capacity(
    available: &Resources,
    reserved: &Resources,
    per_executor: &Resources,
) -> usize {
    dimension_capacity(available.cpu, reserved.cpu, per_executor.cpu)
        .min(dimension_capacity(
            available.memory,
            reserved.memory,
            per_executor.memory,
        ))
        .min(dimension_capacity(
            available.gpu,
            reserved.gpu,
            per_executor.gpu,
        ))
}

/// Capacities for every known node in `priority_order`, in that order.
/// Ids absent from the metadata map are skipped.
pub fn node_capacities(
    priority_order: &[NodeId],
    nodes: &NodeGroupSchedulingMetadata,
    reserved: &NodeGroupResources,
    per_executor: &Resources,
) -> Vec<NodeCapacity> {
    priority_order
        .iter()
        .filter_map(|node| {
            nodes.get(node).map(|metadata| NodeCapacity {
                node: node.clone(),
                capacity: node_capacity(
                    &metadata.available,
                    &reserved.get_or_zero(node),
                    per_executor,
                ),
            })
        })
        .collect()
}

/// Drops entries that cannot accept a single executor.
pub fn with_spare_capacity(capacities: Vec<NodeCapacity>) -> Vec<NodeCapacity> {
    capacities
        .into_iter()
        .filter(|entry| entry.capacity > 0)
        .collect()
}
