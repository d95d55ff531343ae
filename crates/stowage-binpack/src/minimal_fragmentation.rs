//! Executor distribution that opens as few new nodes as possible.

use tracing::trace;

use stowage_resources::{NodeGroupResources, NodeId, Resources};

use crate::binpack::{run, PackingRequest, PackingResult};
use crate::cancel::CancelToken;
use crate::capacity::{node_capacities, node_capacity, with_spare_capacity, NodeCapacity};
use crate::error::PackingError;

/// Places the driver on the first feasible node, then distributes
/// executors so that as few empty nodes as possible become occupied.
///
/// Nodes already carrying a reservation (initially just the driver node)
/// are always preferred. Among them the smallest node that fits every
/// remaining executor takes them all; otherwise the smallest node with any
/// room is filled and the remainder handled the same way. Only when no
/// occupied node can take an executor is one empty node promoted (the
/// first in the executor priority order with room for at least one) and
/// the distribution continues. Fails when executors remain and no node can
/// accept another one.
pub fn minimal_fragmentation(
    token: &CancelToken,
    request: &PackingRequest<'_>,
) -> Result<PackingResult, PackingError> {
    run(token, request, distribute_executors_minimal_fragmentation)
}

fn distribute_executors_minimal_fragmentation(
    token: &CancelToken,
    request: &PackingRequest<'_>,
    reservations: &mut NodeGroupResources,
) -> Result<Option<Vec<NodeId>>, PackingError> {
    let mut placed = Vec::with_capacity(request.executor_count);
    let mut remaining = request.executor_count;

    while remaining > 0 {
        token.bail_if_cancelled()?;

        // Occupied nodes with room, smallest first; the sort is stable so
        // equal capacities keep their priority-order position.
        let mut candidates: Vec<NodeCapacity> = with_spare_capacity(node_capacities(
            request.executor_priority_order,
            request.nodes,
            reservations,
            request.executor_resources,
        ))
        .into_iter()
        .filter(|candidate| reservations.contains(&candidate.node))
        .collect();
        candidates.sort_by_key(|candidate| candidate.capacity);

        if candidates.is_empty() {
            let Some(promoted) = first_empty_node_with_room(request, reservations) else {
                return Ok(None);
            };
            trace!(node = %promoted, "occupying an empty node");
            reservations.insert(promoted, Resources::zero());
            continue;
        }

        if let Some(fits_all) = candidates
            .iter()
            .find(|candidate| candidate.capacity >= remaining)
        {
            place(&mut placed, reservations, &fits_all.node, remaining, request);
            remaining = 0;
        } else {
            let smallest = &candidates[0];
            place(
                &mut placed,
                reservations,
                &smallest.node,
                smallest.capacity,
                request,
            );
            remaining -= smallest.capacity;
        }
    }

    Ok(Some(placed))
}

/// The first node in the executor priority order that carries no
/// reservation yet and can accept at least one executor.
fn first_empty_node_with_room(
    request: &PackingRequest<'_>,
    reservations: &NodeGroupResources,
) -> Option<NodeId> {
    request
        .executor_priority_order
        .iter()
        .find(|node| {
            if reservations.contains(node.as_str()) {
                return false;
            }
            request.nodes.get(node.as_str()).is_some_and(|metadata| {
                node_capacity(
                    &metadata.available,
                    &Resources::zero(),
                    request.executor_resources,
                ) > 0
            })
        })
        .cloned()
}

fn place(
    placed: &mut Vec<NodeId>,
    reservations: &mut NodeGroupResources,
    node: &str,
    count: usize,
    request: &PackingRequest<'_>,
) {
    for _ in 0..count {
        reservations.add_to(node, request.executor_resources);
        placed.push(node.to_string());
    }
}
