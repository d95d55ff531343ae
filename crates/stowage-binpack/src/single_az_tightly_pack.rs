//! Tightly-pack confined to a single availability zone.

use std::collections::HashSet;

use tracing::debug;

use stowage_resources::{NodeGroupSchedulingMetadata, NodeId};

use crate::binpack::{
    into_result, place_application, validate, PackingRequest, PackingResult, Placement,
};
use crate::cancel::CancelToken;
use crate::efficiency::{
    compute_avg_packing_efficiency, node_packing_efficiency, NodePackingEfficiency,
    PackingEfficiency,
};
use crate::error::PackingError;
use crate::tightly_pack::distribute_executors_tightly;

/// Packs the whole application, driver and every executor, into one
/// availability zone, never crossing zones.
///
/// Zones are tried in order of their first appearance in the driver
/// priority order, each as a tightly-pack over the priority orders filtered
/// to that zone. Among the zones that fit, the one packed most tightly
/// wins: averages are taken over the nodes the placement actually uses and
/// compared with the GPU-excluded comparator. On a tie the zone whose
/// driver sits earlier in the driver priority order is kept. Returns the
/// empty result when no single zone can hold the application.
pub fn single_az_tightly_pack(
    token: &CancelToken,
    request: &PackingRequest<'_>,
) -> Result<PackingResult, PackingError> {
    validate(request)?;
    match best_single_az_placement(token, request)? {
        Some(placement) => Ok(into_result(request, placement)),
        None => Ok(PackingResult::empty()),
    }
}

struct Candidate {
    placement: Placement,
    efficiency: PackingEfficiency,
    driver_position: usize,
}

pub(crate) fn best_single_az_placement(
    token: &CancelToken,
    request: &PackingRequest<'_>,
) -> Result<Option<Placement>, PackingError> {
    let mut best: Option<Candidate> = None;

    for zone in zones_in_priority_order(request) {
        token.bail_if_cancelled()?;

        let driver_order = nodes_in_zone(request.driver_priority_order, request.nodes, &zone);
        let executor_order =
            nodes_in_zone(request.executor_priority_order, request.nodes, &zone);
        let zone_request = PackingRequest {
            driver_priority_order: &driver_order,
            executor_priority_order: &executor_order,
            ..*request
        };

        let Some(placement) =
            place_application(token, &zone_request, distribute_executors_tightly)?
        else {
            continue;
        };

        let efficiency = used_nodes_efficiency(request.nodes, &placement);
        let driver_position = request
            .driver_priority_order
            .iter()
            .position(|node| *node == placement.driver_node)
            .unwrap_or(usize::MAX);

        let replaces = match &best {
            None => true,
            Some(current) => {
                current.efficiency.less_than(&efficiency)
                    || (!efficiency.less_than(&current.efficiency)
                        && driver_position < current.driver_position)
            }
        };
        if replaces {
            debug!(zone = %zone, driver = %placement.driver_node, "best single-zone placement so far");
            best = Some(Candidate {
                placement,
                efficiency,
                driver_position,
            });
        }
    }

    Ok(best.map(|candidate| candidate.placement))
}

/// Zone labels in order of their first appearance in the driver priority
/// order. Nodes outside the metadata map contribute nothing; an empty
/// label is a zone like any other.
fn zones_in_priority_order(request: &PackingRequest<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut zones = Vec::new();
    for node in request.driver_priority_order {
        if let Some(metadata) = request.nodes.get(node) {
            if seen.insert(metadata.zone_label.as_str()) {
                zones.push(metadata.zone_label.clone());
            }
        }
    }
    zones
}

fn nodes_in_zone(
    priority_order: &[NodeId],
    nodes: &NodeGroupSchedulingMetadata,
    zone: &str,
) -> Vec<NodeId> {
    priority_order
        .iter()
        .filter(|node| {
            nodes
                .get(node.as_str())
                .is_some_and(|metadata| metadata.zone_label == zone)
        })
        .cloned()
        .collect()
}

/// Average efficiency over just the nodes the placement touches (driver
/// node plus executor nodes), used to rank candidate zones.
fn used_nodes_efficiency(
    nodes: &NodeGroupSchedulingMetadata,
    placement: &Placement,
) -> PackingEfficiency {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for node in std::iter::once(&placement.driver_node).chain(placement.executor_nodes.iter()) {
        if !seen.insert(node.as_str()) {
            continue;
        }
        if let Some(metadata) = nodes.get(node) {
            entries.push(NodePackingEfficiency {
                node: node.clone(),
                efficiency: node_packing_efficiency(node, metadata, &placement.reservations),
            });
        }
    }
    compute_avg_packing_efficiency(nodes, &entries)
}
