//! The shared placement framing: inputs, outputs, and the driver loop
//! every strategy runs inside.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use stowage_resources::{NodeGroupResources, NodeGroupSchedulingMetadata, NodeId, Resources};

use crate::cancel::CancelToken;
use crate::efficiency::{
    compute_avg_packing_efficiency, compute_packing_efficiencies, NodePackingEfficiency,
    PackingEfficiency,
};
use crate::error::{PackingError, UnknownStrategy};
use crate::{
    az_aware_tightly_pack, distribute_evenly, minimal_fragmentation, single_az_tightly_pack,
    tightly_pack,
};

/// Inputs to one placement decision: one driver, `executor_count` identical
/// executors, and the candidate nodes with their caller-supplied preference
/// orders.
///
/// The priority orders drive every loop in the engine; the metadata map is
/// a pure lookup. Ids in a priority order that are missing from the map are
/// skipped. All inputs are read-only: strategies build their own tentative
/// reservation maps.
#[derive(Debug, Clone, Copy)]
pub struct PackingRequest<'a> {
    pub driver_resources: &'a Resources,
    pub executor_resources: &'a Resources,
    pub executor_count: usize,
    pub driver_priority_order: &'a [NodeId],
    pub executor_priority_order: &'a [NodeId],
    pub nodes: &'a NodeGroupSchedulingMetadata,
}

/// Outcome of one packing operation.
///
/// When `has_capacity` is false every other field holds its zero value and
/// must not be interpreted. When true, `executor_nodes` has exactly
/// `executor_count` entries in placement order, and the efficiency fields
/// describe the whole node group under the placement's reservations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingResult {
    pub driver_node: NodeId,
    pub executor_nodes: Vec<NodeId>,
    pub has_capacity: bool,
    pub avg_packing_efficiency: PackingEfficiency,
    pub node_packing_efficiencies: Vec<NodePackingEfficiency>,
}

impl PackingResult {
    /// The no-capacity result.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The five placement policies, selectable at runtime (e.g. from
/// configuration via [`FromStr`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackingStrategy {
    /// Round-robin spread across nodes in priority order.
    DistributeEvenly,
    /// First-fit, filling each node before moving on.
    TightlyPack,
    /// Tightly pack confined to a single availability zone; fails rather
    /// than crossing zones.
    SingleAzTightlyPack,
    /// Single-zone when possible, cross-zone tightly-pack otherwise.
    AzAwareTightlyPack,
    /// Open as few previously-empty nodes as possible.
    MinimalFragmentation,
}

impl PackingStrategy {
    pub fn all() -> [PackingStrategy; 5] {
        [
            PackingStrategy::DistributeEvenly,
            PackingStrategy::TightlyPack,
            PackingStrategy::SingleAzTightlyPack,
            PackingStrategy::AzAwareTightlyPack,
            PackingStrategy::MinimalFragmentation,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PackingStrategy::DistributeEvenly => "distribute-evenly",
            PackingStrategy::TightlyPack => "tightly-pack",
            PackingStrategy::SingleAzTightlyPack => "single-az-tightly-pack",
            PackingStrategy::AzAwareTightlyPack => "az-aware-tightly-pack",
            PackingStrategy::MinimalFragmentation => "minimal-fragmentation",
        }
    }

    /// Runs this strategy on `request`. Deterministic: identical inputs
    /// produce identical results.
    pub fn place(
        &self,
        token: &CancelToken,
        request: &PackingRequest<'_>,
    ) -> Result<PackingResult, PackingError> {
        match self {
            PackingStrategy::DistributeEvenly => {
                distribute_evenly::distribute_evenly(token, request)
            }
            PackingStrategy::TightlyPack => tightly_pack::tightly_pack(token, request),
            PackingStrategy::SingleAzTightlyPack => {
                single_az_tightly_pack::single_az_tightly_pack(token, request)
            }
            PackingStrategy::AzAwareTightlyPack => {
                az_aware_tightly_pack::az_aware_tightly_pack(token, request)
            }
            PackingStrategy::MinimalFragmentation => {
                minimal_fragmentation::minimal_fragmentation(token, request)
            }
        }
    }
}

impl fmt::Display for PackingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackingStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackingStrategy::all()
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// A successful assignment before efficiencies are attached.
pub(crate) struct Placement {
    pub(crate) driver_node: NodeId,
    pub(crate) executor_nodes: Vec<NodeId>,
    pub(crate) reservations: NodeGroupResources,
}

/// Rejects inputs that violate the non-negativity invariants. Data-driven
/// conditions (unknown ids, empty orders) are not errors; they surface as
/// a no-capacity result.
pub(crate) fn validate(request: &PackingRequest<'_>) -> Result<(), PackingError> {
    if request.driver_resources.is_negative() {
        return Err(PackingError::InvalidInput(
            "driver resources have a negative component".to_string(),
        ));
    }
    if request.executor_resources.is_negative() {
        return Err(PackingError::InvalidInput(
            "executor resources have a negative component".to_string(),
        ));
    }
    for (node, metadata) in request.nodes.iter() {
        if metadata.available.is_negative() || metadata.schedulable.is_negative() {
            return Err(PackingError::InvalidInput(format!(
                "node {node} metadata has a negative component"
            )));
        }
    }
    Ok(())
}

/// The driver loop shared by every strategy: walk driver candidates in
/// priority order, tentatively reserve the driver on the first node that
/// accommodates it, and hand the reservation map to the strategy-specific
/// executor distributor. The first driver candidate whose distribution
/// succeeds wins.
pub(crate) fn place_application<F>(
    token: &CancelToken,
    request: &PackingRequest<'_>,
    mut distribute_executors: F,
) -> Result<Option<Placement>, PackingError>
where
    F: FnMut(
        &CancelToken,
        &PackingRequest<'_>,
        &mut NodeGroupResources,
    ) -> Result<Option<Vec<NodeId>>, PackingError>,
{
    for driver_node in request.driver_priority_order {
        token.bail_if_cancelled()?;
        let Some(metadata) = request.nodes.get(driver_node) else {
            continue;
        };
        if request.driver_resources.greater_than(&metadata.available) {
            trace!(node = %driver_node, "driver does not fit");
            continue;
        }

        let mut reservations = NodeGroupResources::new();
        reservations.insert(driver_node.clone(), *request.driver_resources);

        if let Some(executor_nodes) = distribute_executors(token, request, &mut reservations)? {
            debug!(
                driver = %driver_node,
                executors = executor_nodes.len(),
                "placement found"
            );
            return Ok(Some(Placement {
                driver_node: driver_node.clone(),
                executor_nodes,
                reservations,
            }));
        }
    }
    Ok(None)
}

/// Attaches whole-group efficiencies to a successful placement.
pub(crate) fn into_result(request: &PackingRequest<'_>, placement: Placement) -> PackingResult {
    let node_packing_efficiencies = compute_packing_efficiencies(
        request.driver_priority_order,
        request.nodes,
        &placement.reservations,
    );
    let avg_packing_efficiency =
        compute_avg_packing_efficiency(request.nodes, &node_packing_efficiencies);
    PackingResult {
        driver_node: placement.driver_node,
        executor_nodes: placement.executor_nodes,
        has_capacity: true,
        avg_packing_efficiency,
        node_packing_efficiencies,
    }
}

/// Validate, place, and wrap up: the whole pipeline for strategies without
/// zone selection.
pub(crate) fn run<F>(
    token: &CancelToken,
    request: &PackingRequest<'_>,
    distribute_executors: F,
) -> Result<PackingResult, PackingError>
where
    F: FnMut(
        &CancelToken,
        &PackingRequest<'_>,
        &mut NodeGroupResources,
    ) -> Result<Option<Vec<NodeId>>, PackingError>,
{
    validate(request)?;
    match place_application(token, request, distribute_executors)? {
        Some(placement) => Ok(into_result(request, placement)),
        None => Ok(PackingResult::empty()),
    }
}
