//! Shared constructors for the strategy test modules.

use std::collections::HashMap;

use stowage_resources::{
    NodeGroupSchedulingMetadata, NodeId, NodeSchedulingMetadata, Quantity, Resources,
};

use crate::binpack::{PackingRequest, PackingResult, PackingStrategy};
use crate::cancel::CancelToken;
use crate::error::PackingError;

pub(crate) fn res(cpu: i64, memory: i64, gpu: i64) -> Resources {
    Resources::new(
        Quantity::from_whole(cpu),
        Quantity::from_whole(memory),
        Quantity::from_whole(gpu),
    )
}

/// Metadata for an otherwise idle node: schedulable == available.
pub(crate) fn metadata(cpu: i64, memory: i64, gpu: i64, zone: &str) -> NodeSchedulingMetadata {
    NodeSchedulingMetadata {
        available: res(cpu, memory, gpu),
        schedulable: res(cpu, memory, gpu),
        zone_label: zone.to_string(),
    }
}

/// Metadata with distinct (available, total) pairs per dimension.
pub(crate) fn metadata_with_totals(
    cpu: (i64, i64),
    memory: (i64, i64),
    gpu: (i64, i64),
    zone: &str,
) -> NodeSchedulingMetadata {
    NodeSchedulingMetadata {
        available: res(cpu.0, memory.0, gpu.0),
        schedulable: res(cpu.1, memory.1, gpu.1),
        zone_label: zone.to_string(),
    }
}

pub(crate) fn node_group(
    entries: &[(&str, NodeSchedulingMetadata)],
) -> NodeGroupSchedulingMetadata {
    entries
        .iter()
        .map(|(node, metadata)| (node.to_string(), metadata.clone()))
        .collect()
}

pub(crate) fn order(ids: &[&str]) -> Vec<NodeId> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// One placement scenario: driver + executors over a node group, with the
/// same priority order for driver and executor selection (as the callers
/// in the control plane pass today).
pub(crate) struct Scenario {
    pub(crate) driver: Resources,
    pub(crate) executor: Resources,
    pub(crate) count: usize,
    pub(crate) nodes: NodeGroupSchedulingMetadata,
    pub(crate) priority: Vec<NodeId>,
}

impl Scenario {
    pub(crate) fn place(
        &self,
        strategy: PackingStrategy,
    ) -> Result<PackingResult, PackingError> {
        let request = PackingRequest {
            driver_resources: &self.driver,
            executor_resources: &self.executor,
            executor_count: self.count,
            driver_priority_order: &self.priority,
            executor_priority_order: &self.priority,
            nodes: &self.nodes,
        };
        strategy.place(&CancelToken::new(), &request)
    }

    pub(crate) fn place_ok(&self, strategy: PackingStrategy) -> PackingResult {
        self.place(strategy).unwrap()
    }
}

/// Executor assignments as node → count, for order-insensitive assertions.
pub(crate) fn executor_counts(result: &PackingResult) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for node in &result.executor_nodes {
        *counts.entry(node.clone()).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn counts(entries: &[(&str, usize)]) -> HashMap<String, usize> {
    entries
        .iter()
        .map(|(node, count)| (node.to_string(), *count))
        .collect()
}
