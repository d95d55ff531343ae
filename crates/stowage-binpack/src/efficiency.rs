//! Packing-efficiency metrics: how tightly a placement commits the cluster.
//!
//! Efficiency is the committed fraction of a node's schedulable capacity,
//! where committed = (schedulable − available) + the tentative reservation
//! from the placement under evaluation. Downstream autoscalers and
//! admission controllers act on these numbers, and the single-AZ strategy
//! uses them to choose between candidate zones.

use serde::{Deserialize, Serialize};
use stowage_resources::{
    NodeGroupResources, NodeGroupSchedulingMetadata, NodeId, NodeSchedulingMetadata, Quantity,
};

/// Committed fraction per resource, each in `[0, 1]`.
///
/// `max` is the largest of the three. Note that [`less_than`] does NOT use
/// `max`: strategy comparison deliberately ignores GPU so that GPU-heavy
/// nodes are not penalized when choosing between placements.
///
/// [`less_than`]: PackingEfficiency::less_than
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingEfficiency {
    pub cpu: f64,
    pub memory: f64,
    pub gpu: f64,
    pub max: f64,
}

impl PackingEfficiency {
    /// The zero efficiency, used in empty packing results.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Strategy-selection comparison on `max(cpu, memory)` only. GPU is
    /// excluded on purpose; see the type-level docs.
    pub fn less_than(&self, other: &PackingEfficiency) -> bool {
        self.cpu.max(self.memory) < other.cpu.max(other.memory)
    }
}

/// Efficiency of one node, labeled with its id for telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePackingEfficiency {
    pub node: NodeId,
    pub efficiency: PackingEfficiency,
}

/// Efficiency of a single node under `reserved`.
///
/// A node with zero schedulable GPU reports GPU efficiency 0 here and is
/// excluded from the cluster-wide GPU mean in
/// [`compute_avg_packing_efficiency`].
pub fn node_packing_efficiency(
    node: &str,
    metadata: &NodeSchedulingMetadata,
    reserved: &NodeGroupResources,
) -> PackingEfficiency {
    let mut used = metadata.schedulable;
    used.sub(&metadata.available);
    used.add(&reserved.get_or_zero(node));

    let cpu = ratio(used.cpu, metadata.schedulable.cpu);
    let memory = ratio(used.memory, metadata.schedulable.memory);
    let gpu = if metadata.schedulable.gpu.is_zero() {
        0.0
    } else {
        ratio(used.gpu, metadata.schedulable.gpu)
    };

    PackingEfficiency {
        cpu,
        memory,
        gpu,
        max: cpu.max(memory).max(gpu),
    }
}

/// `used / total`, normalizing a zero total to 1 so the ratio is 0 rather
/// than a division by zero. Floats only appear here, after all fit
/// decisions are made.
fn ratio(used: Quantity, total: Quantity) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    used.nanos() as f64 / total.nanos() as f64
}

/// Per-node efficiencies for **every** node in the group under `reserved`.
///
/// Ordered by `priority_order`; group nodes absent from the order are
/// appended sorted by id, so the output is a deterministic function of the
/// inputs regardless of map iteration order.
pub fn compute_packing_efficiencies(
    priority_order: &[NodeId],
    nodes: &NodeGroupSchedulingMetadata,
    reserved: &NodeGroupResources,
) -> Vec<NodePackingEfficiency> {
    let mut entries = Vec::with_capacity(nodes.len());
    let mut seen = std::collections::HashSet::with_capacity(nodes.len());

    for node in priority_order {
        if let Some(metadata) = nodes.get(node) {
            if seen.insert(node.as_str()) {
                entries.push(NodePackingEfficiency {
                    node: node.clone(),
                    efficiency: node_packing_efficiency(node, metadata, reserved),
                });
            }
        }
    }

    let mut leftover: Vec<(&NodeId, &NodeSchedulingMetadata)> = nodes
        .iter()
        .filter(|(node, _)| !seen.contains(node.as_str()))
        .collect();
    leftover.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (node, metadata) in leftover {
        entries.push(NodePackingEfficiency {
            node: node.clone(),
            efficiency: node_packing_efficiency(node, metadata, reserved),
        });
    }

    entries
}

/// Cluster-wide average of per-node efficiencies.
///
/// CPU and memory are plain means over all entries. The GPU mean covers
/// only nodes with schedulable GPU (1.0 when there are none, so a GPU-less
/// cluster never looks under-packed on a dimension it does not have).
/// `max` is the mean of the per-node `max` values.
pub fn compute_avg_packing_efficiency(
    nodes: &NodeGroupSchedulingMetadata,
    per_node: &[NodePackingEfficiency],
) -> PackingEfficiency {
    let mut cpu_sum = 0.0;
    let mut memory_sum = 0.0;
    let mut max_sum = 0.0;
    let mut gpu_sum = 0.0;
    let mut gpu_nodes = 0usize;

    for entry in per_node {
        cpu_sum += entry.efficiency.cpu;
        memory_sum += entry.efficiency.memory;
        max_sum += entry.efficiency.max;
        let has_gpu = nodes
            .get(&entry.node)
            .is_some_and(|metadata| !metadata.schedulable.gpu.is_zero());
        if has_gpu {
            gpu_sum += entry.efficiency.gpu;
            gpu_nodes += 1;
        }
    }

    let count = per_node.len().max(1) as f64;
    let gpu = if gpu_nodes == 0 {
        1.0
    } else {
        gpu_sum / gpu_nodes as f64
    };

    PackingEfficiency {
        cpu: cpu_sum / count,
        memory: memory_sum / count,
        gpu,
        max: max_sum / count,
    }
}
