//! Per-node scheduling metadata and the reservation map strategies
//! accumulate into during one placement attempt.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::resources::Resources;

/// Unique identifier for a node in the cluster.
pub type NodeId = String;

/// What the scheduler knows about one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSchedulingMetadata {
    /// Resources currently free for new reservations.
    pub available: Resources,
    /// Total schedulable capacity. `available <= schedulable` componentwise.
    pub schedulable: Resources,
    /// Availability-zone label; may be empty when the cluster has no zones.
    pub zone_label: String,
}

/// Node-id → metadata for a candidate node group.
///
/// A pure lookup table: iteration order is never allowed to influence a
/// placement. Every ordered walk in the engine is driven by a caller
/// priority list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGroupSchedulingMetadata(HashMap<NodeId, NodeSchedulingMetadata>);

impl NodeGroupSchedulingMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: impl Into<NodeId>, metadata: NodeSchedulingMetadata) {
        self.0.insert(node.into(), metadata);
    }

    pub fn get(&self, node: &str) -> Option<&NodeSchedulingMetadata> {
        self.0.get(node)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.0.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeSchedulingMetadata)> {
        self.0.iter()
    }
}

impl FromIterator<(NodeId, NodeSchedulingMetadata)> for NodeGroupSchedulingMetadata {
    fn from_iter<I: IntoIterator<Item = (NodeId, NodeSchedulingMetadata)>>(iter: I) -> Self {
        NodeGroupSchedulingMetadata(iter.into_iter().collect())
    }
}

/// Node-id → resources, used for the tentative reservations built up while
/// attempting one placement. Local to a single call; never aliases caller
/// state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGroupResources(HashMap<NodeId, Resources>);

impl NodeGroupResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: impl Into<NodeId>, resources: Resources) {
        self.0.insert(node.into(), resources);
    }

    pub fn get(&self, node: &str) -> Option<&Resources> {
        self.0.get(node)
    }

    /// The reservation on `node`, or the zero vector when there is none.
    pub fn get_or_zero(&self, node: &str) -> Resources {
        self.0.get(node).copied().unwrap_or_else(Resources::zero)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.0.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Resources)> {
        self.0.iter()
    }

    /// Accumulates `resources` onto the reservation for `node`.
    pub fn add_to(&mut self, node: &str, resources: &Resources) {
        self.0
            .entry(node.to_string())
            .or_insert_with(Resources::zero)
            .add(resources);
    }

    /// Map-wise addition: keys missing from `self` are inserted.
    pub fn add(&mut self, other: &NodeGroupResources) {
        for (node, resources) in &other.0 {
            self.add_to(node, resources);
        }
    }

    /// Map-wise signed subtraction: a key present only in `other` yields
    /// the negation of its value.
    pub fn sub(&mut self, other: &NodeGroupResources) {
        for (node, resources) in &other.0 {
            self.0
                .entry(node.clone())
                .or_insert_with(Resources::zero)
                .sub(resources);
        }
    }
}

impl FromIterator<(NodeId, Resources)> for NodeGroupResources {
    fn from_iter<I: IntoIterator<Item = (NodeId, Resources)>>(iter: I) -> Self {
        NodeGroupResources(iter.into_iter().collect())
    }
}
