//! Conversions between wire-format resource maps and the engine's
//! [`Resources`] vector.
//!
//! The control plane speaks in named quantities (`cpu`, `memory`,
//! `nvidia.com/gpu`, ...); the engine packs a fixed three-dimensional
//! vector. Names the engine does not pack (e.g. `ephemeral-storage`) are
//! preserved on the wire types and ignored here.

use std::collections::BTreeMap;

use stowage_resources::{Quantity, Resources};

/// Resource name for CPU.
pub const RESOURCE_CPU: &str = "cpu";
/// Resource name for memory.
pub const RESOURCE_MEMORY: &str = "memory";
/// Resource name for NVIDIA GPUs.
pub const RESOURCE_NVIDIA_GPU: &str = "nvidia.com/gpu";
/// Resource name for ephemeral storage; carried on the wire, not packed.
pub const RESOURCE_EPHEMERAL_STORAGE: &str = "ephemeral-storage";

/// Projects a named-quantity map onto the engine vector. Missing names
/// are zero.
pub fn resources_from_quantities(quantities: &BTreeMap<String, Quantity>) -> Resources {
    let get = |name: &str| quantities.get(name).copied().unwrap_or_else(Quantity::zero);
    Resources::new(
        get(RESOURCE_CPU),
        get(RESOURCE_MEMORY),
        get(RESOURCE_NVIDIA_GPU),
    )
}

/// The wire form of an engine vector. CPU and memory are always present
/// (the reservation schema requires them); GPU only when non-zero.
pub fn quantities_from_resources(resources: &Resources) -> BTreeMap<String, Quantity> {
    let mut quantities = BTreeMap::new();
    quantities.insert(RESOURCE_CPU.to_string(), resources.cpu);
    quantities.insert(RESOURCE_MEMORY.to_string(), resources.memory);
    if !resources.gpu.is_zero() {
        quantities.insert(RESOURCE_NVIDIA_GPU.to_string(), resources.gpu);
    }
    quantities
}
