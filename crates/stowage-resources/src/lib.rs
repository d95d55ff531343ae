//! stowage-resources — resource quantities and node scheduling metadata.
//!
//! Foundation types for the stowage placement engine:
//!
//! - [`Quantity`] — exact scaled-integer amounts in Kubernetes notation
//!   (`"1500m"`, `"2Gi"`)
//! - [`Resources`] — the (cpu, memory, gpu) vector with the arithmetic
//!   placements are decided with
//! - [`NodeGroupSchedulingMetadata`] / [`NodeGroupResources`] — the node
//!   lookup table and the per-attempt tentative reservation map
//!
//! Everything here is a plain value type: built by the caller before a
//! placement call, discarded after it.

pub mod node;
pub mod quantity;
pub mod resources;

pub use node::{NodeGroupResources, NodeGroupSchedulingMetadata, NodeId, NodeSchedulingMetadata};
pub use quantity::{Format, Quantity, QuantityParseError};
pub use resources::Resources;
