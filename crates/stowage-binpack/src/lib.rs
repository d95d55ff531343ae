//! stowage-binpack — bin-packing placement for driver/executor applications.
//!
//! Given one driver, N identical executors, and a group of candidate nodes
//! with caller-supplied preference orders, each strategy decides in a
//! single synchronous call which node hosts the driver and which nodes
//! host the executors, and reports how tightly the result packs the
//! cluster. Pure in-memory code: no I/O, no locks, no retries, no state
//! between calls.
//!
//! # Architecture
//!
//! ```text
//! PackingStrategy::place
//!   ├── driver loop (binpack): first driver candidate whose executors fit
//!   │     ├── distribute_evenly      — round-robin spread
//!   │     ├── tightly_pack           — first-fit, fill node after node
//!   │     ├── single_az_tightly_pack — best zone, never crossing zones
//!   │     ├── az_aware_tightly_pack  — single zone, else cross-zone
//!   │     └── minimal_fragmentation  — fewest newly-opened nodes
//!   ├── capacity   — exact executors-that-fit arithmetic
//!   └── efficiency — per-node and cluster-average utilization
//! ```
//!
//! All strategies are deterministic functions of their inputs; ordering
//! always comes from the priority lists, never from map iteration.

pub mod az_aware_tightly_pack;
pub mod binpack;
pub mod cancel;
pub mod capacity;
pub mod distribute_evenly;
pub mod efficiency;
pub mod error;
pub mod minimal_fragmentation;
pub mod single_az_tightly_pack;
pub mod tightly_pack;

#[cfg(test)]
mod test_util;

pub use az_aware_tightly_pack::az_aware_tightly_pack;
pub use binpack::{PackingRequest, PackingResult, PackingStrategy};
pub use cancel::CancelToken;
pub use capacity::{
    dimension_capacity, node_capacities, node_capacity, with_spare_capacity, NodeCapacity,
    UNBOUNDED,
};
pub use distribute_evenly::distribute_evenly;
pub use efficiency::{
    compute_avg_packing_efficiency, compute_packing_efficiencies, node_packing_efficiency,
    NodePackingEfficiency, PackingEfficiency,
};
pub use error::{PackingError, UnknownStrategy};
pub use minimal_fragmentation::minimal_fragmentation;
pub use single_az_tightly_pack::single_az_tightly_pack;
pub use tightly_pack::tightly_pack;
