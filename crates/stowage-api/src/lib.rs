//! stowage-api — control-plane records the placement engine exchanges
//! with its host.
//!
//! Two record kinds, both received already parsed and version-unified
//! (conversion webhooks live in the control plane, not here):
//!
//! - [`Demand`] — a request for cluster capacity on behalf of an instance
//!   group, with its fulfillment phase
//! - [`ResourceReservation`] — a successful placement made durable: driver
//!   and executor slots bound to nodes, later to pods
//!
//! `convert` bridges the wire's named-quantity maps and the engine's
//! fixed `Resources` vector.

pub mod convert;
pub mod demand;
pub mod reservation;

pub use convert::{
    quantities_from_resources, resources_from_quantities, RESOURCE_CPU,
    RESOURCE_EPHEMERAL_STORAGE, RESOURCE_MEMORY, RESOURCE_NVIDIA_GPU,
};
pub use demand::{Demand, DemandPhase, DemandStatus, DemandUnit, UnknownPhase};
pub use reservation::{
    executor_reservation_name, Reservation, ResourceReservation, ResourceReservationSpec,
    ResourceReservationStatus, DRIVER_RESERVATION_NAME,
};
