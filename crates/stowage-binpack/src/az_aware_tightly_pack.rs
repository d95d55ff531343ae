//! Prefer a single zone, accept cross-zone.

use tracing::debug;

use crate::binpack::{
    into_result, place_application, validate, PackingRequest, PackingResult,
};
use crate::cancel::CancelToken;
use crate::error::PackingError;
use crate::single_az_tightly_pack::best_single_az_placement;
use crate::tightly_pack::distribute_executors_tightly;

/// Tries [`single_az_tightly_pack`] first; when no single zone can hold the
/// application, falls back to a plain [`tightly_pack`] across all zones.
///
/// [`single_az_tightly_pack`]: crate::single_az_tightly_pack::single_az_tightly_pack
/// [`tightly_pack`]: crate::tightly_pack::tightly_pack
pub fn az_aware_tightly_pack(
    token: &CancelToken,
    request: &PackingRequest<'_>,
) -> Result<PackingResult, PackingError> {
    validate(request)?;

    if let Some(placement) = best_single_az_placement(token, request)? {
        return Ok(into_result(request, placement));
    }

    debug!("no single zone fits the application, packing across zones");
    match place_application(token, request, distribute_executors_tightly)? {
        Some(placement) => Ok(into_result(request, placement)),
        None => Ok(PackingResult::empty()),
    }
}
