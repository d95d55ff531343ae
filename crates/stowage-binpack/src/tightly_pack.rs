//! First-fit executor distribution, filling node after node.

use stowage_resources::{NodeGroupResources, NodeId};

use crate::binpack::{run, PackingRequest, PackingResult};
use crate::cancel::CancelToken;
use crate::error::PackingError;

/// Places the driver on the first feasible node, then packs executors into
/// the executor priority order node by node: each node is filled to
/// exhaustion before the next one is touched.
pub fn tightly_pack(
    token: &CancelToken,
    request: &PackingRequest<'_>,
) -> Result<PackingResult, PackingError> {
    run(token, request, distribute_executors_tightly)
}

pub(crate) fn distribute_executors_tightly(
    token: &CancelToken,
    request: &PackingRequest<'_>,
    reservations: &mut NodeGroupResources,
) -> Result<Option<Vec<NodeId>>, PackingError> {
    let mut placed = Vec::with_capacity(request.executor_count);

    for node in request.executor_priority_order {
        if placed.len() == request.executor_count {
            break;
        }
        let Some(metadata) = request.nodes.get(node) else {
            continue;
        };
        while placed.len() < request.executor_count {
            token.bail_if_cancelled()?;
            let mut needed = *request.executor_resources;
            needed.add(&reservations.get_or_zero(node));
            if needed.greater_than(&metadata.available) {
                break;
            }
            reservations.add_to(node, request.executor_resources);
            placed.push(node.clone());
        }
    }

    if placed.len() == request.executor_count {
        Ok(Some(placed))
    } else {
        Ok(None)
    }
}
