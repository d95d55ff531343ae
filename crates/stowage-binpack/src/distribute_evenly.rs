//! Round-robin executor distribution.

use tracing::trace;

use stowage_resources::{NodeGroupResources, NodeId};

use crate::binpack::{run, PackingRequest, PackingResult};
use crate::cancel::CancelToken;
use crate::error::PackingError;

/// Places the driver on the first feasible node, then spreads executors
/// across nodes: repeated passes over the executor priority order, at most
/// one executor per node per pass, so counts stay near-equal across the
/// nodes that have room.
pub fn distribute_evenly(
    token: &CancelToken,
    request: &PackingRequest<'_>,
) -> Result<PackingResult, PackingError> {
    run(token, request, distribute_executors_evenly)
}

fn distribute_executors_evenly(
    token: &CancelToken,
    request: &PackingRequest<'_>,
    reservations: &mut NodeGroupResources,
) -> Result<Option<Vec<NodeId>>, PackingError> {
    let mut placed = Vec::with_capacity(request.executor_count);

    while placed.len() < request.executor_count {
        let before = placed.len();
        for node in request.executor_priority_order {
            if placed.len() == request.executor_count {
                break;
            }
            token.bail_if_cancelled()?;
            let Some(metadata) = request.nodes.get(node) else {
                continue;
            };
            let mut needed = *request.executor_resources;
            needed.add(&reservations.get_or_zero(node));
            if needed.greater_than(&metadata.available) {
                continue;
            }
            reservations.add_to(node, request.executor_resources);
            placed.push(node.clone());
        }
        if placed.len() == before {
            // A full pass placed nothing; the rest will never fit.
            trace!(placed = placed.len(), wanted = request.executor_count, "spread stalled");
            return Ok(None);
        }
    }

    Ok(Some(placed))
}

#[cfg(test)]
mod tests {
    use crate::binpack::PackingStrategy;
    use crate::test_util::{counts, executor_counts, metadata, node_group, order, res, Scenario};

    const STRATEGY: PackingStrategy = PackingStrategy::DistributeEvenly;

    #[test]
    fn application_fits() {
        let scenario = Scenario {
            driver: res(1, 3, 1),
            executor: res(2, 5, 1),
            count: 2,
            nodes: node_group(&[
                ("n1", metadata(5, 10, 3, "zone1")),
                ("n2", metadata(4, 5, 3, "zone1")),
            ]),
            priority: order(&["n1", "n2"]),
        };
        let result = scenario.place_ok(STRATEGY);
        assert!(result.has_capacity);
        assert_eq!(result.driver_node, "n1");
        assert_eq!(result.executor_nodes, order(&["n1", "n2"]));
    }

    #[test]
    fn driver_memory_does_not_fit() {
        let scenario = Scenario {
            driver: res(2, 4, 1),
            executor: res(1, 1, 1),
            count: 1,
            nodes: node_group(&[("n1", metadata(2, 3, 2, "zone1"))]),
            priority: order(&["n1"]),
        };
        let result = scenario.place_ok(STRATEGY);
        assert!(!result.has_capacity);
    }

    #[test]
    fn application_perfectly_fits() {
        let scenario = Scenario {
            driver: res(1, 2, 1),
            executor: res(1, 1, 1),
            count: 40,
            nodes: node_group(&[
                ("n1", metadata(13, 14, 13, "zone1")),
                ("n2", metadata(12, 12, 12, "zone1")),
                ("n3", metadata(16, 16, 16, "zone1")),
            ]),
            priority: order(&["n1", "n2", "n3"]),
        };
        let result = scenario.place_ok(STRATEGY);
        assert!(result.has_capacity);
        assert_eq!(result.driver_node, "n1");
        assert_eq!(
            executor_counts(&result),
            counts(&[("n1", 12), ("n2", 12), ("n3", 16)])
        );
        // Round-robin: the first pass touches each node once.
        assert_eq!(result.executor_nodes[..3], order(&["n1", "n2", "n3"])[..]);
    }

    #[test]
    fn executor_cpu_does_not_fit() {
        let scenario = Scenario {
            driver: res(1, 1, 0),
            executor: res(1, 2, 1),
            count: 8,
            nodes: node_group(&[("n1", metadata(8, 20, 8, "zone1"))]),
            priority: order(&["n1"]),
        };
        assert!(!scenario.place_ok(STRATEGY).has_capacity);
    }

    #[test]
    fn fits_when_cluster_has_more_nodes_than_executors() {
        let scenario = Scenario {
            driver: res(1, 2, 1),
            executor: res(2, 3, 1),
            count: 2,
            nodes: node_group(&[
                ("n1", metadata(8, 20, 8, "zone1")),
                ("n2", metadata(8, 20, 8, "zone1")),
                ("n3", metadata(8, 20, 8, "zone1")),
            ]),
            priority: order(&["n1", "n2", "n3"]),
        };
        let result = scenario.place_ok(STRATEGY);
        assert!(result.has_capacity);
        assert_eq!(result.driver_node, "n1");
        assert_eq!(result.executor_nodes.len(), 2);
    }

    #[test]
    fn executor_gpu_does_not_fit() {
        let scenario = Scenario {
            driver: res(1, 1, 1),
            executor: res(1, 1, 1),
            count: 4,
            nodes: node_group(&[
                ("n1_z1", metadata(4, 4, 4, "z1")),
                ("n1_z2", metadata(128, 128, 0, "z2")),
            ]),
            priority: order(&["n1_z1", "n1_z2"]),
        };
        assert!(!scenario.place_ok(STRATEGY).has_capacity);
    }

    #[test]
    fn zero_executors_only_needs_a_driver_slot() {
        let scenario = Scenario {
            driver: res(1, 1, 0),
            executor: res(100, 100, 100),
            count: 0,
            nodes: node_group(&[("n1", metadata(1, 1, 0, "zone1"))]),
            priority: order(&["n1"]),
        };
        let result = scenario.place_ok(STRATEGY);
        assert!(result.has_capacity);
        assert_eq!(result.driver_node, "n1");
        assert!(result.executor_nodes.is_empty());
    }

    #[test]
    fn driver_retries_later_nodes_when_executors_do_not_fit() {
        // n1 takes the driver but then starves the executors; the driver
        // loop must move on and succeed with n2.
        let scenario = Scenario {
            driver: res(1, 1, 0),
            executor: res(4, 4, 0),
            count: 1,
            nodes: node_group(&[
                ("n1", metadata(4, 4, 0, "zone1")),
                ("n2", metadata(3, 3, 0, "zone1")),
            ]),
            priority: order(&["n1", "n2"]),
        };
        let result = scenario.place_ok(STRATEGY);
        assert!(result.has_capacity);
        assert_eq!(result.driver_node, "n2");
        assert_eq!(result.executor_nodes, order(&["n1"]));
    }
}
