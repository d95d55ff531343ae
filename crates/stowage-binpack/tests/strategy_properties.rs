//! Properties every packing strategy must uphold, checked through the
//! public API on a shared set of clusters.

use std::collections::HashMap;

use stowage_binpack::{node_capacity, CancelToken, PackingRequest, PackingResult, PackingStrategy};
use stowage_resources::{
    NodeGroupSchedulingMetadata, NodeId, NodeSchedulingMetadata, Quantity, Resources,
};

fn res(cpu: i64, memory: i64, gpu: i64) -> Resources {
    Resources::new(
        Quantity::from_whole(cpu),
        Quantity::from_whole(memory),
        Quantity::from_whole(gpu),
    )
}

fn metadata(cpu: i64, memory: i64, gpu: i64, zone: &str) -> NodeSchedulingMetadata {
    NodeSchedulingMetadata {
        available: res(cpu, memory, gpu),
        schedulable: res(cpu, memory, gpu),
        zone_label: zone.to_string(),
    }
}

struct Cluster {
    nodes: NodeGroupSchedulingMetadata,
    priority: Vec<NodeId>,
}

/// A mixed cluster: two zones, uneven node sizes, one GPU-less node.
fn mixed_cluster() -> Cluster {
    let entries = [
        ("small-a", metadata(4, 8, 1, "east")),
        ("large-a", metadata(16, 64, 4, "east")),
        ("small-b", metadata(4, 8, 1, "west")),
        ("large-b", metadata(12, 48, 0, "west")),
    ];
    Cluster {
        nodes: entries
            .iter()
            .map(|(node, metadata)| (node.to_string(), metadata.clone()))
            .collect(),
        priority: entries.iter().map(|(node, _)| node.to_string()).collect(),
    }
}

/// One zone, uneven node sizes; the largest node alone can absorb a whole
/// application's executors.
fn uneven_cluster() -> Cluster {
    let entries = [
        ("n1", metadata(10, 25, 6, "z1")),
        ("n2", metadata(5, 25, 6, "z1")),
        ("n3", metadata(20, 25, 6, "z1")),
    ];
    Cluster {
        nodes: entries
            .iter()
            .map(|(node, metadata)| (node.to_string(), metadata.clone()))
            .collect(),
        priority: entries.iter().map(|(node, _)| node.to_string()).collect(),
    }
}

fn place(
    cluster: &Cluster,
    strategy: PackingStrategy,
    driver: &Resources,
    executor: &Resources,
    count: usize,
) -> PackingResult {
    let request = PackingRequest {
        driver_resources: driver,
        executor_resources: executor,
        executor_count: count,
        driver_priority_order: &cluster.priority,
        executor_priority_order: &cluster.priority,
        nodes: &cluster.nodes,
    };
    strategy.place(&CancelToken::new(), &request).unwrap()
}

/// Total demand placed on each node by a successful result.
fn committed_per_node(
    result: &PackingResult,
    driver: &Resources,
    executor: &Resources,
) -> HashMap<NodeId, Resources> {
    let mut committed: HashMap<NodeId, Resources> = HashMap::new();
    committed.insert(result.driver_node.clone(), *driver);
    for node in &result.executor_nodes {
        committed
            .entry(node.clone())
            .or_insert_with(Resources::zero)
            .add(executor);
    }
    committed
}

#[test]
fn results_are_deterministic() {
    let cluster = mixed_cluster();
    for strategy in PackingStrategy::all() {
        let first = place(&cluster, strategy, &res(1, 2, 0), &res(2, 4, 0), 6);
        let second = place(&cluster, strategy, &res(1, 2, 0), &res(2, 4, 0), 6);
        assert_eq!(first, second, "{strategy} was not deterministic");
    }
}

#[test]
fn placements_respect_node_budgets() {
    let cluster = mixed_cluster();
    let driver = res(1, 2, 0);
    let executor = res(2, 4, 1);
    for strategy in PackingStrategy::all() {
        let result = place(&cluster, strategy, &driver, &executor, 4);
        if !result.has_capacity {
            continue;
        }
        for (node, committed) in committed_per_node(&result, &driver, &executor) {
            let available = &cluster.nodes.get(&node).expect("placed on unknown node").available;
            assert!(
                !committed.greater_than(available),
                "{strategy} over-committed {node}: {committed} > {available}"
            );
        }
    }
}

#[test]
fn executor_count_is_preserved() {
    let cluster = mixed_cluster();
    for strategy in PackingStrategy::all() {
        for count in [0, 1, 5] {
            let result = place(&cluster, strategy, &res(1, 2, 0), &res(1, 2, 0), count);
            assert!(result.has_capacity, "{strategy} with {count} executors");
            assert_eq!(result.executor_nodes.len(), count, "{strategy}");
            assert!(!result.driver_node.is_empty(), "{strategy}");
        }
    }
}

#[test]
fn every_assigned_node_is_a_group_member() {
    let cluster = mixed_cluster();
    for strategy in PackingStrategy::all() {
        let result = place(&cluster, strategy, &res(1, 2, 0), &res(2, 4, 0), 6);
        if !result.has_capacity {
            continue;
        }
        assert!(cluster.nodes.contains(&result.driver_node));
        for node in &result.executor_nodes {
            assert!(cluster.nodes.contains(node), "{strategy} used {node}");
        }
    }
}

#[test]
fn driver_lands_on_the_first_workable_candidate() {
    let cluster = mixed_cluster();
    // The driver alone fits everywhere; every strategy must pick the
    // head of the priority order (single-AZ ranks zones, so skip it).
    for strategy in [
        PackingStrategy::DistributeEvenly,
        PackingStrategy::TightlyPack,
        PackingStrategy::MinimalFragmentation,
    ] {
        let result = place(&cluster, strategy, &res(1, 1, 0), &res(1, 1, 0), 1);
        assert!(result.has_capacity);
        assert_eq!(result.driver_node, "small-a", "{strategy}");
    }
}

#[test]
fn efficiencies_are_bounded_and_cover_the_group() {
    let cluster = mixed_cluster();
    for strategy in PackingStrategy::all() {
        let result = place(&cluster, strategy, &res(1, 2, 0), &res(2, 4, 0), 6);
        if !result.has_capacity {
            continue;
        }
        assert_eq!(
            result.node_packing_efficiencies.len(),
            cluster.nodes.len(),
            "{strategy}"
        );
        for entry in &result.node_packing_efficiencies {
            let e = &entry.efficiency;
            for value in [e.cpu, e.memory, e.gpu] {
                assert!((0.0..=1.0).contains(&value), "{strategy} {}: {value}", entry.node);
                assert!(e.max >= value);
            }
        }
        let avg = &result.avg_packing_efficiency;
        for value in [avg.cpu, avg.memory, avg.gpu, avg.max] {
            assert!((0.0..=1.0).contains(&value), "{strategy} avg: {value}");
        }
    }
}

#[test]
fn minimal_fragmentation_opens_no_node_while_an_occupied_one_has_room() {
    // Replays each placement in order: whenever an executor lands on a
    // node with no prior reservation, every node reserved so far must be
    // unable to take one more executor.
    let driver = res(1, 3, 0);
    let executor = res(2, 5, 0);
    for cluster in [mixed_cluster(), uneven_cluster()] {
        let result = place(
            &cluster,
            PackingStrategy::MinimalFragmentation,
            &driver,
            &executor,
            5,
        );
        assert!(result.has_capacity);

        let mut reservations: HashMap<NodeId, Resources> = HashMap::new();
        reservations.insert(result.driver_node.clone(), driver);
        for node in &result.executor_nodes {
            if !reservations.contains_key(node) {
                for (occupied, reserved) in &reservations {
                    let available = &cluster.nodes.get(occupied).unwrap().available;
                    assert_eq!(
                        node_capacity(available, reserved, &executor),
                        0,
                        "opened {node} while {occupied} still had room"
                    );
                }
            }
            reservations
                .entry(node.clone())
                .or_insert_with(Resources::zero)
                .add(&executor);
        }
    }
}

#[test]
fn minimal_fragmentation_fills_occupied_nodes_over_a_single_empty_node() {
    // n3 alone has room for all five executors; the strategy still fills
    // the driver node and the next smaller node rather than opening the
    // large empty one, trading a lower distinct-node count for keeping
    // empty nodes empty.
    let cluster = uneven_cluster();
    let driver = res(1, 3, 0);
    let executor = res(2, 5, 0);

    let single_node_alternative = node_capacity(
        &cluster.nodes.get("n3").unwrap().available,
        &Resources::zero(),
        &executor,
    );
    assert!(single_node_alternative >= 5);

    let result = place(
        &cluster,
        PackingStrategy::MinimalFragmentation,
        &driver,
        &executor,
        5,
    );
    assert!(result.has_capacity);
    assert_eq!(result.driver_node, "n1");

    let mut used: Vec<&str> = result.executor_nodes.iter().map(|node| node.as_str()).collect();
    used.dedup();
    assert_eq!(used, vec!["n1", "n2"]);
}

#[test]
fn single_az_placements_stay_within_one_zone() {
    let cluster = mixed_cluster();
    let result = place(
        &cluster,
        PackingStrategy::SingleAzTightlyPack,
        &res(1, 2, 0),
        &res(2, 4, 0),
        6,
    );
    assert!(result.has_capacity);
    let driver_zone = &cluster
        .nodes
        .get(&result.driver_node)
        .expect("driver node is in the group")
        .zone_label;
    for node in &result.executor_nodes {
        assert_eq!(
            &cluster.nodes.get(node).unwrap().zone_label,
            driver_zone,
            "executor on {node} left zone {driver_zone}"
        );
    }
}

#[test]
fn no_capacity_results_carry_zero_values() {
    let cluster = mixed_cluster();
    for strategy in PackingStrategy::all() {
        let result = place(&cluster, strategy, &res(100, 100, 100), &res(1, 1, 1), 1);
        assert_eq!(result, PackingResult::empty(), "{strategy}");
    }
}

#[test]
fn empty_node_group_reports_no_capacity() {
    let cluster = Cluster {
        nodes: NodeGroupSchedulingMetadata::new(),
        priority: Vec::new(),
    };
    for strategy in PackingStrategy::all() {
        let result = place(&cluster, strategy, &res(1, 1, 0), &res(1, 1, 0), 1);
        assert!(!result.has_capacity, "{strategy}");
    }
}

#[test]
fn inputs_are_not_mutated_by_a_placement() {
    let cluster = mixed_cluster();
    let before = cluster.nodes.clone();
    for strategy in PackingStrategy::all() {
        let _ = place(&cluster, strategy, &res(1, 2, 0), &res(2, 4, 0), 6);
    }
    assert_eq!(cluster.nodes, before);
}
