//! Property tests for graph construction and connectivity repair.

#![allow(clippy::cast_precision_loss)]

use std::collections::HashSet;

use nngraph_core::{
    ConnectivityPolicy, EdgeList, GraphConfig, IndexParams, NeighborIndex, NeighborQuery,
    NeighborhoodBuilder, NoopObserver, Pipeline, PointSet, SimilarityKernel, Topology,
};
use proptest::prelude::*;

/// Random point clouds with a valid k.
fn cloud() -> impl Strategy<Value = (Vec<Vec<f32>>, usize)> {
    (1usize..4, 3usize..40).prop_flat_map(|(dim, n)| {
        (
            prop::collection::vec(prop::collection::vec(-50.0f32..50.0, dim), n),
            1..n,
        )
    })
}

fn edges_for(rows: &[Vec<f32>], topology: Topology) -> EdgeList {
    let index = NeighborIndex::from_rows(rows, IndexParams::default()).unwrap();
    let query = NeighborQuery::run(&index, topology).unwrap();
    NeighborhoodBuilder::new(SimilarityKernel::default())
        .build(topology, &query)
        .unwrap()
}

fn run(rows: &[Vec<f32>], config: GraphConfig) -> nngraph_core::PipelineOutput {
    Pipeline::new(config)
        .unwrap()
        .with_observer(NoopObserver)
        .run(PointSet::from_rows(rows).unwrap())
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn directed_graph_has_n_times_k_edges((rows, k) in cloud()) {
        let edges = edges_for(&rows, Topology::Directed { k });

        prop_assert_eq!(edges.len(), rows.len() * k);
        prop_assert!(edges.edges().iter().all(|&(s, t)| s != t));
    }

    #[test]
    fn mutual_within_directed_within_symmetric((rows, k) in cloud()) {
        let directed = edges_for(&rows, Topology::Directed { k }).unordered_pairs();
        let mutual = edges_for(&rows, Topology::Mutual { k }).unordered_pairs();
        let symmetric = edges_for(&rows, Topology::Symmetric { k }).unordered_pairs();

        prop_assert!(mutual.is_subset(&directed));
        prop_assert!(directed.is_subset(&symmetric));
        prop_assert!(mutual.is_subset(&symmetric));
        prop_assert_eq!(directed, symmetric);
    }

    #[test]
    fn undirected_modes_have_no_duplicate_pairs((rows, k) in cloud()) {
        for topology in [Topology::Mutual { k }, Topology::Symmetric { k }] {
            let edges = edges_for(&rows, topology);
            prop_assert_eq!(edges.unordered_pairs().len(), edges.len());
        }
    }

    #[test]
    fn heat_weights_lie_in_unit_interval((rows, k) in cloud()) {
        let edges = edges_for(&rows, Topology::Symmetric { k });

        prop_assert!(edges.weights().iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn prune_leaves_one_component_of_largest_size((rows, k) in cloud()) {
        let topology = Topology::Directed { k };
        let before = run(&rows, GraphConfig::new(topology));
        let largest = before.connectivity.largest_size;

        let after = run(&rows, GraphConfig::new(topology).with_policy(ConnectivityPolicy::Prune));

        prop_assert_eq!(after.graph.vertex_count(), largest);
        prop_assert_eq!(after.connectivity.component_count, 1);
        prop_assert_eq!(after.pruned, before.connectivity.component_count > 1);
        prop_assert_eq!(after.retained_rows.len(), largest);
    }

    #[test]
    fn completion_only_adds_edges_at_spurious_vertices((rows, k) in cloud()) {
        let topology = Topology::Mutual { k };
        let before = run(&rows, GraphConfig::new(topology));
        let spurious: HashSet<usize> = before.connectivity.spurious.iter().copied().collect();

        let after = run(&rows, GraphConfig::new(topology).with_policy(ConnectivityPolicy::Complete));

        let old: Vec<_> = before.graph.edges().collect();
        let new: Vec<_> = after.graph.edges().collect();
        prop_assert_eq!(after.graph.vertex_count(), before.graph.vertex_count());
        prop_assert_eq!(&new[..old.len()], &old[..]);
        prop_assert!(new[old.len()..].iter().all(|e| spurious.contains(&e.0)));
        prop_assert!(after.connectivity.component_count <= before.connectivity.component_count);
    }

    #[test]
    fn radius_graph_links_exactly_close_pairs(
        rows in prop::collection::vec(prop::collection::vec(-5.0f32..5.0, 2), 2..30),
        radius in 0.5f32..20.0,
    ) {
        let edges = edges_for(&rows, Topology::Radius { radius });
        let points = PointSet::from_rows(&rows).unwrap();
        let metric = IndexParams::default().metric;

        let mut expected = 0;
        for i in 0..rows.len() {
            for j in 0..rows.len() {
                if i != j && metric.calculate(points.point(i), points.point(j)) <= radius {
                    expected += 1;
                }
            }
        }
        prop_assert_eq!(edges.len(), expected);
    }
}
