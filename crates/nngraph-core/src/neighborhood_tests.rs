//! Tests for `neighborhood` module

use std::collections::HashSet;

use super::error::Error;
use super::index::{IndexParams, KnnTable, Neighbor, NeighborIndex};
use super::kernel::SimilarityKernel;
use super::neighborhood::*;
use super::point_set::PointSet;

fn heat() -> NeighborhoodBuilder {
    NeighborhoodBuilder::new(SimilarityKernel::Heat { sigma: 1.0 })
}

/// Points at 0, 1, 3, 10 on a line, k = 1:
/// 0 -> 1, 1 -> 0, 2 -> 1, 3 -> 2
fn chain_table() -> KnnTable {
    KnnTable::from_parts(1, vec![1, 0, 1, 2], vec![1.0, 1.0, 4.0, 49.0]).unwrap()
}

fn pairs(list: &EdgeList) -> HashSet<(usize, usize)> {
    list.unordered_pairs()
}

#[test]
fn test_directed_emits_n_times_k_edges() {
    let table = chain_table();

    let edges = heat().directed(&table).unwrap();

    assert_eq!(edges.len(), 4);
    assert_eq!(edges.edges(), &[(0, 1), (1, 0), (2, 1), (3, 2)]);
    assert_eq!(edges.weights().len(), edges.len());
    assert!((edges.weights()[2] - (-4.0f32).exp()).abs() < 1e-7);
}

#[test]
fn test_mutual_keeps_reciprocal_pairs_once() {
    let table = chain_table();

    let edges = heat().mutual(&table).unwrap();

    assert_eq!(edges.edges(), &[(0, 1)]);
    assert_eq!(edges.weights().len(), 1);
}

#[test]
fn test_symmetric_is_union_without_duplicates() {
    let table = chain_table();

    let edges = heat().symmetric(&table).unwrap();

    assert_eq!(edges.edges(), &[(0, 1), (1, 2), (2, 3)]);
    assert_eq!(edges.weights().len(), 3);
}

#[test]
fn test_symmetric_keeps_weight_of_smaller_endpoint() {
    // Asymmetric distances for the pair {0, 1}: 0 -> 1 at 1.0, 1 -> 0 at 2.0
    let table = KnnTable::from_parts(1, vec![1, 0], vec![1.0, 2.0]).unwrap();

    let edges = heat().symmetric(&table).unwrap();

    assert_eq!(edges.len(), 1);
    assert!((edges.weights()[0] - (-1.0f32).exp()).abs() < 1e-7);
}

#[test]
fn test_symmetric_weight_from_larger_endpoint_when_only_it_lists_pair() {
    // 2 -> 0 only; 0 and 1 list each other
    let table = KnnTable::from_parts(1, vec![1, 0, 0], vec![1.0, 1.0, 3.0]).unwrap();

    let edges = heat().symmetric(&table).unwrap();

    assert_eq!(edges.edges(), &[(0, 1), (0, 2)]);
    assert!((edges.weights()[1] - (-3.0f32).exp()).abs() < 1e-7);
}

#[test]
fn test_mode_inclusions() {
    let rows: Vec<Vec<f32>> = (0..60)
        .map(|i| vec![(i as f32 * 0.9).sin() * 5.0, (i as f32 * 0.4).cos() * 3.0])
        .collect();
    let index =
        NeighborIndex::build(PointSet::from_rows(&rows).unwrap(), IndexParams::default()).unwrap();
    let table = index.query_knn(4).unwrap();
    let builder = heat();

    let directed = pairs(&builder.directed(&table).unwrap());
    let mutual = pairs(&builder.mutual(&table).unwrap());
    let symmetric = pairs(&builder.symmetric(&table).unwrap());

    assert!(mutual.is_subset(&directed));
    assert!(directed.is_subset(&symmetric));
    assert!(mutual.is_subset(&symmetric));
    assert_eq!(builder.directed(&table).unwrap().len(), 60 * 4);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let rows: Vec<Vec<f32>> = (0..80).map(|i| vec![(i * i % 37) as f32, i as f32]).collect();
    let index =
        NeighborIndex::build(PointSet::from_rows(&rows).unwrap(), IndexParams::default()).unwrap();
    let table = index.query_knn(3).unwrap();

    let kernel = SimilarityKernel::LocallyScaled { rank: 3 };
    let parallel = NeighborhoodBuilder::new(kernel).with_parallel(true);
    let sequential = NeighborhoodBuilder::new(kernel).with_parallel(false);

    assert_eq!(
        parallel.symmetric(&table).unwrap(),
        sequential.symmetric(&table).unwrap()
    );
    assert_eq!(
        parallel.directed(&table).unwrap(),
        sequential.directed(&table).unwrap()
    );
}

#[test]
fn test_local_scaling_rank_above_k_fails() {
    let builder = NeighborhoodBuilder::new(SimilarityKernel::LocallyScaled { rank: 2 });

    let result = builder.directed(&chain_table());

    assert!(matches!(result, Err(Error::InsufficientNeighbors { .. })));
}

#[test]
fn test_radius_edges_are_not_deduplicated() {
    let results = vec![
        vec![Neighbor::new(1, 0.5)],
        vec![Neighbor::new(0, 0.5)],
        Vec::new(),
    ];

    let edges = heat().radius(&results).unwrap();

    assert_eq!(edges.edges(), &[(0, 1), (1, 0)]);
    assert!((edges.weights()[0] - (-0.5f32).exp()).abs() < 1e-7);
}

#[test]
fn test_radius_rejects_local_scaling() {
    let builder = NeighborhoodBuilder::new(SimilarityKernel::LocallyScaled { rank: 1 });
    let results = vec![vec![Neighbor::new(1, 0.5)], vec![Neighbor::new(0, 0.5)]];

    assert!(matches!(
        builder.radius(&results),
        Err(Error::InsufficientNeighbors { point: 0, .. })
    ));
    // Isolated points never evaluate the kernel
    assert!(builder.radius(&[Vec::new(), Vec::new()]).unwrap().is_empty());
}

#[test]
fn test_build_dispatch_and_mismatch() {
    let query = NeighborQuery::Knn(chain_table());

    let directed = heat().build(Topology::Directed { k: 1 }, &query).unwrap();
    assert_eq!(directed.len(), 4);

    let mismatch = heat().build(Topology::Radius { radius: 1.0 }, &query);
    assert!(matches!(mismatch, Err(Error::InvalidData(_))));
}

#[test]
fn test_completion_adds_only_new_pairs() {
    let table = chain_table();
    let existing = EdgeList::from_parts(vec![(1, 0)], vec![0.5]).unwrap();

    // 3 -> 2 is new, 0 -> 1 already exists as (1, 0)
    let added = heat().completion(&table, &[3, 0], &existing).unwrap();

    assert_eq!(added.edges(), &[(3, 2)]);
    assert!((added.weights()[0] - (-49.0f32).exp()).abs() < 1e-12);
}

#[test]
fn test_completion_dedups_between_spurious_vertices() {
    // 0 and 1 list each other, both spurious
    let table = KnnTable::from_parts(1, vec![1, 0, 0], vec![1.0, 1.0, 2.0]).unwrap();

    let added = heat().completion(&table, &[1, 0], &EdgeList::new()).unwrap();

    assert_eq!(added.edges(), &[(0, 1)]);
}

#[test]
fn test_completion_rejects_out_of_range_vertex() {
    let result = heat().completion(&chain_table(), &[9], &EdgeList::new());

    assert!(matches!(result, Err(Error::InvalidData(_))));
}

#[test]
fn test_topology_accessors() {
    assert_eq!(Topology::Mutual { k: 5 }.k(), Some(5));
    assert_eq!(Topology::Radius { radius: 0.1 }.k(), None);
    assert!(Topology::Directed { k: 1 }.is_directed());
    assert!(Topology::Radius { radius: 0.1 }.is_directed());
    assert!(!Topology::Symmetric { k: 1 }.is_directed());
    assert_eq!(Topology::Symmetric { k: 2 }.to_string(), "symmetric k-NN (k=2)");
}

#[test]
fn test_edge_list_from_parts_requires_alignment() {
    assert!(EdgeList::from_parts(vec![(0, 1)], vec![]).is_err());
    let list = EdgeList::from_parts(vec![(0, 1), (2, 1)], vec![0.1, 0.2]).unwrap();
    assert_eq!(list.iter().collect::<Vec<_>>(), vec![(0, 1, 0.1), (2, 1, 0.2)]);
}
