//! Tests for `kernel` module

use super::error::Error;
use super::index::KnnTable;
use super::kernel::*;

/// Three points on a line at 0, 1, 3 with k = 2 (distances unsquared).
fn line_table() -> KnnTable {
    KnnTable::from_parts(
        2,
        vec![1, 2, 0, 2, 1, 0],
        vec![1.0, 3.0, 1.0, 2.0, 2.0, 3.0],
    )
    .unwrap()
}

#[test]
fn test_default_is_heat_half() {
    assert_eq!(
        SimilarityKernel::default(),
        SimilarityKernel::Heat { sigma: 0.5 }
    );
    assert!((DEFAULT_SIGMA - 0.5).abs() < f32::EPSILON);
}

#[test]
fn test_heat_weight_decays_with_distance() {
    let near = SimilarityKernel::heat_weight(0.1, 1.0);
    let far = SimilarityKernel::heat_weight(2.0, 1.0);

    assert!(near > far);
    assert!((SimilarityKernel::heat_weight(0.0, 0.5) - 1.0).abs() < f32::EPSILON);
    assert!((SimilarityKernel::heat_weight(1.0, 1.0) - (-1.0f32).exp()).abs() < 1e-7);
}

#[test]
fn test_heat_knn_weight_reads_table_distance() {
    let kernel = SimilarityKernel::Heat { sigma: 2.0 };
    let table = line_table();

    let w = kernel.knn_weight(&table, 0, 1).unwrap();

    assert!((w - (-1.5f32).exp()).abs() < 1e-7);
}

#[test]
fn test_heat_weight_symmetric_for_shared_distance() {
    let kernel = SimilarityKernel::Heat { sigma: 0.5 };
    let table = line_table();

    // 0 -> 1 (slot 0 of row 0) and 1 -> 0 (slot 0 of row 1) share distance 1
    let forward = kernel.knn_weight(&table, 0, 0).unwrap();
    let backward = kernel.knn_weight(&table, 1, 0).unwrap();

    assert_eq!(forward, backward);
}

#[test]
fn test_locally_scaled_weight() {
    let kernel = SimilarityKernel::LocallyScaled { rank: 1 };
    let table = line_table();

    // Edge 0 -> 2: d = 3, scale_0 = 1, scale_2 = 2
    let w = kernel.knn_weight(&table, 0, 1).unwrap();

    let expected = (-3.0f32 / (1.0f32.sqrt() * 2.0f32.sqrt())).exp();
    assert!((w - expected).abs() < 1e-6);
}

#[test]
fn test_locally_scaled_is_symmetric() {
    let kernel = SimilarityKernel::LocallyScaled { rank: 2 };
    let table = line_table();

    // 1 -> 2 is slot 1 of row 1, 2 -> 1 is slot 0 of row 2, both at distance 2
    let forward = kernel.knn_weight(&table, 1, 1).unwrap();
    let backward = kernel.knn_weight(&table, 2, 0).unwrap();

    assert!((forward - backward).abs() < 1e-7);
}

#[test]
fn test_locally_scaled_rank_beyond_k_fails() {
    let kernel = SimilarityKernel::LocallyScaled { rank: 3 };
    let table = line_table();

    let result = kernel.knn_weight(&table, 0, 0);

    assert!(matches!(
        result,
        Err(Error::InsufficientNeighbors {
            rank: 3,
            available: 2,
            ..
        })
    ));
    assert!(kernel.check_table(&table).is_err());
    assert!(SimilarityKernel::LocallyScaled { rank: 2 }
        .check_table(&table)
        .is_ok());
}

#[test]
fn test_locally_scaled_zero_scale_is_finite() {
    // Two duplicates and a third point: zero local scale for rows 0 and 1
    let table =
        KnnTable::from_parts(1, vec![1, 0, 1], vec![0.0, 0.0, 4.0]).unwrap();
    let kernel = SimilarityKernel::LocallyScaled { rank: 1 };

    let duplicate = kernel.knn_weight(&table, 0, 0).unwrap();
    let separated = kernel.knn_weight(&table, 2, 0).unwrap();

    assert!((duplicate - 1.0).abs() < f32::EPSILON);
    assert!(separated.abs() < f32::EPSILON);
}

#[test]
fn test_radius_weight() {
    let heat = SimilarityKernel::Heat { sigma: 1.0 };
    assert!((heat.radius_weight(0, 1.0).unwrap() - (-1.0f32).exp()).abs() < 1e-7);

    let scaled = SimilarityKernel::LocallyScaled { rank: 1 };
    assert!(matches!(
        scaled.radius_weight(4, 1.0),
        Err(Error::InsufficientNeighbors {
            point: 4,
            available: 0,
            ..
        })
    ));
}

#[test]
fn test_kernel_serialization() {
    let kernel = SimilarityKernel::LocallyScaled { rank: 7 };

    let json = serde_json::to_string(&kernel).unwrap();
    let back: SimilarityKernel = serde_json::from_str(&json).unwrap();

    assert_eq!(json, r#"{"locally_scaled":{"rank":7}}"#);
    assert_eq!(back, kernel);
}
