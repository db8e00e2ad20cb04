//! Integration tests for incremental cluster assignment.
//!
//! Covers the assignment/maintenance invariants: exact incremental means,
//! inclusive threshold semantics, deterministic replay, and merge
//! weighting.

use voiceprint::math;
use voiceprint::ClusterStore;

const TOLERANCE: f32 = 1e-5;

fn assert_vec_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < TOLERANCE, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_two_speakers_end_to_end() {
    // A and A' are nearly identical voices; B is orthogonal to both
    let a = vec![1.0, 0.0, 0.0];
    let a_prime = vec![0.99, 0.01, 0.0];
    let b = vec![0.0, 1.0, 0.0];

    let mut store = ClusterStore::new();
    let first = store.assign(&a, "user-1", 0.85).unwrap();
    let second = store.assign(&a_prime, "user-1", 0.85).unwrap();
    let third = store.assign(&b, "user-1", 0.85).unwrap();

    assert!(first.is_new);
    assert!(!second.is_new, "A' should join A's cluster");
    assert_eq!(second.cluster_id, first.cluster_id);
    assert!(third.is_new, "B is orthogonal and needs its own cluster");

    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&first.cluster_id).unwrap().member_count, 2);
    assert_eq!(store.get(&third.cluster_id).unwrap().member_count, 1);
}

#[test]
fn test_identity_mean() {
    // Assigning the same vector n times leaves the centroid exactly there
    let v = vec![0.2, 0.4, 0.6];
    let mut store = ClusterStore::new();

    let mut cluster_id = None;
    for _ in 0..50 {
        let assignment = store.assign(&v, "user-1", 0.85).unwrap();
        cluster_id.get_or_insert(assignment.cluster_id);
    }

    let cluster = store.get(cluster_id.as_deref().unwrap()).unwrap();
    assert_eq!(cluster.member_count, 50);
    assert_eq!(cluster.occurrence_count, 50);
    assert_vec_close(&cluster.centroid, &v);
}

#[test]
fn test_threshold_boundary_is_inclusive() {
    let centroid = vec![1.0, 0.0];
    let query = vec![1.0, 1.0];
    let sim = math::cosine_similarity(&query, &centroid).unwrap();

    // Best similarity exactly equal to the threshold joins the cluster
    let mut store = ClusterStore::new();
    store.create_cluster(centroid.clone(), "user-1");
    let joined = store.assign(&query, "user-1", sim).unwrap();
    assert!(!joined.is_new);

    // Strictly below the threshold creates a new cluster
    let mut store = ClusterStore::new();
    store.create_cluster(centroid, "user-1");
    let created = store.assign(&query, "user-1", sim + 1e-4).unwrap();
    assert!(created.is_new);
}

#[test]
fn test_replay_is_deterministic() {
    let sequence: Vec<Vec<f32>> = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.98, 0.02, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.97, 0.03],
        vec![0.0, 0.0, 1.0],
        vec![0.99, 0.0, 0.01],
    ];

    let run = |sequence: &[Vec<f32>]| {
        let mut store = ClusterStore::new();
        let assignments: Vec<String> = sequence
            .iter()
            .map(|e| store.assign(e, "user-1", 0.85).unwrap().cluster_id)
            .collect();
        (assignments, store)
    };

    let (assignments_a, store_a) = run(&sequence);
    let (assignments_b, store_b) = run(&sequence);

    assert_eq!(assignments_a, assignments_b);
    assert_eq!(store_a.len(), store_b.len());
    for (a, b) in store_a.clusters().zip(store_b.clusters()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.member_count, b.member_count);
        assert_eq!(a.occurrence_count, b.occurrence_count);
        assert_eq!(a.centroid, b.centroid);
    }
}

#[test]
fn test_merge_weighting() {
    let mut store = ClusterStore::new();

    // Cluster A: 3 members, centroid [1, 0, 0]
    let a = store.create_cluster(vec![1.0, 0.0, 0.0], "user-1").id.clone();
    store.fold_into(&a, &[1.0, 0.0, 0.0]).unwrap();
    store.fold_into(&a, &[1.0, 0.0, 0.0]).unwrap();

    // Cluster B: 2 members, centroid [0, 1, 0]
    let b = store.create_cluster(vec![0.0, 1.0, 0.0], "user-1").id.clone();
    store.fold_into(&b, &[0.0, 1.0, 0.0]).unwrap();

    let update = store.merge(&b, &a).unwrap();

    assert_eq!(update.member_count, 5);
    assert_vec_close(&update.centroid, &[0.6, 0.4, 0.0]);
    assert!(store.get(&a).is_none(), "absorbed id must no longer resolve");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_dimension_invariant_across_operations() {
    let mut store = ClusterStore::new();
    let embeddings = [
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![0.9, 0.1, 0.0],
    ];
    for e in &embeddings {
        store.assign(e, "user-1", 0.85).unwrap();
    }

    let ids: Vec<String> = store.clusters().map(|c| c.id.clone()).collect();
    if ids.len() >= 2 {
        store.merge(&ids[0], &ids[1]).unwrap();
    }

    for cluster in store.clusters() {
        assert_eq!(cluster.dimension(), 3);
    }
}

#[test]
fn test_mismatched_embedding_is_rejected() {
    let mut store = ClusterStore::new();
    store.create_cluster(vec![1.0, 0.0, 0.0], "user-1");

    // A 2-dimensional query against 3-dimensional centroids must fail
    // loudly, never truncate
    assert!(store.assign(&[1.0, 0.0], "user-1", 0.85).is_err());
    assert_eq!(store.len(), 1);
}
