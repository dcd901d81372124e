use mdl_convert::{
    Vertex,
    dedup::{VertexDeduplicator, deduplicate, normalize_uv, resolve_vertex},
    resources::{ABSENT, FaceVertex},
};

use crate::common::test_utils::{attributes, corners};

mod common;

#[test]
fn same_corner_twice_collapses_to_one_vertex() {
    let attrs = attributes(&[[1.0, 2.0, 3.0]], &[[0.0, 1.0, 0.0]], &[[0.25, 0.5]]);
    let input = corners(&[(0, 0, 0), (0, 0, 0)]);

    let (unique, indices) = deduplicate(&attrs, &input);

    assert_eq!(unique.len(), 1);
    assert_eq!(indices, vec![0, 0]);
}

#[test]
fn indices_resolve_back_to_their_corners() {
    let attrs = attributes(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        &[[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]],
        &[[0.0, 0.0], [1.0, 1.0], [2.5, -0.5]],
    );
    let input = corners(&[
        (0, 0, 0),
        (1, 0, 1),
        (2, 1, 2),
        (1, 0, 1),
        (3, ABSENT, ABSENT),
        (2, 1, 2),
        (7, 9, 11),
        (-3, -1, -2),
    ]);

    let (unique, indices) = deduplicate(&attrs, &input);

    assert_eq!(indices.len(), input.len());
    for (corner, &index) in input.iter().zip(&indices) {
        assert_eq!(unique[index as usize], resolve_vertex(&attrs, corner));
    }
    for (i, a) in unique.iter().enumerate() {
        for b in &unique[i + 1..] {
            assert_ne!(a, b, "unique set holds duplicates");
        }
    }
    // (1,0,1) and (2,1,2) repeat, and both fully out-of-range corners resolve
    // to the same default vertex.
    assert_eq!(unique.len(), 5);
}

#[test]
fn first_occurrence_keeps_its_slot() {
    let attrs = attributes(&[[0.0, 0.0, 0.0], [5.0, 5.0, 5.0]], &[], &[]);
    let input = corners(&[(1, ABSENT, ABSENT), (0, ABSENT, ABSENT), (1, ABSENT, ABSENT)]);

    let (unique, indices) = deduplicate(&attrs, &input);

    assert_eq!(indices, vec![0, 1, 0]);
    assert_eq!(unique[0].position, [5.0, 5.0, 5.0]);
}

#[test]
fn negative_zero_is_the_same_vertex() {
    let attrs = attributes(&[[0.0, 0.0, 0.0], [-0.0, 0.0, -0.0]], &[], &[]);
    let input = corners(&[(0, ABSENT, ABSENT), (1, ABSENT, ABSENT)]);

    let (unique, indices) = deduplicate(&attrs, &input);

    assert_eq!(unique.len(), 1);
    assert_eq!(indices, vec![0, 0]);
}

#[test]
fn normalized_uvs_stay_in_unit_range() {
    let raw = [
        [0.0, 0.0],
        [1.0, 1.0],
        [3.75, 12.25],
        [-0.5, -4.0],
        [0.5, 0.25],
        [f32::NAN, 2.0],
        [1e9, -1e9],
    ];
    let attrs = attributes(&[[0.0; 3]], &[], &raw);
    let input: Vec<_> = (0..raw.len() as i64)
        .map(|uv| FaceVertex::new(0, ABSENT, uv))
        .collect();

    let (unique, _) = deduplicate(&attrs, &input);

    for v in &unique {
        for c in v.tex_coords {
            assert!((0.0..=1.0).contains(&c), "uv component {c} out of range");
        }
    }
}

#[test]
fn uv_normalization_wraps_from_above_and_flips_v() {
    assert_eq!(normalize_uv([0.25, 0.25]), [0.25, 0.75]);
    assert_eq!(normalize_uv([1.5, 2.25]), [0.5, 0.75]);
    // Exactly 1 has no fractional part to drop and stays 1.
    assert_eq!(normalize_uv([1.0, 1.0]), [1.0, 0.0]);
    // Negative values clamp instead of wrapping.
    assert_eq!(normalize_uv([-0.75, -0.25]), [0.0, 1.0]);
}

#[test]
fn missing_normal_defaults_to_unit_x() {
    let attrs = attributes(&[[1.0, 1.0, 1.0]], &[[0.0, 1.0, 0.0]], &[]);

    let v = resolve_vertex(&attrs, &FaceVertex::new(0, -1, ABSENT));

    assert_eq!(v.normal, [1.0, 0.0, 0.0]);
    assert_eq!(v.position, [1.0, 1.0, 1.0]);
}

#[test]
fn out_of_range_position_defaults_to_origin() {
    let attrs = attributes(&[[1.0, 2.0, 3.0]], &[[0.0, 1.0, 0.0]], &[[0.5, 0.5]]);

    let v = resolve_vertex(&attrs, &FaceVertex::new(1, 0, 0));

    assert_eq!(v.position, [0.0, 0.0, 0.0]);
    assert_eq!(v.normal, [0.0, 1.0, 0.0]);
    assert_eq!(v.tex_coords, [0.5, 0.5]);
}

#[test]
fn missing_uv_defaults_to_origin_before_flip() {
    let attrs = attributes(&[[0.0; 3]], &[], &[]);

    let v = resolve_vertex(&attrs, &FaceVertex::new(0, 0, 4));

    assert_eq!(v.tex_coords, [0.0, 1.0]);
    assert_eq!(v.color, Vertex::WHITE);
}

#[test]
fn shapes_share_one_growing_unique_set() {
    let attrs = attributes(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        &[],
        &[],
    );
    let first = corners(&[(0, ABSENT, ABSENT), (1, ABSENT, ABSENT), (2, ABSENT, ABSENT)]);
    let second = corners(&[(1, ABSENT, ABSENT), (3, ABSENT, ABSENT), (2, ABSENT, ABSENT)]);

    let mut dedup = VertexDeduplicator::new();
    let a = dedup.dedup_shape(&attrs, &first);
    let b = dedup.dedup_shape(&attrs, &second);

    assert_eq!(a, vec![0, 1, 2]);
    assert_eq!(b, vec![1, 3, 2]);
    assert_eq!(dedup.len(), 4);
}

#[test]
fn empty_input_yields_nothing() {
    let attrs = attributes(&[], &[], &[]);
    let input: Vec<FaceVertex> = Vec::new();

    let (unique, indices) = deduplicate(&attrs, &input);

    assert!(unique.is_empty());
    assert!(indices.is_empty());
}
