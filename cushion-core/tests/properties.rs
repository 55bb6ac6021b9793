//! Property-based tests for alignment transforms.
//!
//! Run with: cargo test -p cushion-core --test properties

use cushion_core::{first_non_match, AlignError, Transform};
use nalgebra::{Matrix3, Point3, Vector3};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-6;

fn arb_direction() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-1.0..1.0f64)
        .prop_map(|[x, y, z]| Vector3::new(x, y, z))
        .prop_filter("direction must not be tiny", |v| v.norm() > 0.1)
}

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn rotation_block(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Matrix3<f64> {
    let t = Transform::rotation_between(v1, &Point3::origin(), v2, &Point3::origin()).unwrap();
    t.fixed_view::<3, 3>(0, 0).into_owned()
}

fn close(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    (a - b).norm() < TOLERANCE
}

proptest! {
    #[test]
    fn rotation_maps_source_onto_destination(a in arb_direction(), b in arb_direction()) {
        let (a, b) = (a.normalize(), b.normalize());
        prop_assume!(a.dot(&b) > -1.0 + 1e-6);

        let t = Transform::rotation_between(&a, &Point3::origin(), &b, &Point3::origin()).unwrap();
        let mapped = t.transform_vector(&a);
        prop_assert!(close(&mapped, &b), "{} mapped to {}, expected {}", a, mapped, b);
    }

    #[test]
    fn rotation_block_is_orthonormal(a in arb_direction(), b in arb_direction()) {
        let r = rotation_block(&a, &b);
        prop_assert!(Transform::is_rigid_rotation(&r, TOLERANCE));
    }

    #[test]
    fn same_direction_is_pure_translation(
        a in arb_direction(),
        scale in 0.5..20.0f64,
        p1 in arb_point(),
        p2 in arb_point(),
    ) {
        let t = Transform::rotation_between(&a, &p1, &(a * scale), &p2).unwrap();
        prop_assert_eq!(t.fixed_view::<3, 3>(0, 0).into_owned(), Matrix3::identity());

        let p = Point3::new(1.0, -2.0, 3.0);
        let moved = t.transform_point(&p);
        prop_assert!(close(&(moved - p), &(p2 - p1)));
    }

    #[test]
    fn antiparallel_maps_onto_negation(a in arb_direction()) {
        let a = a.normalize();
        let r = rotation_block(&a, &-a);
        prop_assert!(Transform::is_rigid_rotation(&r, 1e-12));
        prop_assert!((r * a + a).norm() < 1e-12);
    }

    #[test]
    fn reverse_transform_undoes_forward_about_shared_pivot(
        a in arb_direction(),
        b in arb_direction(),
        pivot in arb_point(),
        p in arb_point(),
    ) {
        let forward = Transform::rotation_between(&a, &pivot, &b, &pivot).unwrap();
        let backward = Transform::rotation_between(&b, &pivot, &a, &pivot).unwrap();
        let round_trip = backward.transform_point(&forward.transform_point(&p));
        prop_assert!((round_trip - p).norm() < 1e-6 * (1.0 + p.coords.norm()));
    }

    #[test]
    fn reverse_transform_with_distinct_pivots_leaves_offset_residual(
        a in arb_direction(),
        b in arb_direction(),
        c1 in arb_point(),
        c2 in arb_point(),
        p in arb_point(),
    ) {
        // Translation comes before the rotation, so the reverse transform
        // leaves `t - Rᵀt` behind whenever the pivots differ
        let (na, nb) = (a.normalize(), b.normalize());
        prop_assume!(na.dot(&nb) > -1.0 + 1e-6);

        let forward = Transform::rotation_between(&a, &c1, &b, &c2).unwrap();
        let backward = Transform::rotation_between(&b, &c2, &a, &c1).unwrap();
        let r = forward.fixed_view::<3, 3>(0, 0).into_owned();
        let offset = c2 - c1;

        let round_trip = backward.transform_point(&forward.transform_point(&p));
        let expected = p + offset - r.transpose() * offset;
        prop_assert!((round_trip - expected).norm() < 1e-6 * (1.0 + p.coords.norm() + offset.norm()));
    }

    #[test]
    fn first_non_match_finds_first_differing_entry(
        values in prop::collection::vec(prop_oneof![Just(-1.0f64), -0.9..0.9f64], 0..8),
    ) {
        let expected = values.iter().position(|v| *v != -1.0);
        let found = first_non_match(&values, -1.0);
        prop_assert_eq!(found.map(|(index, _)| index), expected);
        if let Some((index, value)) = found {
            prop_assert_eq!(value, values[index]);
        }
    }
}

#[test]
fn flip_maps_z_to_minus_z_exactly() {
    let r = rotation_block(&Vector3::z(), &-Vector3::z());
    assert_eq!(r * Vector3::z(), -Vector3::z());
}

#[test]
fn zero_direction_is_degenerate_not_nan() {
    let result = Transform::rotation_between(
        &Vector3::zeros(),
        &Point3::origin(),
        &Vector3::z(),
        &Point3::origin(),
    );
    assert!(matches!(result, Err(AlignError::DegenerateInput { .. })));
}
