#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use feastruct::component::{SymmetryPlane, WingLayout};
use feastruct::geometry::{FeaSurface, GridSurface, SurfaceShape};
use feastruct::math::Point3;
use feastruct::part::{ArraySpacing, LocationMode, PartKind, PartType, PatchContact, MAX_ARRAY_MEMBERS};
use feastruct::property::PropertyLibrary;
use feastruct::structure::SubSurfaceType;
use feastruct::{ComponentId, ComponentRegistry, FeaContext, ParentComponent, Structure};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two-section straight wing: span 4 along `y`, chord 2 along `x`, leading
/// edge at `x = 0`, split once in each parametric direction.
fn wing(planes: &[SymmetryPlane]) -> ParentComponent {
    let us = vec![0.0, 1.0, 2.0];
    let ws = vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
    let grid = GridSurface::from_fn(us, ws, |u, w| {
        let (x, z) = if w <= 2.0 {
            (2.0 - w, 0.1 * (1.0 - (w - 1.0).abs()))
        } else {
            (w - 2.0, -0.1 * (1.0 - (w - 3.0).abs()))
        };
        Point3::new(x, 2.0 * u, z)
    })
    .unwrap();
    let surface = FeaSurface::new(SurfaceShape::Grid(grid)).with_features(vec![1.0], vec![2.0]);
    ParentComponent::new("Wing", vec![surface])
        .with_symmetry(planes)
        .with_wing_layout(WingLayout::new(vec![2.0, 2.0]))
}

fn setup(planes: &[SymmetryPlane]) -> (ComponentRegistry, ComponentId, PropertyLibrary) {
    init_tracing();
    let mut registry = ComponentRegistry::new();
    let id = registry.insert(wing(planes));
    (registry, id, PropertyLibrary::new())
}

const SINGLE_PART_TYPES: [PartType; 4] = [PartType::Slice, PartType::Rib, PartType::Spar, PartType::Bulkhead];

#[test]
fn every_part_has_one_surface_per_copy() {
    let configs: [&[SymmetryPlane]; 4] = [
        &[],
        &[SymmetryPlane::XZ],
        &[SymmetryPlane::XZ, SymmetryPlane::XY],
        &[SymmetryPlane::XZ, SymmetryPlane::XY, SymmetryPlane::YZ],
    ];
    for (planes, copies) in configs.into_iter().zip([1, 2, 4, 8]) {
        let (registry, id, library) = setup(planes);
        let mut structure = Structure::new("Struct", id, 0);
        for part_type in SINGLE_PART_TYPES {
            structure.add_part(part_type);
        }
        structure.add_part(PartType::RibArray);
        structure.update(&FeaContext::new(&registry, &library));

        for (_, part) in structure.parts() {
            let expected = match &part.kind {
                PartKind::RibArray(array) => array.num_members() * copies,
                _ => copies,
            };
            assert_eq!(part.surfaces().len(), expected, "{} with {copies} copies", part.name());
            assert_eq!(part.symmetry_indices().len(), copies);
        }
    }
}

#[test]
fn copies_match_parent_handedness() {
    let planes = [SymmetryPlane::XZ, SymmetryPlane::XY];
    let (registry, id, library) = setup(&planes);
    let mut structure = Structure::new("Struct", id, 0);
    for part_type in SINGLE_PART_TYPES {
        structure.add_part(part_type);
    }
    structure.update(&FeaContext::new(&registry, &library));

    let parent = registry.get(id).unwrap();
    for (_, part) in structure.parts() {
        for (copy, &index) in part.surfaces().iter().zip(part.symmetry_indices()).skip(1) {
            assert_eq!(
                copy.flip_normal(),
                parent.surfaces()[index].flip_normal(),
                "{} copy of surface {index}",
                part.name()
            );
        }
    }
}

#[test]
fn unrotated_rib_passes_through_both_edges() {
    let (registry, id, library) = setup(&[]);
    let mut structure = Structure::new("Struct", id, 0);
    let rib = structure.add_part(PartType::Rib).unwrap();
    structure.part_mut(rib).unwrap().location.rel = 0.3;
    structure.update(&FeaContext::new(&registry, &library));

    let surface = &structure.part(rib).unwrap().surfaces()[0];
    let center = surface.point(0.5, 0.5);
    let normal = surface.normal(0.5, 0.5);
    // span station 0.3 of 4, leading edge at x = 0, trailing edge at x = 2
    for edge in [Point3::new(0.0, 1.2, 0.0), Point3::new(2.0, 1.2, 0.0)] {
        assert_relative_eq!((edge - center).dot(&normal), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn array_count_follows_spacing() {
    let absolute = |spacing: f64| ArraySpacing {
        abs_start: 0.0,
        abs_end: 10.0,
        abs_spacing: spacing,
        ..ArraySpacing::default()
    };
    for (spacing, expected) in [(3.0, 4), (2.5, 5), (10.0, 2), (0.7, 15)] {
        let mut array = absolute(spacing);
        assert_eq!(array.resolve(LocationMode::Absolute, 10.0), expected, "spacing {spacing}");
    }
    let mut array = absolute(1e-12);
    assert_eq!(array.resolve(LocationMode::Absolute, 10.0), MAX_ARRAY_MEMBERS);
}

#[test]
fn mixed_structure_survives_save_and_load() {
    let (registry, id, library) = setup(&[SymmetryPlane::XZ]);
    let mut structure = Structure::new("Struct", id, 0);
    let spar = structure.add_part(PartType::Spar).unwrap();
    let rib = structure.add_part(PartType::Rib).unwrap();
    structure.add_part(PartType::Bulkhead);
    structure.add_part(PartType::FixPoint);
    structure.add_part(PartType::StiffenerArray);
    structure.add_sub_surface(SubSurfaceType::Rectangle);
    structure.add_sub_surface(SubSurfaceType::LineArray);
    if let PartKind::Spar(s) = &mut structure.part_mut(spar).unwrap().kind {
        s.theta = 17.25;
        s.limit_to_section = true;
        s.end_section = 1;
    }
    if let PartKind::Rib(r) = &mut structure.part_mut(rib).unwrap().kind {
        r.perpendicular_edge = feastruct::part::PerpendicularEdge::Part(spar);
    }
    structure.part_mut(rib).unwrap().location.rel = 0.123_456_789;
    structure.grid_density.base_len = 0.3;
    structure.update(&FeaContext::new(&registry, &library));

    let json = structure.to_json().unwrap();
    let mut loaded = Structure::from_json(&json, id, &registry).unwrap();
    assert_eq!(loaded.to_json().unwrap(), json);

    let types: Vec<_> = loaded.parts().map(|(_, p)| p.part_type()).collect();
    assert_eq!(
        types,
        [
            PartType::Skin,
            PartType::Spar,
            PartType::Rib,
            PartType::Bulkhead,
            PartType::FixPoint,
            PartType::StiffenerArray
        ]
    );
    assert_eq!(loaded.num_sub_surfaces(), 2);
    let loaded_rib = loaded.part(loaded.part_at(2).unwrap()).unwrap();
    assert_relative_eq!(loaded_rib.location.rel, 0.123_456_789, epsilon = 1e-9);

    // reloaded geometry matches once updated
    loaded.update(&FeaContext::new(&registry, &library));
    let before = &structure.part(rib).unwrap().surfaces()[1];
    let after = &loaded.part(loaded.part_at(2).unwrap()).unwrap().surfaces()[1];
    assert_relative_eq!(before.point(0.0, 0.0), after.point(0.0, 0.0), epsilon = 1e-9);
}

#[test]
fn fix_point_at_origin_is_a_corner() {
    let (registry, id, library) = setup(&[SymmetryPlane::XZ]);
    let mut structure = Structure::new("Struct", id, 0);
    let fix = structure.add_part(PartType::FixPoint).unwrap();
    if let PartKind::FixPoint(f) = &mut structure.part_mut(fix).unwrap().kind {
        f.set_position(0.0, 0.0);
    }
    let ctx = FeaContext::new(&registry, &library);
    for _ in 0..3 {
        structure.update(&ctx);
        let PartKind::FixPoint(f) = &structure.part(fix).unwrap().kind else {
            unreachable!()
        };
        assert!(f
            .copies()
            .iter()
            .all(|c| c.contact == Some(PatchContact::Corner)));
    }
}

#[test]
fn individual_ribs_match_array_members() {
    let (registry, id, library) = setup(&[SymmetryPlane::XZ]);
    let ctx = FeaContext::new(&registry, &library);
    let mut structure = Structure::new("Struct", id, 0);
    let array = structure.add_part(PartType::RibArray).unwrap();
    if let PartKind::RibArray(a) = &mut structure.part_mut(array).unwrap().kind {
        a.rib.theta = 15.0;
    }
    structure.update(&ctx);
    let rows = structure.part(array).unwrap().surfaces().to_vec();

    let ribs = structure.individualize_array(&ctx, 1);
    assert_eq!(ribs.len() * 2, rows.len());
    for (i, &rib) in ribs.iter().enumerate() {
        let part = structure.part(rib).unwrap();
        assert_eq!(part.part_type(), PartType::Rib);
        for (copy, surface) in part.surfaces().iter().enumerate() {
            let member = &rows[i * 2 + copy];
            for (u, w) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
                assert_relative_eq!(surface.point(u, w), member.point(u, w), epsilon = 1e-12);
            }
        }
    }
}
