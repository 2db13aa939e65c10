//! End-to-end properties of the registry, exercised through the public API.

use std::collections::{HashMap, HashSet};

use engine_storage::{Component, Entity, Registry, RegistryConfig, StorageError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pos {
    x: u64,
    y: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: u64,
    y: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Health(u32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tag;

impl Component for Pos {}
impl Component for Velocity {}
impl Component for Health {}
impl Component for Tag {}

fn seeded_registry(seed: u64) -> Registry {
    Registry::with_config(RegistryConfig::new().with_seed(seed))
}

#[test]
fn round_trip_add_then_query() {
    let mut registry = seeded_registry(1);
    let e = registry.generate_entity();
    registry.add_component(e, Health(42)).unwrap();

    let mut seen = Vec::new();
    registry
        .get_view::<(Health,)>()
        .execute(|entity, health| seen.push((entity, *health)));
    assert_eq!(seen, vec![(e, Health(42))]);
}

/// Random interleaved adds and removes, checked against a `HashMap` model.
#[test]
fn interleaved_add_remove_keeps_pool_dense() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut registry = seeded_registry(2);
    let entities: Vec<Entity> = (0..64).map(|_| registry.generate_entity()).collect();
    let mut model: HashMap<Entity, u64> = HashMap::new();

    for step in 0..2_000u64 {
        let e = entities[rng.gen_range(0..entities.len())];
        if model.contains_key(&e) {
            let removed = registry.remove_component::<Pos>(e).unwrap();
            assert_eq!(removed.x, model.remove(&e).unwrap());
        } else {
            registry.add_component(e, Pos { x: step, y: 0 }).unwrap();
            model.insert(e, step);
        }

        let pool = registry.pool::<Pos>().unwrap();
        assert!(pool.check_invariants());
        assert_eq!(pool.count(), model.len());
    }

    for (e, x) in &model {
        assert_eq!(registry.get_component::<Pos>(*e).unwrap().x, *x);
    }
}

#[test]
fn count_symmetry() {
    let mut registry = seeded_registry(3);
    let keep = registry.generate_entity();
    registry.add_component(keep, Tag).unwrap();
    let before = registry.component_count::<Tag>();

    let e = registry.generate_entity();
    registry.add_component(e, Tag).unwrap();
    registry.remove_component::<Tag>(e).unwrap();
    assert_eq!(registry.component_count::<Tag>(), before);
}

/// Every subset of three pools, each holding a random subset of entities,
/// must produce exactly the set intersection.
#[test]
fn intersection_matches_model_for_any_driver() {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..20 {
        let mut registry = seeded_registry(round);
        let entities: Vec<Entity> = (0..40).map(|_| registry.generate_entity()).collect();
        let mut has_pos = HashSet::new();
        let mut has_vel = HashSet::new();
        let mut has_health = HashSet::new();

        // Vary pool sizes so each type gets to be the driver.
        let (p_pos, p_vel, p_health) = match round % 3 {
            0 => (0.2, 0.6, 0.9),
            1 => (0.9, 0.2, 0.6),
            _ => (0.6, 0.9, 0.2),
        };
        for &e in &entities {
            if rng.gen_bool(p_pos) {
                registry.add_component(e, Pos { x: 0, y: 0 }).unwrap();
                has_pos.insert(e);
            }
            if rng.gen_bool(p_vel) {
                registry.add_component(e, Velocity { x: 0, y: 0 }).unwrap();
                has_vel.insert(e);
            }
            if rng.gen_bool(p_health) {
                registry.add_component(e, Health(0)).unwrap();
                has_health.insert(e);
            }
        }

        let expected: HashSet<Entity> = has_pos
            .iter()
            .filter(|e| has_vel.contains(*e) && has_health.contains(*e))
            .copied()
            .collect();
        let got: HashSet<Entity> = registry
            .get_view::<(Pos, Velocity, Health)>()
            .entities()
            .collect();
        assert_eq!(got, expected, "round {round}");

        let expected: HashSet<Entity> = has_vel.intersection(&has_health).copied().collect();
        let view = registry.get_view::<(Health, Velocity)>();
        assert_eq!(view.len(), expected.len());
        let got: HashSet<Entity> = view.entities().collect();
        assert_eq!(got, expected, "round {round}");
    }
}

#[test]
fn exclusion_and_inclusion_filters() {
    let mut registry = seeded_registry(4);
    let entities: Vec<Entity> = (0..10).map(|_| registry.generate_entity()).collect();
    for &e in &entities {
        registry.add_component(e, Pos { x: 0, y: 0 }).unwrap();
    }
    let side: HashSet<Entity> = entities.iter().step_by(3).copied().collect();

    let mut view = registry.get_view::<(Pos,)>();
    view.and_or_exclude(&side, false);
    let kept: HashSet<Entity> = view.entities().collect();
    drop(view);
    let expected: HashSet<Entity> = entities
        .iter()
        .filter(|e| !side.contains(*e))
        .copied()
        .collect();
    assert_eq!(kept, expected);

    let mut view = registry.get_view::<(Pos,)>();
    view.and_or_exclude(&side, true);
    let kept: HashSet<Entity> = view.entities().collect();
    assert_eq!(kept, side);
}

#[test]
fn entity_wide_removal_hides_entity_from_all_views() {
    let mut registry = seeded_registry(5);
    let e1 = registry.generate_entity();
    let e2 = registry.generate_entity();
    for e in [e1, e2] {
        registry.add_component(e, Pos { x: 0, y: 0 }).unwrap();
        registry.add_component(e, Velocity { x: 0, y: 0 }).unwrap();
    }
    registry.add_component(e1, Tag).unwrap();

    registry.remove_entity(e1);

    assert!(!registry.get_view::<(Pos,)>().contains(e1));
    assert!(!registry.get_view::<(Velocity, Pos)>().contains(e1));
    assert!(registry.get_view::<(Tag,)>().is_empty());
    assert!(registry.get_view::<(Pos, Velocity)>().contains(e2));
}

#[test]
fn position_integrates_velocity() {
    let mut registry = seeded_registry(6);
    let e1 = registry.generate_entity();
    registry.add_component(e1, Pos { x: 1, y: 0 }).unwrap();
    registry.add_component(e1, Velocity { x: 3, y: 2 }).unwrap();

    let mut view = registry.get_view::<(Pos, Velocity)>();
    assert_eq!(view.entities().collect::<Vec<_>>(), vec![e1]);
    view.execute(|_, pos, vel| {
        pos.x += vel.x;
        pos.y += vel.y;
    });
    drop(view);

    assert_eq!(registry.get_component::<Pos>(e1), Some(&Pos { x: 4, y: 2 }));
}

#[test]
fn tag_filters_position_query() {
    let mut registry = seeded_registry(7);
    let e1 = registry.generate_entity();
    let e2 = registry.generate_entity();
    registry.add_component(e1, Pos { x: 0, y: 0 }).unwrap();
    registry.add_component(e2, Pos { x: 0, y: 0 }).unwrap();
    registry.add_component(e1, Tag).unwrap();

    let view = registry.get_view::<(Pos, Tag)>();
    assert_eq!(view.entities().collect::<Vec<_>>(), vec![e1]);
}

#[test]
fn second_removal_reports_missing_entity() {
    let mut registry = seeded_registry(8);
    let e1 = registry.generate_entity();
    registry.add_component(e1, Velocity { x: 3, y: 2 }).unwrap();

    assert!(registry.remove_component::<Velocity>(e1).is_ok());
    assert_eq!(
        registry.remove_component::<Velocity>(e1),
        Err(StorageError::EntityNotFound {
            entity: e1,
            component: Velocity::type_name(),
        })
    );
}
