//! # Registry Property Tests
//!
//! Randomized create/destroy/add/remove sequences checked against a shadow
//! model, plus the fixed scenarios every registry must satisfy.
//!
//! Run with: cargo test --package tessera_core --test registry_properties

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::{component_set, Entity, Registry};

#[derive(Debug, Clone, PartialEq)]
struct A(u64);

#[derive(Debug, Clone, PartialEq)]
struct B(u64);

component_set! {
    struct Ab {
        a: A,
        b: B,
    }
}

fn sorted(iter: impl Iterator<Item = Entity>) -> Vec<Entity> {
    let mut entities: Vec<_> = iter.collect();
    entities.sort_unstable();
    entities
}

// ============================================================================
// IDENTITY
// ============================================================================

#[test]
fn destroyed_entities_never_revalidate() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7E55_E7A);
    let mut registry = Registry::<Ab>::new();
    let mut live: Vec<Entity> = Vec::new();
    let mut dead: Vec<Entity> = Vec::new();
    let mut ever_issued = HashSet::new();

    for _ in 0..20_000 {
        if live.is_empty() || rng.gen_bool(0.6) {
            let entity = registry.create();
            assert!(!entity.is_null());
            assert!(ever_issued.insert(entity), "{entity} issued twice");
            live.push(entity);
        } else {
            let victim = live.swap_remove(rng.gen_range(0..live.len()));
            registry.destroy(victim);
            dead.push(victim);
        }
    }

    assert!(live.iter().all(|&e| registry.valid(e)));
    assert!(dead.iter().all(|&e| !registry.valid(e)));
    assert_eq!(registry.len(), live.len());
    assert_eq!(sorted(registry.all()), sorted(live.into_iter()));
}

// ============================================================================
// COMPONENT ROUND TRIPS
// ============================================================================

#[test]
fn components_match_shadow_model() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut registry = Registry::<Ab>::new();
    let mut shadow_a: HashMap<Entity, u64> = HashMap::new();
    let mut shadow_b: HashMap<Entity, u64> = HashMap::new();
    let mut live: Vec<Entity> = Vec::new();

    for step in 0..10_000u64 {
        match rng.gen_range(0..6) {
            0 => live.push(registry.create()),
            1 if !live.is_empty() => {
                let entity = live.swap_remove(rng.gen_range(0..live.len()));
                registry.destroy(entity);
                shadow_a.remove(&entity);
                shadow_b.remove(&entity);
            }
            2 if !live.is_empty() => {
                let entity = live[rng.gen_range(0..live.len())];
                if !registry.has::<A>(entity) {
                    registry.add(entity, A(step));
                    shadow_a.insert(entity, step);
                }
            }
            3 if !live.is_empty() => {
                let entity = live[rng.gen_range(0..live.len())];
                if !registry.has::<B>(entity) {
                    registry.add(entity, B(step));
                    shadow_b.insert(entity, step);
                }
            }
            4 if !live.is_empty() => {
                let entity = live[rng.gen_range(0..live.len())];
                assert_eq!(registry.remove::<A>(entity).map(|a| a.0), shadow_a.remove(&entity));
            }
            _ => {}
        }
    }

    assert_eq!(registry.count::<A>(), shadow_a.len());
    assert_eq!(registry.count::<B>(), shadow_b.len());
    for &entity in &live {
        assert_eq!(registry.get_if::<A>(entity).map(|a| a.0), shadow_a.get(&entity).copied());
        assert_eq!(registry.get_if::<B>(entity).map(|b| b.0), shadow_b.get(&entity).copied());
    }

    let both: HashSet<_> = shadow_a
        .keys()
        .filter(|e| shadow_b.contains_key(e))
        .copied()
        .collect();
    assert_eq!(registry.view::<(A, B)>().collect::<HashSet<_>>(), both);
    assert_eq!(registry.view::<(B, A)>().collect::<HashSet<_>>(), both);
}

#[test]
fn removing_absent_component_changes_nothing() {
    let fired = Rc::new(RefCell::new(0));
    let mut registry = Registry::<Ab>::new();
    let counter = Rc::clone(&fired);
    registry.on_remove::<A, _>(move |_, _| *counter.borrow_mut() += 1);

    let e = registry.create();
    registry.add(e, B(1));
    assert_eq!(registry.remove::<A>(e), None);
    assert_eq!(*fired.borrow(), 0);
    assert!(registry.has::<B>(e));
    assert_eq!(registry.len(), 1);
}

// ============================================================================
// VIEWS
// ============================================================================

#[test]
fn view_matches_conjunction() {
    let mut registry = Registry::<Ab>::new();
    let e1 = registry.create();
    registry.add(e1, A(1));
    let e2 = registry.create();
    registry.add(e2, A(2));
    registry.add(e2, B(2));
    let e3 = registry.create();
    registry.add(e3, B(3));

    assert_eq!(sorted(registry.view::<(A, B)>()), vec![e2]);
    assert_eq!(sorted(registry.view::<(A,)>()), vec![e1, e2]);
    assert_eq!(sorted(registry.all()), vec![e1, e2, e3]);
}

#[test]
fn destroy_if_removes_only_matches() {
    let mut registry = Registry::<Ab>::new();
    let entities = registry.create_many(20);
    for (i, &entity) in entities.iter().enumerate() {
        let value = u64::try_from(i).unwrap();
        registry.add(entity, A(value));
        if i % 2 == 0 {
            registry.add(entity, B(value));
        }
    }

    let destroyed = registry.destroy_if::<(B, A), _>(|r, e| r.get::<A>(e).0 < 10);
    assert_eq!(destroyed, 5);
    assert_eq!(registry.len(), 15);
    assert_eq!(registry.count::<B>(), 5);
    assert!(registry.view::<(B,)>().all(|e| registry.get::<A>(e).0 >= 10));
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[test]
fn destroy_notifies_exactly_once_with_live_data() {
    let log: Rc<RefCell<Vec<(Entity, u64)>>> = Rc::new(RefCell::new(Vec::new()));
    let mut registry = Registry::<Ab>::new();
    let sink = Rc::clone(&log);
    registry.on_remove::<A, _>(move |e, a| sink.borrow_mut().push((e, a.0)));

    let keep = registry.create();
    registry.add(keep, A(1));
    let doomed = registry.create();
    registry.add(doomed, A(2));
    registry.add(doomed, B(2));

    registry.destroy(doomed);
    assert_eq!(*log.borrow(), vec![(doomed, 2)]);

    let reused = registry.create();
    assert_eq!(reused.index(), doomed.index());
    assert!(!registry.has::<A>(reused));
    assert_eq!(log.borrow().len(), 1);
}

// ============================================================================
// SIZE ACCOUNTING
// ============================================================================

#[test]
fn size_tracks_create_destroy_clear() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut registry = Registry::<Ab>::new();
    let mut live: Vec<Entity> = Vec::new();

    for round in 0..50 {
        for _ in 0..rng.gen_range(1..40) {
            live.push(registry.create());
        }
        for _ in 0..rng.gen_range(0..live.len()) {
            let victim = live.swap_remove(rng.gen_range(0..live.len()));
            registry.destroy(victim);
        }
        assert_eq!(registry.len(), live.len());

        if round % 10 == 9 {
            registry.clear();
            live.clear();
            assert!(registry.is_empty());
            assert_eq!(registry.retired_len(), 0);
        }
    }
}

#[test]
fn copy_entity_clones_all_components() {
    let mut source = Registry::<Ab>::new();
    let original = source.create();
    source.add(original, A(11));
    source.add(original, B(22));

    let mut target = Registry::<Ab>::new();
    let copy = source.copy_entity(original, &mut target);

    assert_eq!(target.get_all::<(A, B)>(copy), (&A(11), &B(22)));
    source.get_mut::<A>(original).0 = 0;
    assert_eq!(target.get::<A>(copy), &A(11));
}
