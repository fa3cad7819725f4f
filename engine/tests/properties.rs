//! Property-based tests for store invariants.

use proptest::prelude::*;
use roster_engine::{
    EntityStore, Filter, ManualClock, PageRequest, Record, RecordId, Role, SortKey, User,
};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Create(String, Role),
    Update(usize, String),
    Delete(usize),
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Editor), Just(Role::Viewer)]
}

fn arb_name() -> impl Strategy<Value = String> {
    // small alphabet so sort keys collide often
    "[a-c]{0,2}"
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_name(), arb_role()).prop_map(|(name, role)| Op::Create(name, role)),
        1 => (0usize..64, arb_name()).prop_map(|(slot, name)| Op::Update(slot, name)),
        1 => (0usize..64).prop_map(Op::Delete),
    ]
}

fn arb_sort_key() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::by("name")),
        Just(SortKey::desc("name")),
        Just(SortKey::by("role")),
        Just(SortKey::desc("email")),
        Just(SortKey::by("createdAt")),
        Just(SortKey::id()),
        Just(SortKey::by("unknown")),
    ]
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    (proptest::option::of(arb_role()), proptest::option::of("[a-c]"))
        .prop_map(|(role, needle)| Filter::new().eq_opt("role", role).contains_opt("name", needle))
}

/// Apply ops to a fresh store, returning it with every id ever allocated.
fn run_ops(ops: &[Op]) -> (EntityStore<User>, Vec<RecordId>) {
    let clock = Arc::new(ManualClock::new(0));
    let store = EntityStore::with_clock(clock.clone());
    let mut allocated = Vec::new();

    for op in ops {
        clock.advance(1);
        match op {
            Op::Create(name, role) => {
                let email = format!("{}@example.com", name);
                allocated.push(store.create(User::new(name.as_str(), email, *role)).id());
            }
            Op::Update(slot, name) => {
                if let Some(id) = allocated.get(*slot) {
                    store.update(*id, |u| u.name = name.clone());
                }
            }
            Op::Delete(slot) => {
                if let Some(id) = allocated.get(*slot) {
                    store.delete(*id);
                }
            }
        }
    }

    (store, allocated)
}

fn ids(records: &[Record<User>]) -> Vec<RecordId> {
    records.iter().map(Record::id).collect()
}

proptest! {
    #[test]
    fn prop_keys_match_embedded_ids(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (store, _) = run_ops(&ops);
        let snapshot = store.export_snapshot();

        prop_assert!(snapshot.validate().is_ok());
        for record in store.list_all() {
            let fetched = store.get_by_id(record.id());
            prop_assert_eq!(fetched.map(|r| r.id()), Some(record.id()));
        }
    }

    #[test]
    fn prop_ids_are_never_reused(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (_, allocated) = run_ops(&ops);

        let unique: HashSet<_> = allocated.iter().collect();
        prop_assert_eq!(unique.len(), allocated.len());
        prop_assert!(allocated.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_update_on_absent_id_is_a_no_op(
        ops in prop::collection::vec(arb_op(), 0..40),
        offset in 1u64..10,
    ) {
        let (store, allocated) = run_ops(&ops);
        let before = store.list_all();
        let absent = allocated.last().copied().unwrap_or(0) + offset;

        prop_assert!(!store.update(absent, |u| u.name.push('!')));
        prop_assert_eq!(store.list_all(), before);
    }

    #[test]
    fn prop_delete_is_idempotent(ops in prop::collection::vec(arb_op(), 1..40)) {
        let (store, allocated) = run_ops(&ops);

        for id in allocated {
            let existed = store.contains(id);
            prop_assert_eq!(store.delete(id), existed);
            prop_assert!(!store.delete(id));
        }
        prop_assert!(store.is_empty());
    }

    #[test]
    fn prop_pages_concatenate_to_full_result(
        ops in prop::collection::vec(arb_op(), 0..80),
        filter in arb_filter(),
        sort in arb_sort_key(),
        size in 1i64..8,
    ) {
        let (store, _) = run_ops(&ops);

        let everything = store.paginate(&filter, &sort, PageRequest::new(0, 100).unwrap());

        let first = store.paginate(&filter, &sort, PageRequest::new(0, size).unwrap());
        let mut stitched = Vec::new();
        for index in 0..first.total_pages {
            let request = PageRequest::new(index as i64, size).unwrap();
            let page = store.paginate(&filter, &sort, request);
            prop_assert!(page.items.len() <= size as usize);
            prop_assert_eq!(page.total_matching, first.total_matching);
            stitched.extend(page.items);
        }

        prop_assert_eq!(stitched.len(), first.total_matching);
        prop_assert_eq!(ids(&stitched), ids(&everything.items));

        let unique: HashSet<_> = ids(&stitched).into_iter().collect();
        prop_assert_eq!(unique.len(), stitched.len());
    }

    #[test]
    fn prop_equal_sort_keys_keep_identity_order(
        ops in prop::collection::vec(arb_op(), 0..80),
        sort in arb_sort_key(),
    ) {
        let (store, _) = run_ops(&ops);
        let page = store.paginate(&Filter::new(), &sort, PageRequest::new(0, 100).unwrap());

        for pair in page.items.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let same_key = match sort.name() {
                "name" => a.payload().name == b.payload().name,
                "role" => a.payload().role == b.payload().role,
                "email" => a.payload().email == b.payload().email,
                "createdAt" => a.created_at() == b.created_at(),
                _ => false,
            };
            if same_key {
                prop_assert!(a.id() < b.id());
            }
        }
    }

    #[test]
    fn prop_filter_agrees_with_predicate(
        ops in prop::collection::vec(arb_op(), 0..80),
        role in arb_role(),
    ) {
        let (store, _) = run_ops(&ops);

        let filtered = store.filter(&Filter::new().eq("role", role));
        let expected = store.find(|r| r.payload().role == role);
        prop_assert_eq!(ids(&filtered), ids(&expected));

        let counts = store.count_by_key(|u| u.role);
        prop_assert_eq!(counts.get(&role).copied().unwrap_or(0), filtered.len());
    }
}
