use std::collections::VecDeque;
use std::fmt::Debug;

use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_HISTORY_CAP: usize = 8;

/// A record held by a screen's store.
pub trait Record: Clone + Debug {
    /// Partial update; `None` fields keep the current value.
    type Patch;

    fn id(&self) -> Uuid;
    fn assign_id(&mut self, id: Uuid);
    fn apply(&mut self, patch: &Self::Patch);
}

/// In-memory record list with whole-list undo/redo.
///
/// Every successful mutation snapshots the full list before it runs. The
/// history is bounded; once full, the oldest snapshot is dropped.
#[derive(Debug, Clone)]
pub struct Store<T: Record> {
    items: Vec<T>,
    history: VecDeque<Vec<T>>,
    redo: Vec<Vec<T>>,
    cap: usize,
}

impl<T: Record> Store<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_history_cap(items, DEFAULT_HISTORY_CAP)
    }

    pub fn with_history_cap(items: Vec<T>, cap: usize) -> Self {
        Self {
            items,
            history: VecDeque::new(),
            redo: Vec::new(),
            cap: cap.max(1),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn history_cap(&self) -> usize {
        self.cap
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Appends the record under a fresh id. No schema check happens here.
    pub fn add(&mut self, mut record: T) -> Uuid {
        let id = Uuid::new_v4();
        record.assign_id(id);
        self.snapshot();
        self.items.push(record);
        debug!(%id, total = self.items.len(), "record added");
        id
    }

    pub fn update(&mut self, id: Uuid, patch: &T::Patch) -> bool {
        let Some(index) = self.position(id, "update") else {
            return false;
        };
        self.snapshot();
        self.items[index].apply(patch);
        debug!(%id, "record updated");
        true
    }

    /// Swaps in a whole record, keeping the stored id.
    pub fn replace(&mut self, id: Uuid, mut record: T) -> bool {
        let Some(index) = self.position(id, "replace") else {
            return false;
        };
        record.assign_id(id);
        self.snapshot();
        self.items[index] = record;
        debug!(%id, "record replaced");
        true
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let Some(index) = self.position(id, "remove") else {
            return false;
        };
        self.snapshot();
        self.items.remove(index);
        debug!(%id, total = self.items.len(), "record removed");
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.items, previous);
        self.redo.push(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.items, next);
        self.push_history(current);
        true
    }

    fn position(&self, id: Uuid, op: &str) -> Option<usize> {
        let index = self.items.iter().position(|item| item.id() == id);
        if index.is_none() {
            warn!(%id, op, "no record with this id; ignoring");
        }
        index
    }

    fn snapshot(&mut self) {
        let current = self.items.clone();
        self.push_history(current);
        self.redo.clear();
    }

    fn push_history(&mut self, items: Vec<T>) {
        self.history.push_back(items);
        while self.history.len() > self.cap {
            self.history.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: Uuid,
        name: String,
        score: f64,
    }

    #[derive(Default)]
    struct ItemPatch {
        name: Option<String>,
        score: Option<f64>,
    }

    impl Record for Item {
        type Patch = ItemPatch;

        fn id(&self) -> Uuid {
            self.id
        }

        fn assign_id(&mut self, id: Uuid) {
            self.id = id;
        }

        fn apply(&mut self, patch: &ItemPatch) {
            if let Some(name) = &patch.name {
                self.name = name.clone();
            }
            if let Some(score) = patch.score {
                self.score = score;
            }
        }
    }

    fn item(name: &str, score: f64) -> Item {
        Item {
            id: Uuid::nil(),
            name: name.to_string(),
            score,
        }
    }

    fn seeded() -> Store<Item> {
        let mut first = item("Luka", 81.0);
        first.id = Uuid::new_v4();
        let mut second = item("Ivo", 64.0);
        second.id = Uuid::new_v4();
        Store::new(vec![first, second])
    }

    #[test]
    fn add_then_remove_restores_list() {
        let mut store = seeded();
        let before = store.items().to_vec();

        let id = store.add(item("Marin", 70.0));
        assert_eq!(store.len(), 3);
        assert!(store.remove(id));

        assert_eq!(store.items(), before.as_slice());
    }

    #[test]
    fn add_assigns_fresh_ids() {
        let mut store = Store::new(Vec::new());
        let a = store.add(item("A", 1.0));
        let b = store.add(item("B", 2.0));
        assert_ne!(a, b);
        assert_ne!(a, Uuid::nil());
        assert_eq!(store.get(a).map(|i| i.name.as_str()), Some("A"));
    }

    #[test]
    fn update_merges_patch_and_keeps_id() {
        let mut store = seeded();
        let id = store.add(item("Marin", 70.0));
        let patch = ItemPatch {
            score: Some(88.0),
            ..Default::default()
        };

        assert!(store.update(id, &patch));

        let updated = store.get(id).unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.name, "Marin");
        assert_eq!(updated.score, 88.0);
    }

    #[test]
    fn misses_are_silent_no_ops() {
        let mut store = seeded();
        let before = store.items().to_vec();
        let missing = Uuid::new_v4();

        assert!(!store.update(missing, &ItemPatch::default()));
        assert!(!store.replace(missing, item("Ghost", 0.0)));
        assert!(!store.remove(missing));

        assert_eq!(store.items(), before.as_slice());
        assert!(!store.can_undo());
    }

    #[test]
    fn undo_walks_back_to_initial_snapshot() {
        let mut store = seeded();
        let initial = store.items().to_vec();

        let id = store.add(item("Marin", 70.0));
        store.update(
            id,
            &ItemPatch {
                name: Some("Marin K.".to_string()),
                ..Default::default()
            },
        );
        let first = initial[0].id;
        store.remove(first);

        for _ in 0..3 {
            assert!(store.undo());
        }
        assert_eq!(store.items(), initial.as_slice());
        assert!(!store.undo());
    }

    #[test]
    fn undo_then_redo_is_a_no_op() {
        let mut store = seeded();
        store.add(item("Marin", 70.0));
        let visible = store.items().to_vec();

        assert!(store.undo());
        assert!(store.redo());

        assert_eq!(store.items(), visible.as_slice());
        assert!(!store.can_redo());
    }

    #[test]
    fn new_mutation_clears_redo() {
        let mut store = seeded();
        store.add(item("Marin", 70.0));
        store.undo();
        assert!(store.can_redo());

        store.add(item("Ante", 55.0));
        assert!(!store.can_redo());
    }

    #[test]
    fn history_is_bounded() {
        let mut store = Store::with_history_cap(Vec::new(), 3);
        for n in 0..5 {
            store.add(item(&format!("r{n}"), n as f64));
        }

        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(store.len(), 2);
    }
}
