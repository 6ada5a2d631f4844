//! Per-dialog handler registry.
//!
//! Handlers live in priority-sorted lists, one per [`Category`] plus one per
//! [`KeyBinding`]. Dispatch merges the applicable lists into a single
//! snapshot ordered by `(priority, registration order)`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use veil_engine::input::{InputEvent, Key};

use crate::error::UiError;
use crate::ui::Ui;
use crate::widget::WidgetId;

/// Priority given by the plain `add_*` registration calls.
pub const DEFAULT_PRIORITY: i32 = 100;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

// ── Results ───────────────────────────────────────────────────────────────

/// Value a dialog loop can exit with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitValue {
    Bool(bool),
    Index(usize),
    Text(String),
}

/// Result of running a dialog loop to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Value(ExitValue),
    NoValue,
}

impl DialogOutcome {
    pub fn value(&self) -> Option<&ExitValue> {
        match self {
            DialogOutcome::Value(v) => Some(v),
            DialogOutcome::NoValue => None,
        }
    }
}

/// What a handler tells the loop after seeing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    /// Let lower-priority handlers see the event too.
    Continue,
    /// Stop dispatching this event.
    Handled,
    /// Leave the loop with a value.
    ExitWith(ExitValue),
    /// Leave the loop without a value.
    ExitEmpty,
}

impl From<DialogOutcome> for HandlerResult {
    fn from(outcome: DialogOutcome) -> Self {
        match outcome {
            DialogOutcome::Value(v) => HandlerResult::ExitWith(v),
            DialogOutcome::NoValue => HandlerResult::ExitEmpty,
        }
    }
}

// ── Keys ──────────────────────────────────────────────────────────────────

/// Handler list a registration goes into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Category {
    /// Key down and key up.
    Key,
    KeyDown,
    KeyUp,
    PointerMotion,
    /// Pointer motion with the primary button held.
    Drag,
    /// Pointer button released.
    Click,
    Tick,
}

/// Key-specific registration. `Char` bindings only fire on key-down, since
/// key-up events carry no character.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyBinding {
    Code(Key),
    Char(char),
}

impl From<Key> for KeyBinding {
    fn from(key: Key) -> Self {
        KeyBinding::Code(key)
    }
}

impl From<char> for KeyBinding {
    fn from(ch: char) -> Self {
        KeyBinding::Char(ch)
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// Handler signature.
pub type HandlerFn = dyn FnMut(&mut Ui, &InputEvent) -> Result<HandlerResult, UiError>;

pub(crate) type SharedHandler = Rc<RefCell<HandlerFn>>;

/// Registration handle, used for removal. Ids increase with registration
/// order across the whole process.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Entry {
    priority: i32,
    id: HandlerId,
    /// Widget the handler was registered on.
    owner: WidgetId,
    handler: SharedHandler,
}

/// A handler picked for one dispatch.
pub(crate) struct Dispatch {
    pub(crate) id: HandlerId,
    pub(crate) handler: SharedHandler,
}

fn insert_sorted(list: &mut Vec<Entry>, priority: i32, owner: WidgetId, handler: SharedHandler) -> HandlerId {
    let id = HandlerId::next();
    // After every entry of equal priority.
    let at = list.partition_point(|e| e.priority <= priority);
    list.insert(at, Entry { priority, id, owner, handler });
    id
}

fn remove_from(list: Option<&mut Vec<Entry>>, id: HandlerId) -> bool {
    let Some(list) = list else {
        return false;
    };
    let before = list.len();
    list.retain(|e| e.id != id);
    list.len() != before
}

#[derive(Default)]
pub(crate) struct HandlerRegistry {
    by_category: HashMap<Category, Vec<Entry>>,
    by_key: HashMap<KeyBinding, Vec<Entry>>,
}

impl HandlerRegistry {
    pub(crate) fn add(
        &mut self,
        category: Category,
        priority: i32,
        owner: WidgetId,
        handler: SharedHandler,
    ) -> HandlerId {
        insert_sorted(self.by_category.entry(category).or_default(), priority, owner, handler)
    }

    pub(crate) fn add_key(
        &mut self,
        binding: KeyBinding,
        priority: i32,
        owner: WidgetId,
        handler: SharedHandler,
    ) -> HandlerId {
        insert_sorted(self.by_key.entry(binding).or_default(), priority, owner, handler)
    }

    /// Drops every handler registered on one of `owners`. Returns how many
    /// went and whether a tick handler was among them.
    pub(crate) fn purge(&mut self, owners: &[WidgetId]) -> (usize, bool) {
        let mut purged = 0;
        let mut ticks = false;
        for (category, list) in self.by_category.iter_mut() {
            let before = list.len();
            list.retain(|e| !owners.contains(&e.owner));
            purged += before - list.len();
            ticks |= *category == Category::Tick && before != list.len();
        }
        for list in self.by_key.values_mut() {
            let before = list.len();
            list.retain(|e| !owners.contains(&e.owner));
            purged += before - list.len();
        }
        (purged, ticks)
    }

    pub(crate) fn remove(&mut self, category: Category, id: HandlerId) -> bool {
        remove_from(self.by_category.get_mut(&category), id)
    }

    pub(crate) fn remove_key(&mut self, binding: KeyBinding, id: HandlerId) -> bool {
        remove_from(self.by_key.get_mut(&binding), id)
    }

    pub(crate) fn has(&self, category: Category) -> bool {
        self.by_category.get(&category).is_some_and(|l| !l.is_empty())
    }

    /// Snapshot of every handler in the given lists, in dispatch order.
    pub(crate) fn gather(&self, categories: &[Category], keys: &[KeyBinding]) -> Vec<Dispatch> {
        let mut picked: Vec<&Entry> = categories
            .iter()
            .filter_map(|c| self.by_category.get(c))
            .chain(keys.iter().filter_map(|k| self.by_key.get(k)))
            .flatten()
            .collect();
        picked.sort_by_key(|e| (e.priority, e.id));
        picked
            .into_iter()
            .map(|e| Dispatch { id: e.id, handler: e.handler.clone() })
            .collect()
    }
}

/// Wraps a closure for registration.
pub(crate) fn share<F>(f: F) -> SharedHandler
where
    F: FnMut(&mut Ui, &InputEvent) -> Result<HandlerResult, UiError> + 'static,
{
    Rc::new(RefCell::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OWNER: WidgetId = WidgetId(0);

    fn noop() -> SharedHandler {
        share(|_, _| Ok(HandlerResult::Continue))
    }

    fn ids(list: &[Dispatch]) -> Vec<HandlerId> {
        list.iter().map(|d| d.id).collect()
    }

    #[test]
    fn equal_priority_keeps_insertion_order() {
        let mut reg = HandlerRegistry::default();
        let a = reg.add(Category::Click, 100, OWNER, noop());
        let b = reg.add(Category::Click, 100, OWNER, noop());
        let c = reg.add(Category::Click, 50, OWNER, noop());
        assert_eq!(ids(&reg.gather(&[Category::Click], &[])), vec![c, a, b]);
    }

    #[test]
    fn gather_merges_categories_and_keys() {
        let mut reg = HandlerRegistry::default();
        let generic = reg.add(Category::Key, 100, OWNER, noop());
        let down = reg.add(Category::KeyDown, 10, OWNER, noop());
        let enter = reg.add_key(KeyBinding::Code(Key::Enter), 0, OWNER, noop());
        let ch = reg.add_key(KeyBinding::Char('y'), 100, OWNER, noop());
        let _up = reg.add(Category::KeyUp, 0, OWNER, noop());

        let got = reg.gather(
            &[Category::Key, Category::KeyDown],
            &[KeyBinding::Char('y'), KeyBinding::Code(Key::Enter)],
        );
        assert_eq!(ids(&got), vec![enter, down, generic, ch]);
    }

    #[test]
    fn remove_key_takes_from_key_list() {
        let mut reg = HandlerRegistry::default();
        let id = reg.add_key(Key::Escape.into(), 100, OWNER, noop());
        assert!(!reg.remove(Category::Key, id));
        assert!(reg.remove_key(Key::Escape.into(), id));
        assert!(reg.gather(&[], &[Key::Escape.into()]).is_empty());
    }

    #[test]
    fn has_reflects_removal() {
        let mut reg = HandlerRegistry::default();
        assert!(!reg.has(Category::Tick));
        let id = reg.add(Category::Tick, 100, OWNER, noop());
        assert!(reg.has(Category::Tick));
        reg.remove(Category::Tick, id);
        assert!(!reg.has(Category::Tick));
    }

    #[test]
    fn purge_drops_only_the_given_owners() {
        let mut reg = HandlerRegistry::default();
        let (gone, kept) = (WidgetId(3), WidgetId(4));
        reg.add(Category::Click, 100, gone, noop());
        reg.add(Category::Tick, 100, gone, noop());
        reg.add_key(KeyBinding::Char('x'), 100, gone, noop());
        let survivor = reg.add(Category::Click, 100, kept, noop());

        assert_eq!(reg.purge(&[gone]), (3, true));
        assert_eq!(ids(&reg.gather(&[Category::Click, Category::Tick], &[KeyBinding::Char('x')])), vec![survivor]);
        assert_eq!(reg.purge(&[gone]), (0, false));
    }

    proptest! {
        #[test]
        fn dispatch_order_is_sorted_and_stable(prios in prop::collection::vec((0usize..3, -5i32..5), 0..40)) {
            let cats = [Category::Key, Category::KeyDown, Category::Tick];
            let mut reg = HandlerRegistry::default();
            let mut registered = Vec::new();
            for (cat, prio) in prios {
                let id = reg.add(cats[cat], prio, OWNER, noop());
                registered.push((prio, id));
            }
            let got = ids(&reg.gather(&cats, &[]));

            // Stable sort of registration order by priority alone.
            registered.sort_by_key(|(p, _)| *p);
            let expected: Vec<HandlerId> = registered.into_iter().map(|(_, id)| id).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
