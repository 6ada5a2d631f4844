//! Keyboard focus chains.
//!
//! A focus dialog owns one [`FocusChain`]: the focusable widgets registered
//! with it, in registration order, and the current holder. Cycling is bound
//! to the focus key (Tab by default) at priority 0; Shift reverses.

use crate::widget::WidgetId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FocusChain {
    members: Vec<WidgetId>,
    current: Option<WidgetId>,
}

impl FocusChain {
    pub(crate) fn members(&self) -> &[WidgetId] {
        &self.members
    }

    pub(crate) fn current(&self) -> Option<WidgetId> {
        self.current
    }

    pub(crate) fn add(&mut self, id: WidgetId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: WidgetId) {
        self.members.retain(|m| *m != id);
        if self.current == Some(id) {
            self.current = None;
        }
    }

    /// Records `id` as the holder. Returns the previous holder when it has
    /// to give up focus.
    pub(crate) fn took_focus(&mut self, id: WidgetId) -> Option<WidgetId> {
        let previous = self.current.replace(id);
        previous.filter(|p| *p != id)
    }

    /// Moves focus one step and returns the new holder.
    ///
    /// A holder outside the chain restarts at the first member (the last
    /// when going backwards).
    pub(crate) fn cycle(&mut self, backwards: bool) -> Option<WidgetId> {
        let len = self.members.len();
        let next = match len {
            0 => return None,
            1 => 0,
            _ => match self.current.and_then(|c| self.members.iter().position(|m| *m == c)) {
                None if backwards => len - 1,
                None => 0,
                Some(i) if backwards => (i + len - 1) % len,
                Some(i) => (i + 1) % len,
            },
        };
        let id = self.members[next];
        self.current = Some(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chain(n: usize) -> FocusChain {
        let mut c = FocusChain::default();
        for i in 0..n {
            c.add(WidgetId(i));
        }
        c
    }

    #[test]
    fn empty_chain_cycles_to_nothing() {
        let mut c = FocusChain::default();
        assert_eq!(c.cycle(false), None);
        assert_eq!(c.current(), None);
    }

    #[test]
    fn single_member_always_focused() {
        let mut c = chain(1);
        assert_eq!(c.cycle(false), Some(WidgetId(0)));
        assert_eq!(c.cycle(true), Some(WidgetId(0)));
    }

    #[test]
    fn outsider_restarts_at_ends() {
        let mut c = chain(3);
        c.took_focus(WidgetId(99));
        assert_eq!(c.cycle(false), Some(WidgetId(0)));
        c.took_focus(WidgetId(99));
        assert_eq!(c.cycle(true), Some(WidgetId(2)));
    }

    #[test]
    fn backwards_from_first_wraps_to_last() {
        let mut c = chain(4);
        c.took_focus(WidgetId(0));
        assert_eq!(c.cycle(true), Some(WidgetId(3)));
    }

    #[test]
    fn took_focus_reports_previous_holder() {
        let mut c = chain(2);
        assert_eq!(c.took_focus(WidgetId(0)), None);
        assert_eq!(c.took_focus(WidgetId(0)), None);
        assert_eq!(c.took_focus(WidgetId(1)), Some(WidgetId(0)));
    }

    #[test]
    fn removing_holder_clears_current() {
        let mut c = chain(2);
        c.took_focus(WidgetId(1));
        c.remove(WidgetId(1));
        assert_eq!(c.current(), None);
        assert_eq!(c.members(), &[WidgetId(0)]);
    }

    proptest! {
        #[test]
        fn full_cycle_returns_to_start(n in 1usize..12, start in 0usize..12, backwards: bool) {
            let start = start % n;
            let mut c = chain(n);
            c.took_focus(WidgetId(start));
            for _ in 0..n {
                c.cycle(backwards);
            }
            prop_assert_eq!(c.current(), Some(WidgetId(start)));
        }
    }
}
