//! State of the one open picker.

use serde::Serialize;

use crate::grid::GridModel;
use crate::month::ProbeError;
use crate::navigator::{CalendarNavigator, Step};
use crate::sync::FieldId;
use crate::timer::TimerId;
use crate::CalendarDate;

/// Where the picker is anchored on screen, in host units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Anchor {
    pub left: i32,
    pub top:  i32,
}

/// What the picker currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerView {
    Grid(GridModel),
    /// Month layout unknown until the bridge is available
    Pending,
    /// Month layout could not be derived
    Failed(ProbeError),
}

/// Transient picker state for one bound field.
#[derive(Debug)]
pub struct CalendarSession {
    field:               FieldId,
    navigator:           CalendarNavigator,
    selected:            Option<CalendarDate>,
    anchor:              Anchor,
    pub(crate) view:     PickerView,
    pub(crate) rerender: Option<TimerId>,
}

impl CalendarSession {
    pub(crate) const fn new(
        field: FieldId,
        navigator: CalendarNavigator,
        selected: Option<CalendarDate>,
        anchor: Anchor,
    ) -> Self {
        Self {
            field,
            navigator,
            selected,
            anchor,
            view: PickerView::Pending,
            rerender: None,
        }
    }

    pub const fn field(&self) -> FieldId {
        self.field
    }

    pub const fn navigator(&self) -> &CalendarNavigator {
        &self.navigator
    }

    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub const fn view(&self) -> &PickerView {
        &self.view
    }

    /// BS date shown as selected when the session opened.
    pub const fn selected(&self) -> Option<CalendarDate> {
        self.selected
    }

    /// The selected day, if it lies in the month under the cursor.
    pub fn selected_day(&self) -> Option<u8> {
        self.selected
            .filter(|d| d.year() == self.navigator.year() && d.month_typed() == self.navigator.month())
            .map(|d| d.day())
    }

    pub(crate) fn step(&mut self, step: Step) {
        self.navigator.step_month(step);
    }

    pub(crate) fn step_year(&mut self, step: Step) {
        self.navigator.step_year(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Month;

    fn session(selected: Option<CalendarDate>) -> CalendarSession {
        CalendarSession::new(
            FieldId::from(1),
            CalendarNavigator::new(2082, Month::new(12).unwrap()),
            selected,
            Anchor { left: 10, top: 20 },
        )
    }

    #[test]
    fn test_selected_day_follows_cursor() {
        let mut s = session(CalendarDate::bs(2082, 12, 8).ok());
        assert_eq!(s.selected_day(), Some(8));

        s.step(Step::Next);
        assert_eq!(s.selected_day(), None);

        s.step(Step::Previous);
        assert_eq!(s.selected_day(), Some(8));

        s.step_year(Step::Next);
        assert_eq!(s.selected_day(), None);
    }

    #[test]
    fn test_new_session_starts_pending() {
        let s = session(None);
        assert_eq!(s.view(), &PickerView::Pending);
        assert_eq!(s.anchor(), Anchor { left: 10, top: 20 });
        assert_eq!(s.selected_day(), None);
    }
}
