//! Host-side seams: bound text fields, value writers and change sources.

use std::time::Duration;

/// A text input holding an AD date, supplied by the host.
pub trait DateField {
    /// Stable identity of the underlying input; one binding per key.
    fn key(&self) -> &str;

    fn value(&self) -> String;

    fn set_value(&mut self, value: &str);

    /// Propagates a programmatic change to the host's listeners
    /// (the equivalent of firing `input`/`change` events).
    fn dispatch_change(&mut self) {}

    /// Third-party picker widget owning this input, if one is discoverable.
    fn external_widget(&mut self) -> Option<&mut dyn ExternalWidget> {
        None
    }
}

/// A widget that ignores direct value mutation and must be told through its
/// own setter.
pub trait ExternalWidget {
    fn set_value(&mut self, value: &str);
}

/// Applies an externally observable value change to a field.
pub trait ValueSink {
    fn apply(&mut self, field: &mut dyn DateField, value: &str);
}

/// Writes the raw value, dispatches the change, then forwards to the owning
/// widget's setter when there is one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSink;

impl ValueSink for DefaultSink {
    fn apply(&mut self, field: &mut dyn DateField, value: &str) {
        field.set_value(value);
        field.dispatch_change();
        if let Some(widget) = field.external_widget() {
            widget.set_value(value);
        }
    }
}

/// Tells the controller when a bound field's value needs re-syncing.
///
/// Implementations differ only in how changes are noticed; the controller
/// treats them identically.
pub trait ValueChangeSource {
    /// The host observed a change on the field.
    fn notify(&mut self);

    /// Returns the value to sync if it changed since the last call, and
    /// records `current` as seen.
    fn take_change(&mut self, current: &str) -> Option<String>;

    /// How often the controller should re-check the field, if at all.
    fn poll_interval(&self) -> Option<Duration>;
}

/// Push-style source: changes are exactly the host's notifications.
#[derive(Debug, Clone, Default)]
pub struct PushSource {
    notified: bool,
}

impl ValueChangeSource for PushSource {
    fn notify(&mut self) {
        self.notified = true;
    }

    fn take_change(&mut self, current: &str) -> Option<String> {
        std::mem::take(&mut self.notified).then(|| current.to_owned())
    }

    fn poll_interval(&self) -> Option<Duration> {
        None
    }
}

/// Periodic diffing against the last-seen value, for hosts whose change
/// notifications are unreliable.
#[derive(Debug, Clone)]
pub struct PollingSource {
    last_seen: Option<String>,
    interval:  Duration,
}

impl PollingSource {
    pub const fn new(interval: Duration) -> Self {
        Self {
            last_seen: None,
            interval,
        }
    }
}

impl ValueChangeSource for PollingSource {
    // Notifications carry no extra information; the next diff sees the change
    fn notify(&mut self) {}

    fn take_change(&mut self, current: &str) -> Option<String> {
        if self.last_seen.as_deref() == Some(current) {
            return None;
        }
        self.last_seen = Some(current.to_owned());
        Some(current.to_owned())
    }

    fn poll_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared state behind a [`FakeField`], inspectable after the field is
    /// handed to a controller
    #[derive(Debug, Default)]
    pub(crate) struct FieldState {
        pub value:        String,
        pub dispatches:   usize,
        pub widget_value: Option<String>,
        pub has_widget:   bool,
    }

    #[derive(Debug, Clone)]
    pub(crate) struct FakeField {
        key:       String,
        pub state: Rc<RefCell<FieldState>>,
        widget:    FakeWidget,
    }

    #[derive(Debug, Clone)]
    struct FakeWidget(Rc<RefCell<FieldState>>);

    impl ExternalWidget for FakeWidget {
        fn set_value(&mut self, value: &str) {
            self.0.borrow_mut().widget_value = Some(value.to_owned());
        }
    }

    impl FakeField {
        pub fn new(key: &str, value: &str) -> Self {
            let state = Rc::new(RefCell::new(FieldState {
                value: value.to_owned(),
                ..FieldState::default()
            }));
            Self {
                key: key.to_owned(),
                widget: FakeWidget(Rc::clone(&state)),
                state,
            }
        }

        pub fn with_widget(self) -> Self {
            self.state.borrow_mut().has_widget = true;
            self
        }

        pub fn value_now(&self) -> String {
            self.state.borrow().value.clone()
        }

        pub fn type_value(&self, value: &str) {
            self.state.borrow_mut().value = value.to_owned();
        }
    }

    impl DateField for FakeField {
        fn key(&self) -> &str {
            &self.key
        }

        fn value(&self) -> String {
            self.state.borrow().value.clone()
        }

        fn set_value(&mut self, value: &str) {
            self.state.borrow_mut().value = value.to_owned();
        }

        fn dispatch_change(&mut self) {
            self.state.borrow_mut().dispatches += 1;
        }

        fn external_widget(&mut self) -> Option<&mut dyn ExternalWidget> {
            if !self.state.borrow().has_widget {
                return None;
            }
            let widget: &mut dyn ExternalWidget = &mut self.widget;
            Some(widget)
        }
    }

    #[test]
    fn test_default_sink_writes_and_dispatches() {
        let mut field = FakeField::new("start", "");
        DefaultSink.apply(&mut field, "03/22/2026");
        let state = field.state.borrow();
        assert_eq!(state.value, "03/22/2026");
        assert_eq!(state.dispatches, 1);
        assert_eq!(state.widget_value, None);
    }

    #[test]
    fn test_default_sink_drives_external_widget() {
        let mut field = FakeField::new("start", "").with_widget();
        DefaultSink.apply(&mut field, "03/22/2026");
        let state = field.state.borrow();
        assert_eq!(state.value, "03/22/2026");
        assert_eq!(state.widget_value.as_deref(), Some("03/22/2026"));
    }

    #[test]
    fn test_push_source_reports_each_notification_once() {
        let mut source = PushSource::default();
        assert_eq!(source.take_change("a"), None);
        source.notify();
        assert_eq!(source.take_change("a").as_deref(), Some("a"));
        assert_eq!(source.take_change("a"), None);
        assert_eq!(source.poll_interval(), None);
    }

    #[test]
    fn test_polling_source_diffs_last_seen() {
        let mut source = PollingSource::new(Duration::from_millis(250));
        assert_eq!(source.take_change("a").as_deref(), Some("a"));
        assert_eq!(source.take_change("a"), None);
        source.notify();
        assert_eq!(source.take_change("a"), None);
        assert_eq!(source.take_change("b").as_deref(), Some("b"));
        assert_eq!(source.poll_interval(), Some(Duration::from_millis(250)));
    }
}
