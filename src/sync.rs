//! Keeps bound AD fields, their BS displays and the picker in step.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bridge::{BridgeError, ConversionBridge};
use crate::config::PickerConfig;
use crate::consts::MIN_TIMER_DELAY_MS;
use crate::field::{DateField, DefaultSink, PollingSource, PushSource, ValueChangeSource, ValueSink};
use crate::format::{DateStyle, detect_style, format, is_iso_shape, try_parse};
use crate::grid::build_grid;
use crate::language::DisplayLanguage;
use crate::locale::LocaleFormat;
use crate::month::{MonthModel, ProbeError};
use crate::navigator::{CalendarNavigator, Step};
use crate::numeral::{to_ascii_digits, to_local_digits};
use crate::prelude::*;
use crate::session::{Anchor, CalendarSession, PickerView};
use crate::timer::{TimerId, TimerQueue};
use crate::types::Calendar;
use crate::{CalendarDate, ParseError};

/// Polls from host-supplied sources are clamped to this
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(MIN_TIMER_DELAY_MS);

/// Handle of a bound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
#[display(fmt = "field#{_0}")]
pub struct FieldId(u64);

/// What the BS display next to a field shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// Field empty or too short to be a date
    Empty,
    /// Waiting for the conversion primitive
    Pending,
    /// Field text is not a date
    Invalid,
    /// The primitive rejected the date
    Error(String),
    Date(CalendarDate),
}

impl DisplayState {
    /// Display text, e.g. `BS: 2082-12-08` or `बि.सं.: २०८२-१२-०८`.
    pub fn render(&self, lang: DisplayLanguage) -> String {
        let label = lang.era_label();
        match self {
            Self::Empty => format!("{label}: --"),
            Self::Pending => format!("{label}: pending"),
            Self::Invalid => format!("{label}: invalid"),
            Self::Error(payload) => format!("{label}: error ({payload})"),
            Self::Date(bs) => format!("{label}: {}", to_local_digits(&bs.to_string(), lang)),
        }
    }

    pub const fn date(&self) -> Option<&CalendarDate> {
        match self {
            Self::Date(bs) => Some(bs),
            _ => None,
        }
    }
}

/// Error type for controller operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("no field bound as {0}")]
    UnknownField(FieldId),

    #[error("no calendar session is open")]
    NoSession,

    #[error("day {day} is not in BS {year}-{month:02}")]
    DayOutOfRange { year: u16, month: u8, day: u8 },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

struct FieldBinding {
    field:   Box<dyn DateField>,
    source:  Box<dyn ValueChangeSource>,
    display: DisplayState,
    /// Last convention the field's text could be identified in
    style:   Option<DateStyle>,
    retry:   Option<TimerId>,
    retries: u32,
    poll:    Option<TimerId>,
}

impl FieldBinding {
    /// Convention for reading and writing this field: whatever `value`
    /// shows, else what the field last showed, else `fallback`.
    fn style(&mut self, value: &str, fallback: LocaleFormat) -> DateStyle {
        if let Some(style) = detect_style(value) {
            self.style = Some(style);
        }
        self.style.unwrap_or(DateStyle::Locale(fallback))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Retry(FieldId),
    Poll(FieldId),
    Rerender,
}

/// Owns every binding, the one open picker session and their timers.
///
/// The host drives it: it forwards change notifications and clicks, and
/// advances the clock with [`SyncController::advance`] so retries, polls and
/// re-renders run.
pub struct SyncController {
    config:   PickerConfig,
    bridge:   ConversionBridge,
    months:   MonthModel,
    sink:     Box<dyn ValueSink>,
    bindings: HashMap<FieldId, FieldBinding>,
    next_id:  u64,
    session:  Option<CalendarSession>,
    timers:   TimerQueue<Task>,
}

impl SyncController {
    pub fn new(config: PickerConfig, bridge: ConversionBridge) -> Self {
        if let Some(version) = bridge.version() {
            info!(%version, "conversion primitive loaded");
        }
        Self {
            config,
            months: MonthModel::new(bridge.clone()),
            bridge,
            sink: Box::new(DefaultSink),
            bindings: HashMap::new(),
            next_id: 0,
            session: None,
            timers: TimerQueue::new(),
        }
    }

    /// Replaces the [`DefaultSink`] used for reverse sync writes.
    #[must_use]
    pub fn with_sink(mut self, sink: impl ValueSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub const fn bridge(&self) -> &ConversionBridge {
        &self.bridge
    }

    pub const fn language(&self) -> DisplayLanguage {
        self.config.language
    }

    /// Switches the display language and re-renders the open picker.
    pub fn set_language(&mut self, lang: DisplayLanguage) {
        self.config.language = lang;
        self.refresh_view();
    }

    pub fn toggle_language(&mut self) -> DisplayLanguage {
        self.set_language(self.config.language.toggled());
        self.config.language
    }

    /// Binds a field, noticing changes the way the config asks for.
    ///
    /// Binding a field whose key is already bound returns the existing handle.
    pub fn bind(&mut self, field: impl DateField + 'static) -> FieldId {
        let source: Box<dyn ValueChangeSource> = match self.config.poll_interval() {
            Some(interval) => Box::new(PollingSource::new(interval)),
            None => Box::new(PushSource::default()),
        };
        self.bind_with_source(Box::new(field), source)
    }

    /// Binds a field with an explicit change source and runs an initial
    /// forward sync.
    pub fn bind_with_source(
        &mut self,
        field: Box<dyn DateField>,
        source: Box<dyn ValueChangeSource>,
    ) -> FieldId {
        if let Some(id) = self.field_id(field.key()) {
            debug!(field = %id, key = field.key(), "already bound");
            return id;
        }

        let id = FieldId(self.next_id);
        self.next_id += 1;
        let poll = source
            .poll_interval()
            .map(|interval| self.timers.schedule(interval.max(MIN_POLL_INTERVAL), Task::Poll(id)));
        debug!(field = %id, key = field.key(), polling = poll.is_some(), "bound");
        self.bindings.insert(id, FieldBinding {
            field,
            source,
            display: DisplayState::Empty,
            style: None,
            retry: None,
            retries: 0,
            poll,
        });
        self.sync_field(id, false);
        id
    }

    /// Removes a binding, cancelling its timers and closing its picker.
    pub fn unbind(&mut self, id: FieldId) -> Option<Box<dyn DateField>> {
        let binding = self.bindings.remove(&id)?;
        for timer in [binding.retry, binding.poll].into_iter().flatten() {
            self.timers.cancel(timer);
        }
        if self.session.as_ref().is_some_and(|s| s.field() == id) {
            self.close_picker();
        }
        debug!(field = %id, "unbound");
        Some(binding.field)
    }

    pub fn field_id(&self, key: &str) -> Option<FieldId> {
        self.bindings
            .iter()
            .find(|(_, b)| b.field.key() == key)
            .map(|(id, _)| *id)
    }

    pub fn display(&self, id: FieldId) -> Option<&DisplayState> {
        self.bindings.get(&id).map(|b| &b.display)
    }

    /// Display text for a field in the current language.
    pub fn rendered(&self, id: FieldId) -> Option<String> {
        self.display(id).map(|d| d.render(self.config.language))
    }

    /// The host saw the field change.
    ///
    /// # Errors
    /// `UnknownField` if `id` is not bound.
    pub fn notify_input(&mut self, id: FieldId) -> Result<(), SyncError> {
        self.bindings
            .get_mut(&id)
            .ok_or(SyncError::UnknownField(id))?
            .source
            .notify();
        self.check_field(id);
        Ok(())
    }

    /// Forward-syncs a field right away, whatever its change source says.
    ///
    /// # Errors
    /// `UnknownField` if `id` is not bound.
    pub fn sync_now(&mut self, id: FieldId) -> Result<&DisplayState, SyncError> {
        if !self.bindings.contains_key(&id) {
            return Err(SyncError::UnknownField(id));
        }
        self.sync_field(id, false);
        self.display(id).ok_or(SyncError::UnknownField(id))
    }

    /// Moves the clock forward, running retries, polls and re-renders that
    /// come due, in deadline order.
    pub fn advance(&mut self, elapsed: Duration) {
        self.resync_pending();
        let until = self.timers.now().saturating_add(elapsed);
        while let Some((_, task)) = self.timers.pop_due(until) {
            match task {
                Task::Retry(id) => {
                    if let Some(binding) = self.bindings.get_mut(&id) {
                        binding.retry = None;
                    }
                    self.sync_field(id, true);
                },
                Task::Poll(id) => {
                    let Some(binding) = self.bindings.get_mut(&id) else {
                        continue;
                    };
                    binding.poll = binding.source.poll_interval().map(|interval| {
                        self.timers
                            .schedule(interval.max(MIN_POLL_INTERVAL), Task::Poll(id))
                    });
                    self.check_field(id);
                },
                Task::Rerender => {
                    if let Some(session) = self.session.as_mut() {
                        session.rerender = None;
                    }
                    self.refresh_view();
                },
            }
        }
        self.timers.set_now(until);
    }

    /// Re-syncs bindings left pending after their retries ran out, returning
    /// how many were re-synced.
    ///
    /// Does nothing until the bridge is available. [`Self::advance`] calls it
    /// on every tick.
    pub fn resync_pending(&mut self) -> usize {
        if !self.bridge.available() {
            return 0;
        }
        let stalled: Vec<FieldId> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.display == DisplayState::Pending && b.retry.is_none())
            .map(|(id, _)| *id)
            .collect();
        for &id in &stalled {
            debug!(field = %id, "re-syncing after retries ran out");
            self.sync_field(id, false);
        }
        stalled.len()
    }

    /// Waits until the bridge has finished loading, then re-syncs stalled
    /// bindings.
    pub async fn resync_when_ready(&mut self) -> usize {
        let bridge = self.bridge.clone();
        if bridge.ready().await {
            self.resync_pending()
        } else {
            0
        }
    }

    /// Opens the picker for a field, discarding any other open session.
    ///
    /// # Errors
    /// `UnknownField` if `id` is not bound.
    pub fn open_picker(&mut self, id: FieldId, anchor: Anchor) -> Result<&CalendarSession, SyncError> {
        let shown = self
            .bindings
            .get(&id)
            .ok_or(SyncError::UnknownField(id))?
            .display
            .date()
            .copied();
        self.close_picker();

        let navigator =
            CalendarNavigator::initial(shown.as_ref(), &self.bridge, self.config.fallback_cursor());
        debug!(field = %id, year = navigator.year(), month = navigator.month().get(), "picker opened");
        self.session = Some(CalendarSession::new(id, navigator, shown, anchor));
        self.refresh_view();
        self.session.as_ref().ok_or(SyncError::NoSession)
    }

    /// Closes the open picker, returning whether one was open.
    pub fn close_picker(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        if let Some(timer) = session.rerender {
            self.timers.cancel(timer);
        }
        debug!(field = %session.field(), "picker closed");
        true
    }

    /// A click landed inside or outside the picker; outside clicks dismiss it.
    pub fn handle_click(&mut self, inside_picker: bool) -> bool {
        !inside_picker && self.close_picker()
    }

    pub const fn session(&self) -> Option<&CalendarSession> {
        self.session.as_ref()
    }

    /// Moves the picker one month.
    ///
    /// # Errors
    /// `NoSession` if no picker is open.
    pub fn navigate(&mut self, step: Step) -> Result<&PickerView, SyncError> {
        self.session.as_mut().ok_or(SyncError::NoSession)?.step(step);
        self.refresh_view();
        self.current_view()
    }

    /// Moves the picker one year.
    ///
    /// # Errors
    /// `NoSession` if no picker is open.
    pub fn navigate_year(&mut self, step: Step) -> Result<&PickerView, SyncError> {
        self.session.as_mut().ok_or(SyncError::NoSession)?.step_year(step);
        self.refresh_view();
        self.current_view()
    }

    /// Writes the AD equivalent of a day in the cursor month into the field
    /// and closes the picker.
    ///
    /// On failure the field is left untouched and the picker stays open.
    ///
    /// # Errors
    /// `NoSession`, `DayOutOfRange` for days outside the month, or the
    /// bridge's error when the day cannot be converted.
    pub fn select_day(&mut self, day: u8) -> Result<String, SyncError> {
        let session = self.session.as_ref().ok_or(SyncError::NoSession)?;
        let (id, cursor) = (session.field(), *session.navigator());
        let (year, month) = (cursor.year(), cursor.month());
        let out_of_range = SyncError::DayOutOfRange {
            year,
            month: month.get(),
            day,
        };

        if self
            .months
            .cached(year, month)
            .is_some_and(|layout| day > layout.day_count)
        {
            return Err(out_of_range);
        }
        let bs = CalendarDate::bs(year, month.get(), day).map_err(|_| out_of_range)?;

        let written = self.write_back(id, &bs)?;
        self.close_picker();
        Ok(written)
    }

    /// Writes a manually typed BS date (`YYYY-MM-DD`, either digit script)
    /// into the field as AD.
    ///
    /// # Errors
    /// `Parse` for text that is not a BS date, otherwise as for
    /// [`Self::select_day`].
    pub fn enter_bs_text(&mut self, id: FieldId, text: &str) -> Result<String, SyncError> {
        if !self.bindings.contains_key(&id) {
            return Err(SyncError::UnknownField(id));
        }
        let ascii = to_ascii_digits(text);
        let trimmed = ascii.trim();
        if !is_iso_shape(trimmed) {
            return Err(ParseError::InvalidFormat(trimmed.to_owned()).into());
        }
        let bs = CalendarDate::parse_iso(Calendar::Bs, trimmed)?;
        self.write_back(id, &bs)
    }

    fn current_view(&self) -> Result<&PickerView, SyncError> {
        self.session
            .as_ref()
            .map(CalendarSession::view)
            .ok_or(SyncError::NoSession)
    }

    /// Re-reads a field and forward-syncs it if its source reports a change.
    fn check_field(&mut self, id: FieldId) {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return;
        };
        let current = binding.field.value();
        if binding.source.take_change(&current).is_some() {
            self.sync_field(id, false);
        }
    }

    fn sync_field(&mut self, id: FieldId, is_retry: bool) {
        let fallback = self.config.resolved_format();
        let Some(binding) = self.bindings.get_mut(&id) else {
            return;
        };
        if let Some(timer) = binding.retry.take() {
            self.timers.cancel(timer);
        }
        if !is_retry {
            binding.retries = 0;
        }

        let value = binding.field.value();
        binding.source.take_change(&value);
        // ISO text parses under any slash order
        let fmt = match binding.style(&value, fallback) {
            DateStyle::Locale(fmt) => fmt,
            DateStyle::Iso => fallback,
        };

        let state = match try_parse(&value, fmt) {
            Err(ParseError::EmptyInput | ParseError::TooShort(_)) => DisplayState::Empty,
            Err(_) => DisplayState::Invalid,
            Ok(ad) => match self.bridge.ad_to_bs(&ad) {
                Ok(bs) => DisplayState::Date(bs),
                Err(BridgeError::Unavailable) => DisplayState::Pending,
                Err(BridgeError::Conversion { payload, .. }) => DisplayState::Error(payload),
            },
        };
        debug!(field = %id, %value, ?state, is_retry, "forward sync");

        if state == DisplayState::Pending {
            if binding.retries < self.config.max_retries {
                binding.retries += 1;
                binding.retry = Some(self.timers.schedule(self.config.retry_delay(), Task::Retry(id)));
            } else {
                warn!(field = %id, retries = binding.retries, "conversion primitive still unavailable; giving up");
            }
        } else {
            binding.retries = 0;
        }
        binding.display = state;
    }

    /// Converts a BS date to AD, writes it in the field's own convention and
    /// re-syncs the display.
    fn write_back(&mut self, id: FieldId, bs: &CalendarDate) -> Result<String, SyncError> {
        let ad = self
            .bridge
            .bs_to_ad(bs)
            .inspect_err(|err| warn!(field = %id, %bs, %err, "reverse conversion failed"))?;
        let fallback = self.config.resolved_format();
        let binding = self
            .bindings
            .get_mut(&id)
            .ok_or(SyncError::UnknownField(id))?;

        let current = binding.field.value();
        let style = binding.style(&current, fallback);
        let text = format(&ad, style);
        self.sink.apply(binding.field.as_mut(), &text);
        debug!(field = %id, %bs, %text, %style, "reverse sync");

        self.sync_field(id, false);
        Ok(text)
    }

    fn refresh_view(&mut self) {
        let lang = self.config.language;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(timer) = session.rerender.take() {
            self.timers.cancel(timer);
        }

        let cursor = *session.navigator();
        session.view = match self.months.month_layout(cursor.year(), cursor.month()) {
            Ok(layout) => PickerView::Grid(build_grid(&layout, session.selected_day(), lang)),
            Err(ProbeError::BridgeUnavailable) => {
                session.rerender = Some(self.timers.schedule(self.config.retry_delay(), Task::Rerender));
                PickerView::Pending
            },
            Err(err) => {
                warn!(year = cursor.year(), month = cursor.month().get(), %err, "month layout unavailable");
                PickerView::Failed(err)
            },
        };
    }
}

impl std::fmt::Debug for SyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("config", &self.config)
            .field("bridge", &self.bridge)
            .field("bindings", &self.bindings.len())
            .field("session", &self.session)
            .field("timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}
