//! Forwarding layer around the external AD/BS conversion primitive.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::Shared;
use tracing::{debug, info, warn};

use crate::types::Calendar;
use crate::CalendarDate;

/// Substrings that mark a primitive payload as a failure
const ERROR_MARKERS: [&str; 2] = ["Error", "Invalid"];

/// Day-granularity converter supplied by the host.
///
/// Both directions take and return `YYYY-MM-DD` strings. A failure is
/// reported in-band as a payload containing "Error" or "Invalid".
pub trait ConversionPrimitive {
    fn ad_to_bs(&self, iso_ad: &str) -> String;

    fn bs_to_ad(&self, iso_bs: &str) -> String;

    /// Version string of the underlying library, if it reports one.
    fn version(&self) -> Option<String> {
        None
    }
}

/// Error type for bridge conversions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// No primitive has been installed yet.
    #[error("conversion primitive is not available")]
    Unavailable,

    /// The primitive rejected a well-formed date or answered with something
    /// that is not a date.
    #[error("conversion of {input} failed: {payload}")]
    Conversion { input: String, payload: String },
}

type Slot = Rc<RefCell<Option<Rc<dyn ConversionPrimitive>>>>;

/// Cloneable handle to the (possibly not yet loaded) conversion primitive.
///
/// All clones share one slot, so installing the primitive through the
/// [`BridgeInstaller`] makes it visible to every holder at once.
#[derive(Clone)]
pub struct ConversionBridge {
    slot:  Slot,
    ready: Shared<oneshot::Receiver<()>>,
}

/// One-shot installer paired with a pending [`ConversionBridge`].
///
/// Dropping it without installing signals that loading failed.
pub struct BridgeInstaller {
    slot:   Slot,
    signal: oneshot::Sender<()>,
}

impl ConversionBridge {
    /// A bridge whose primitive is already loaded.
    pub fn new(primitive: impl ConversionPrimitive + 'static) -> Self {
        let (bridge, installer) = Self::pending();
        installer.install(primitive);
        bridge
    }

    /// A bridge waiting for its primitive.
    pub fn pending() -> (Self, BridgeInstaller) {
        let slot: Slot = Rc::new(RefCell::new(None));
        let (signal, receiver) = oneshot::channel();
        let bridge = Self {
            slot:  Rc::clone(&slot),
            ready: receiver.shared(),
        };
        (bridge, BridgeInstaller { slot, signal })
    }

    pub fn available(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Resolves once loading has finished either way.
    ///
    /// Returns whether a primitive is available afterwards.
    pub async fn ready(&self) -> bool {
        let _ = self.ready.clone().await;
        self.available()
    }

    pub fn version(&self) -> Option<String> {
        self.primitive().and_then(|p| p.version())
    }

    /// Converts a raw AD string, screening the payload for error markers.
    ///
    /// # Errors
    /// `Unavailable` before installation, `Conversion` for error payloads.
    pub fn ad_to_bs_raw(&self, iso_ad: &str) -> Result<String, BridgeError> {
        let primitive = self.primitive().ok_or(BridgeError::Unavailable)?;
        screen(iso_ad, primitive.ad_to_bs(iso_ad))
    }

    /// Converts a raw BS string, screening the payload for error markers.
    ///
    /// # Errors
    /// `Unavailable` before installation, `Conversion` for error payloads.
    pub fn bs_to_ad_raw(&self, iso_bs: &str) -> Result<String, BridgeError> {
        let primitive = self.primitive().ok_or(BridgeError::Unavailable)?;
        screen(iso_bs, primitive.bs_to_ad(iso_bs))
    }

    /// Converts an AD date to BS.
    ///
    /// # Errors
    /// See [`Self::ad_to_bs_raw`]; a payload that is not a BS date is a
    /// `Conversion` error.
    pub fn ad_to_bs(&self, date: &CalendarDate) -> Result<CalendarDate, BridgeError> {
        self.convert(date, Calendar::Bs, Self::ad_to_bs_raw)
    }

    /// Converts a BS date to AD.
    ///
    /// # Errors
    /// See [`Self::bs_to_ad_raw`]; a payload that is not an AD date is a
    /// `Conversion` error.
    pub fn bs_to_ad(&self, date: &CalendarDate) -> Result<CalendarDate, BridgeError> {
        self.convert(date, Calendar::Ad, Self::bs_to_ad_raw)
    }

    fn convert(
        &self,
        date: &CalendarDate,
        target: Calendar,
        raw: fn(&Self, &str) -> Result<String, BridgeError>,
    ) -> Result<CalendarDate, BridgeError> {
        let input = date.to_string();
        let payload = raw(self, &input)?;
        debug!(%input, %payload, %target, "converted");
        CalendarDate::parse_iso(target, &payload).map_err(|_| BridgeError::Conversion {
            input,
            payload,
        })
    }

    /// Clones the primitive out so no borrow is held across the call
    fn primitive(&self) -> Option<Rc<dyn ConversionPrimitive>> {
        self.slot.borrow().clone()
    }
}

impl fmt::Debug for ConversionBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionBridge")
            .field("available", &self.available())
            .finish_non_exhaustive()
    }
}

impl BridgeInstaller {
    /// Installs the primitive and wakes everything awaiting readiness.
    pub fn install(self, primitive: impl ConversionPrimitive + 'static) {
        let primitive: Rc<dyn ConversionPrimitive> = Rc::new(primitive);
        match primitive.version() {
            Some(version) => info!(%version, "conversion primitive installed"),
            None => info!("conversion primitive installed"),
        }
        *self.slot.borrow_mut() = Some(primitive);
        // Receivers may all be gone already
        let _ = self.signal.send(());
    }
}

fn screen(input: &str, payload: String) -> Result<String, BridgeError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() || ERROR_MARKERS.iter().any(|m| trimmed.contains(m)) {
        warn!(%input, %payload, "conversion primitive reported failure");
        return Err(BridgeError::Conversion {
            input: input.to_owned(),
            payload,
        });
    }
    Ok(trimmed.to_owned())
}
