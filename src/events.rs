//! Single-slot event subscriptions.
//!
//! Two independent event classes: a process-wide video-format-change
//! subscriber and one HDCP-status subscriber per port. Each slot holds at
//! most one callback; a second registration is rejected, never silently
//! replaced. Delivery is synchronous from whichever call observed the
//! transition, and a slot's callback is moved out while it runs so a
//! re-entrant call back into the registry never sees a held borrow.

use crate::error::{PortError, Result};
use crate::registry::PortHandle;
use crate::types::{HdcpStatus, HdrStandard};

/// Process-wide video format (EOTF/HDR standard) change subscriber.
pub type VideoFormatCallback = Box<dyn FnMut(HdrStandard) + Send>;

/// Per-port HDCP status change subscriber.
pub type HdcpStatusCallback = Box<dyn FnMut(PortHandle, HdcpStatus) + Send>;

/// Dispatcher owning the subscription slots for one registry generation.
///
/// Crate-internal: slot indexes are an arena detail of `PortRegistry`, so
/// only the callback type aliases are part of the public surface.
pub(crate) struct EventNotifier {
    format_slot: Option<VideoFormatCallback>,
    hdcp_slots: Vec<Option<HdcpStatusCallback>>,
}

impl EventNotifier {
    pub fn new(port_count: usize) -> Self {
        Self {
            format_slot: None,
            hdcp_slots: (0..port_count).map(|_| None).collect(),
        }
    }

    /// Register the process-wide format-change callback.
    pub fn register_format(&mut self, cb: VideoFormatCallback) -> Result<()> {
        if self.format_slot.is_some() {
            return Err(PortError::InvalidParam(
                "a video format callback is already registered",
            ));
        }
        self.format_slot = Some(cb);
        Ok(())
    }

    /// Clear the format-change slot. Clearing an empty slot is harmless.
    pub fn unregister_format(&mut self) {
        self.format_slot = None;
    }

    /// Register the HDCP status callback for one port slot.
    pub fn register_hdcp(&mut self, slot: usize, cb: HdcpStatusCallback) -> Result<()> {
        let entry = self
            .hdcp_slots
            .get_mut(slot)
            .ok_or(PortError::InvalidParam("port slot out of range"))?;
        if entry.is_some() {
            return Err(PortError::InvalidParam(
                "an HDCP status callback is already registered for this port",
            ));
        }
        *entry = Some(cb);
        Ok(())
    }

    pub fn unregister_hdcp(&mut self, slot: usize) {
        if let Some(entry) = self.hdcp_slots.get_mut(slot) {
            *entry = None;
        }
    }

    /// Deliver a format change to the subscriber, if any.
    pub fn emit_format(&mut self, format: HdrStandard) {
        if let Some(mut cb) = self.format_slot.take() {
            cb(format);
            // A re-entrant registration wins over restoring the old slot.
            if self.format_slot.is_none() {
                self.format_slot = Some(cb);
            }
        }
    }

    /// Deliver an HDCP status change to the port's subscriber, if any.
    pub fn emit_hdcp(&mut self, slot: usize, handle: PortHandle, status: HdcpStatus) {
        let taken = self.hdcp_slots.get_mut(slot).and_then(Option::take);
        if let Some(mut cb) = taken {
            cb(handle, status);
            if let Some(entry) = self.hdcp_slots.get_mut(slot) {
                if entry.is_none() {
                    *entry = Some(cb);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn second_format_registration_rejected_first_stays_active() {
        let mut notifier = EventNotifier::new(1);
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        notifier
            .register_format(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        assert!(notifier.register_format(Box::new(|_| {})).is_err());

        notifier.emit_format(HdrStandard::Hdr10);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregister_then_reregister() {
        let mut notifier = EventNotifier::new(1);
        notifier.register_format(Box::new(|_| {})).unwrap();
        notifier.unregister_format();
        assert!(notifier.register_format(Box::new(|_| {})).is_ok());
    }

    #[test]
    fn hdcp_slots_are_per_port() {
        let mut notifier = EventNotifier::new(2);
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        notifier
            .register_hdcp(
                0,
                Box::new(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        // Second registration on the same port fails; another port is fine.
        assert!(notifier.register_hdcp(0, Box::new(|_, _| {})).is_err());
        assert!(notifier.register_hdcp(1, Box::new(|_, _| {})).is_ok());

        let handle = PortHandle::for_tests(0, 1);
        notifier.emit_hdcp(0, handle, HdcpStatus::InProgress);
        notifier.emit_hdcp(0, handle, HdcpStatus::Authenticated);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn emit_without_subscriber_is_silent() {
        let mut notifier = EventNotifier::new(1);
        notifier.emit_format(HdrStandard::Sdr);
        notifier.emit_hdcp(0, PortHandle::for_tests(0, 1), HdcpStatus::Unauthenticated);
    }

    #[test]
    fn out_of_range_slot_rejected() {
        let mut notifier = EventNotifier::new(1);
        assert_eq!(
            notifier.register_hdcp(5, Box::new(|_, _| {})),
            Err(PortError::InvalidParam("port slot out of range"))
        );
    }
}
