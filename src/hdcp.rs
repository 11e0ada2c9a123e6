//! Per-port HDCP authentication state machine.
//!
//! The machine owns only protection state; it knows nothing about handles
//! or capability tables. The registry constructs one per HDCP-capable port,
//! feeds it the triggers (enable/disable, port power, peer changes, external
//! handshake results), and forwards any status change to the per-port
//! subscriber.
//!
//! Internal panel sinks are a fixed point: HDCP is an always-authenticated
//! fact of the hardware, so the machine is created pinned at `Authenticated`
//! and rejects every transition attempt.

use tracing::debug;

use crate::error::{PortError, Result};
use crate::types::{HdcpProtocol, HdcpStatus};

/// Result of an externally driven handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure,
}

/// HDCP protocol/status machine for one port.
#[derive(Debug)]
pub struct HdcpAuthenticator {
    status: HdcpStatus,
    /// Pinned always-authenticated sink; every trigger is rejected.
    sink_fixed: bool,
    /// Level set by `EnableHDCP`; cleared when the port powers down.
    enabled: bool,
    /// Platform's maximum supported protocol (from the capability table).
    platform_max: HdcpProtocol,
    /// Negotiation ceiling chosen by the caller. Applied at the next
    /// successful authentication, never retroactively.
    preferred: HdcpProtocol,
    /// Protocol advertised by the connected peer. Defaults to the platform
    /// maximum until a hotplug event supplies a real value.
    receiver: HdcpProtocol,
    /// Protocol negotiated in the current `Authenticated` session.
    current: Option<HdcpProtocol>,
}

impl HdcpAuthenticator {
    /// Machine for a source port. Ports come up disabled, so the initial
    /// status is `PortDisabled`.
    pub fn new(platform_max: HdcpProtocol) -> Self {
        Self {
            status: HdcpStatus::PortDisabled,
            sink_fixed: false,
            enabled: false,
            platform_max,
            preferred: platform_max,
            receiver: platform_max,
            current: None,
        }
    }

    /// Machine for an internal panel sink: authenticated from birth,
    /// read-only forever.
    pub fn fixed_sink(platform_max: HdcpProtocol) -> Self {
        Self {
            status: HdcpStatus::Authenticated,
            sink_fixed: true,
            enabled: true,
            platform_max,
            preferred: platform_max,
            receiver: platform_max,
            current: Some(platform_max),
        }
    }

    pub fn status(&self) -> HdcpStatus {
        self.status
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Platform's maximum supported protocol.
    pub fn platform_protocol(&self) -> HdcpProtocol {
        self.platform_max
    }

    /// Connected peer's advertised protocol.
    pub fn receiver_protocol(&self) -> HdcpProtocol {
        self.receiver
    }

    /// Protocol negotiated in the current session; `None` outside
    /// `Authenticated`.
    pub fn current_protocol(&self) -> Option<HdcpProtocol> {
        self.current
    }

    pub fn preference(&self) -> HdcpProtocol {
        self.preferred
    }

    /// Store a new negotiation ceiling. Validation against the port's
    /// supported protocol set is the registry's job.
    pub fn set_preference(&mut self, protocol: HdcpProtocol) {
        self.preferred = protocol;
    }

    /// React to the owning port being enabled or disabled.
    ///
    /// Disable overrides any in-flight negotiation; enable brings the
    /// machine to `Unauthenticated`, ready for a handshake.
    pub fn port_power_changed(&mut self, port_enabled: bool) -> Option<HdcpStatus> {
        if self.sink_fixed {
            return None;
        }
        if port_enabled {
            match self.status {
                HdcpStatus::PortDisabled => self.transition(HdcpStatus::Unauthenticated),
                _ => None,
            }
        } else {
            self.enabled = false;
            self.current = None;
            match self.status {
                HdcpStatus::PortDisabled => None,
                _ => self.transition(HdcpStatus::PortDisabled),
            }
        }
    }

    /// `EnableHDCP(true/false)`.
    pub fn set_enabled(&mut self, enable: bool) -> Result<Option<HdcpStatus>> {
        if self.sink_fixed {
            return Err(PortError::OperationNotSupported {
                operation: "enable_hdcp",
                reason: "sink port HDCP state is fixed",
            });
        }
        if self.status == HdcpStatus::PortDisabled {
            if !enable {
                // Nothing protected on a disabled port; harmless no-op.
                self.enabled = false;
                return Ok(None);
            }
            return Err(PortError::InvalidParam(
                "HDCP cannot be enabled while the port is disabled",
            ));
        }
        if enable {
            self.enabled = true;
            match self.status {
                // Level-triggered: re-asserting during a handshake is a no-op.
                HdcpStatus::InProgress => Ok(None),
                HdcpStatus::Unauthenticated
                | HdcpStatus::Authenticated
                | HdcpStatus::AuthenticationFailure => {
                    self.current = None;
                    Ok(self.transition(HdcpStatus::InProgress))
                }
                HdcpStatus::Unpowered => Err(PortError::OperationNotSupported {
                    operation: "enable_hdcp",
                    reason: "connected sink does not support HDCP",
                }),
                HdcpStatus::PortDisabled => unreachable!("handled above"),
            }
        } else {
            self.enabled = false;
            self.current = None;
            match self.status {
                HdcpStatus::Unauthenticated | HdcpStatus::Unpowered => Ok(None),
                _ => Ok(self.transition(HdcpStatus::Unauthenticated)),
            }
        }
    }

    /// External handshake completion, delivered by the platform layer.
    ///
    /// On success the session protocol is the preference ceiling clamped to
    /// what the receiver advertises.
    pub fn resolve(&mut self, outcome: AuthOutcome) -> Result<Option<HdcpStatus>> {
        if self.sink_fixed {
            return Err(PortError::OperationNotSupported {
                operation: "resolve_hdcp_authentication",
                reason: "sink port HDCP state is fixed",
            });
        }
        if self.status != HdcpStatus::InProgress {
            return Err(PortError::InvalidParam("no HDCP authentication in progress"));
        }
        match outcome {
            AuthOutcome::Success => {
                self.current = Some(self.preferred.min(self.receiver));
                Ok(self.transition(HdcpStatus::Authenticated))
            }
            AuthOutcome::Failure => {
                self.current = None;
                Ok(self.transition(HdcpStatus::AuthenticationFailure))
            }
        }
    }

    /// Peer hotplug: a new sink was connected, advertising `peer_protocol`
    /// (or no HDCP engine at all).
    pub fn peer_connected(&mut self, peer_protocol: Option<HdcpProtocol>) -> Option<HdcpStatus> {
        if self.sink_fixed || self.status == HdcpStatus::PortDisabled {
            if let Some(p) = peer_protocol {
                self.receiver = p;
            }
            return None;
        }
        match peer_protocol {
            None => {
                self.current = None;
                match self.status {
                    HdcpStatus::Unpowered => None,
                    _ => self.transition(HdcpStatus::Unpowered),
                }
            }
            Some(p) => {
                self.receiver = p;
                self.current = None;
                match self.status {
                    HdcpStatus::Unauthenticated => None,
                    _ => self.transition(HdcpStatus::Unauthenticated),
                }
            }
        }
    }

    /// Peer hotplug: the sink went away. Any session state is void.
    pub fn peer_disconnected(&mut self) -> Option<HdcpStatus> {
        if self.sink_fixed || self.status == HdcpStatus::PortDisabled {
            return None;
        }
        self.current = None;
        match self.status {
            HdcpStatus::Unauthenticated => None,
            _ => self.transition(HdcpStatus::Unauthenticated),
        }
    }

    fn transition(&mut self, to: HdcpStatus) -> Option<HdcpStatus> {
        debug!(from = %self.status, to = %to, "hdcp transition");
        self.status = to;
        Some(to)
    }
}
