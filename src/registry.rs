//! Port registry: handle lifetime, the init/term lifecycle, and the full
//! operation surface.
//!
//! [`PortRegistry`] is the explicit context object replacing the classic
//! init/term singleton: it is constructed around an immutable
//! [`CapabilityTable`], `init()` allocates one [`VideoPort`] per table entry,
//! and `term()` invalidates every handle issued since. Handles are arena
//! indexes with a generation counter, so a handle that survived a
//! `term()`/`init()` cycle fails the generation check instead of touching a
//! recycled slot.
//!
//! Every operation follows the same gate order: initialized check, handle
//! resolution, role/capability gate, then the operation body. A rejected
//! call never leaves a partial update behind.

use tracing::{debug, info, warn};

use crate::capability::{CapabilityTable, PortCapability};
use crate::error::{PortError, Result};
use crate::events::{EventNotifier, HdcpStatusCallback, VideoFormatCallback};
use crate::hdcp::AuthOutcome;
use crate::negotiate;
use crate::port::VideoPort;
use crate::types::{
    BackgroundColor, ColorDepth, ColorDepthCapabilities, ColorSpace, HdcpProtocol, HdcpStatus,
    HdrCapabilities, HdrStandard, MatrixCoefficients, OutputSettings, PortType,
    QuantizationRange, ResolutionSpec, SurroundMode, TvResolutions,
};

/// Opaque, stable identifier for one video port.
///
/// Valid from the `get_port` call that produced it until the next `term()`;
/// the generation check catches use across init/term cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortHandle {
    slot: u32,
    generation: u32,
}

impl PortHandle {
    #[cfg(test)]
    pub(crate) fn for_tests(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }
}

struct RegistryState {
    ports: Vec<VideoPort>,
    notifier: EventNotifier,
}

/// Owner of all video ports between `init()` and `term()`.
pub struct PortRegistry {
    table: CapabilityTable,
    state: Option<RegistryState>,
    /// Bumped on every successful `init()`; stale handles fail to resolve.
    generation: u32,
}

impl PortRegistry {
    /// Wrap a platform capability table. The registry starts not-ready;
    /// call [`init`](Self::init) before any port operation.
    pub fn new(table: CapabilityTable) -> Self {
        Self {
            table,
            state: None,
            generation: 0,
        }
    }

    /// Registry over the built-in default profile.
    pub fn with_default_profile() -> Self {
        Self::new(CapabilityTable::default_profile())
    }

    pub fn capability_table(&self) -> &CapabilityTable {
        &self.table
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Allocate one port per table entry, all in the default (disabled)
    /// state, and mark the registry ready.
    pub fn init(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(PortError::AlreadyInitialized);
        }
        let ports: Vec<VideoPort> = self.table.ports().iter().map(VideoPort::new).collect();
        let notifier = EventNotifier::new(ports.len());
        self.generation = self.generation.wrapping_add(1);
        info!(ports = ports.len(), generation = self.generation, "video port module initialized");
        self.state = Some(RegistryState { ports, notifier });
        Ok(())
    }

    /// Release all ports and invalidate every handle issued since `init()`.
    pub fn term(&mut self) -> Result<()> {
        if self.state.take().is_none() {
            return Err(PortError::NotInitialized);
        }
        info!("video port module terminated");
        Ok(())
    }

    /// Resolve a `(type, index)` pair to a stable handle.
    ///
    /// The index is signed to mirror the platform contract; negative values
    /// are rejected rather than wrapped.
    pub fn get_port(&self, port_type: PortType, index: i32) -> Result<PortHandle> {
        self.state.as_ref().ok_or(PortError::NotInitialized)?;
        if index < 0 {
            return Err(PortError::InvalidParam("port index out of range"));
        }
        let slot = self
            .table
            .position(port_type, index as u32)
            .ok_or(PortError::InvalidParam("no such port in the platform table"))?;
        Ok(PortHandle {
            slot: slot as u32,
            generation: self.generation,
        })
    }

    // --- Gate helpers ---

    fn state(&self) -> Result<&RegistryState> {
        self.state.as_ref().ok_or(PortError::NotInitialized)
    }

    fn state_mut(&mut self) -> Result<&mut RegistryState> {
        self.state.as_mut().ok_or(PortError::NotInitialized)
    }

    /// Initialized check plus handle validation; returns the arena slot.
    fn resolve(&self, handle: PortHandle) -> Result<usize> {
        let state = self.state()?;
        if handle.generation != self.generation {
            return Err(PortError::InvalidParam("stale handle from a previous init cycle"));
        }
        let slot = handle.slot as usize;
        if slot >= state.ports.len() {
            return Err(PortError::InvalidParam("handle does not resolve to a port"));
        }
        Ok(slot)
    }

    fn cap(&self, slot: usize) -> &PortCapability {
        &self.table.ports()[slot]
    }

    fn port(&self, handle: PortHandle) -> Result<(usize, &VideoPort)> {
        let slot = self.resolve(handle)?;
        Ok((slot, &self.state()?.ports[slot]))
    }

    // --- Port state queries ---

    pub fn is_port_enabled(&self, handle: PortHandle) -> Result<bool> {
        Ok(self.port(handle)?.1.enabled)
    }

    pub fn is_display_connected(&self, handle: PortHandle) -> Result<bool> {
        Ok(self.port(handle)?.1.connected)
    }

    pub fn is_display_surround(&self, handle: PortHandle) -> Result<bool> {
        let (slot, _) = self.port(handle)?;
        Ok(self.cap(slot).display_surround)
    }

    pub fn get_surround_mode(&self, handle: PortHandle) -> Result<SurroundMode> {
        let (slot, _) = self.port(handle)?;
        Ok(self.cap(slot).surround_mode)
    }

    pub fn is_port_active(&self, handle: PortHandle) -> Result<bool> {
        let (slot, port) = self.port(handle)?;
        Ok(port.is_active(self.cap(slot).role()))
    }

    // --- Port enable / resolution ---

    /// Enable or disable the port. Disabling forces the HDCP machine to
    /// `PortDisabled`, overriding any in-flight negotiation.
    pub fn enable_port(&mut self, handle: PortHandle, enabled: bool) -> Result<()> {
        let slot = self.resolve(handle)?;
        let state = self.state_mut()?;
        let port = &mut state.ports[slot];
        port.enabled = enabled;
        let changed = port.hdcp.as_mut().and_then(|m| m.port_power_changed(enabled));
        debug!(port = slot, enabled, "port power changed");
        if let Some(status) = changed {
            state.notifier.emit_hdcp(slot, handle, status);
        }
        Ok(())
    }

    /// Negotiate and commit a new output resolution. Source ports only;
    /// all-or-nothing on rejection.
    pub fn set_resolution(&mut self, handle: PortHandle, requested: &ResolutionSpec) -> Result<()> {
        let slot = self.resolve(handle)?;
        let cap = self.cap(slot);
        negotiate::require_source(cap, "set_resolution")?;
        if self.state()?.ports[slot].force_disable_4k && requested.pixel_resolution.is_4k() {
            return Err(PortError::OperationNotSupported {
                operation: "set_resolution",
                reason: "4K output is force-disabled on this port",
            });
        }
        let accepted = match negotiate::negotiate_resolution(cap, requested) {
            Ok(r) => r.clone(),
            Err(e) => {
                warn!(port = slot, requested = %requested, "resolution rejected");
                return Err(e);
            }
        };
        self.state_mut()?.ports[slot].resolution = accepted;
        Ok(())
    }

    pub fn get_resolution(&self, handle: PortHandle) -> Result<ResolutionSpec> {
        Ok(self.port(handle)?.1.resolution.clone())
    }

    pub fn supported_tv_resolutions(&self, handle: PortHandle) -> Result<TvResolutions> {
        let (slot, port) = self.port(handle)?;
        let mut caps = self.cap(slot).tv_resolutions;
        if port.force_disable_4k {
            caps &= !TvResolutions::uhd();
        }
        Ok(caps)
    }

    pub fn set_force_disable_4k(&mut self, handle: PortHandle, disable: bool) -> Result<()> {
        let slot = self.resolve(handle)?;
        negotiate::require_source(self.cap(slot), "set_force_disable_4k")?;
        self.state_mut()?.ports[slot].force_disable_4k = disable;
        Ok(())
    }

    pub fn get_force_disable_4k(&self, handle: PortHandle) -> Result<bool> {
        Ok(self.port(handle)?.1.force_disable_4k)
    }

    // --- Color / HDR output settings ---

    pub fn get_tv_hdr_capabilities(&self, handle: PortHandle) -> Result<HdrCapabilities> {
        let (slot, _) = self.port(handle)?;
        Ok(self.cap(slot).hdr_capabilities())
    }

    pub fn get_video_eotf(&self, handle: PortHandle) -> Result<HdrStandard> {
        Ok(self.port(handle)?.1.eotf)
    }

    pub fn get_matrix_coefficients(&self, handle: PortHandle) -> Result<MatrixCoefficients> {
        Ok(self.port(handle)?.1.matrix_coefficients)
    }

    pub fn get_color_depth(&self, handle: PortHandle) -> Result<ColorDepth> {
        Ok(self.port(handle)?.1.color_depth)
    }

    pub fn get_color_space(&self, handle: PortHandle) -> Result<ColorSpace> {
        Ok(self.port(handle)?.1.color_space)
    }

    pub fn get_quantization_range(&self, handle: PortHandle) -> Result<QuantizationRange> {
        Ok(self.port(handle)?.1.quantization_range)
    }

    /// Aggregate of the five per-port output accessors.
    pub fn get_current_output_settings(&self, handle: PortHandle) -> Result<OutputSettings> {
        let (_, port) = self.port(handle)?;
        Ok(OutputSettings {
            video_eotf: port.eotf,
            matrix_coefficients: port.matrix_coefficients,
            color_space: port.color_space,
            color_depth: port.color_depth,
            quantization_range: port.quantization_range,
        })
    }

    pub fn is_output_hdr(&self, handle: PortHandle) -> Result<bool> {
        Ok(self.port(handle)?.1.eotf.is_hdr())
    }

    pub fn color_depth_capabilities(&self, handle: PortHandle) -> Result<ColorDepthCapabilities> {
        let (slot, _) = self.port(handle)?;
        Ok(self.cap(slot).color_depth_capabilities())
    }

    /// Negotiate and commit the current output color depth.
    pub fn set_color_depth(&mut self, handle: PortHandle, depth: ColorDepth) -> Result<()> {
        let slot = self.resolve(handle)?;
        let cap = self.cap(slot);
        negotiate::require_source(cap, "set_color_depth")?;
        let accepted = negotiate::negotiate_color_depth(cap, depth)?;
        self.state_mut()?.ports[slot].color_depth = accepted;
        Ok(())
    }

    /// Store the preferred color depth; applied by the platform on the next
    /// mode set rather than immediately.
    pub fn set_preferred_color_depth(&mut self, handle: PortHandle, depth: ColorDepth) -> Result<()> {
        let slot = self.resolve(handle)?;
        let cap = self.cap(slot);
        negotiate::require_source(cap, "set_preferred_color_depth")?;
        let accepted = negotiate::negotiate_color_depth(cap, depth)?;
        self.state_mut()?.ports[slot].preferred_color_depth = accepted;
        Ok(())
    }

    pub fn get_preferred_color_depth(&self, handle: PortHandle) -> Result<ColorDepth> {
        Ok(self.port(handle)?.1.preferred_color_depth)
    }

    /// Force the output EOTF to a specific HDR standard, or clear the
    /// forced mode with `HdrStandard::None`.
    pub fn set_force_hdr_mode(&mut self, handle: PortHandle, mode: HdrStandard) -> Result<()> {
        let slot = self.resolve(handle)?;
        let cap = self.cap(slot);
        negotiate::require_source(cap, "set_force_hdr_mode")?;
        let accepted = negotiate::negotiate_hdr_mode(cap, mode)?;
        let role = cap.role();
        let state = self.state_mut()?;
        let port = &mut state.ports[slot];
        port.forced_hdr = accepted;
        let new_eotf = if accepted == HdrStandard::None {
            HdrStandard::Sdr
        } else {
            accepted
        };
        let changed = port.eotf != new_eotf;
        port.eotf = new_eotf;
        if changed && port.is_active(role) {
            state.notifier.emit_format(new_eotf);
        }
        Ok(())
    }

    /// Drop any forced HDR mode and return the output to SDR.
    pub fn reset_output_to_sdr(&mut self, handle: PortHandle) -> Result<()> {
        let slot = self.resolve(handle)?;
        let cap = self.cap(slot);
        negotiate::require_source(cap, "reset_output_to_sdr")?;
        let role = cap.role();
        let state = self.state_mut()?;
        let port = &mut state.ports[slot];
        port.forced_hdr = HdrStandard::None;
        let changed = port.eotf != HdrStandard::Sdr;
        port.eotf = HdrStandard::Sdr;
        if changed && port.is_active(role) {
            state.notifier.emit_format(HdrStandard::Sdr);
        }
        Ok(())
    }

    pub fn set_background_color(&mut self, handle: PortHandle, color: BackgroundColor) -> Result<()> {
        let slot = self.resolve(handle)?;
        negotiate::require_source(self.cap(slot), "set_background_color")?;
        self.state_mut()?.ports[slot].background_color = color;
        Ok(())
    }

    pub fn get_background_color(&self, handle: PortHandle) -> Result<BackgroundColor> {
        Ok(self.port(handle)?.1.background_color)
    }

    pub fn get_ignore_edid_status(&self, handle: PortHandle) -> Result<bool> {
        Ok(self.port(handle)?.1.ignore_edid)
    }

    // --- HDMI ALLM ---

    /// Request Auto Low Latency Mode on the HDMI link.
    pub fn set_allm_enabled(&mut self, handle: PortHandle, enabled: bool) -> Result<()> {
        let slot = self.resolve(handle)?;
        self.require_hdmi(slot, "set_allm_enabled")?;
        self.state_mut()?.ports[slot].allm = enabled;
        Ok(())
    }

    pub fn get_allm_enabled(&self, handle: PortHandle) -> Result<bool> {
        let (slot, port) = self.port(handle)?;
        self.require_hdmi(slot, "get_allm_enabled")?;
        Ok(port.allm)
    }

    fn require_hdmi(&self, slot: usize, operation: &'static str) -> Result<()> {
        if self.cap(slot).port_type == PortType::Hdmi {
            Ok(())
        } else {
            Err(PortError::OperationNotSupported {
                operation,
                reason: "ALLM is an HDMI link feature",
            })
        }
    }

    // --- HDCP ---

    /// Start (or stop) content protection on the port.
    ///
    /// Ports without HDCP capability reject this with
    /// `OperationNotSupported` and never enter the state machine.
    pub fn enable_hdcp(&mut self, handle: PortHandle, enable: bool) -> Result<()> {
        let slot = self.resolve(handle)?;
        negotiate::require_hdcp(self.cap(slot), "enable_hdcp")?;
        let state = self.state_mut()?;
        let machine = state.ports[slot]
            .hdcp
            .as_mut()
            .ok_or(PortError::InvalidParam("HDCP state missing for capable port"))?;
        if let Some(status) = machine.set_enabled(enable)? {
            state.notifier.emit_hdcp(slot, handle, status);
        }
        Ok(())
    }

    pub fn is_hdcp_enabled(&self, handle: PortHandle) -> Result<bool> {
        Ok(self.hdcp_machine(handle, "is_hdcp_enabled")?.is_enabled())
    }

    pub fn get_hdcp_status(&self, handle: PortHandle) -> Result<HdcpStatus> {
        Ok(self.hdcp_machine(handle, "get_hdcp_status")?.status())
    }

    /// The platform's maximum supported HDCP protocol.
    pub fn get_hdcp_protocol(&self, handle: PortHandle) -> Result<HdcpProtocol> {
        Ok(self.hdcp_machine(handle, "get_hdcp_protocol")?.platform_protocol())
    }

    /// The connected peer's advertised maximum protocol.
    pub fn get_hdcp_receiver_protocol(&self, handle: PortHandle) -> Result<HdcpProtocol> {
        Ok(self
            .hdcp_machine(handle, "get_hdcp_receiver_protocol")?
            .receiver_protocol())
    }

    /// The protocol negotiated in the current session; `None` outside
    /// `Authenticated`.
    pub fn get_hdcp_current_protocol(&self, handle: PortHandle) -> Result<Option<HdcpProtocol>> {
        Ok(self
            .hdcp_machine(handle, "get_hdcp_current_protocol")?
            .current_protocol())
    }

    /// Set the protocol-version negotiation ceiling. Takes effect on the
    /// next successful authentication.
    pub fn set_hdmi_preference(&mut self, handle: PortHandle, protocol: HdcpProtocol) -> Result<()> {
        let slot = self.resolve(handle)?;
        let cap = self.cap(slot);
        negotiate::require_hdcp(cap, "set_hdmi_preference")?;
        if !cap.hdcp.supports(protocol) {
            return Err(PortError::InvalidParam(
                "preferred protocol is not in the port's supported set",
            ));
        }
        let machine = self.state_mut()?.ports[slot]
            .hdcp
            .as_mut()
            .ok_or(PortError::InvalidParam("HDCP state missing for capable port"))?;
        machine.set_preference(protocol);
        Ok(())
    }

    pub fn get_hdmi_preference(&self, handle: PortHandle) -> Result<HdcpProtocol> {
        Ok(self.hdcp_machine(handle, "get_hdmi_preference")?.preference())
    }

    fn hdcp_machine(
        &self,
        handle: PortHandle,
        operation: &'static str,
    ) -> Result<&crate::hdcp::HdcpAuthenticator> {
        let (slot, port) = self.port(handle)?;
        negotiate::require_hdcp(self.cap(slot), operation)?;
        port.hdcp
            .as_ref()
            .ok_or(PortError::InvalidParam("HDCP state missing for capable port"))
    }

    // --- Event subscriptions ---

    /// Register the process-wide video format change callback. At most one
    /// subscriber; a second registration is rejected, not replaced.
    pub fn register_video_format_callback(&mut self, cb: VideoFormatCallback) -> Result<()> {
        self.state_mut()?.notifier.register_format(cb)
    }

    pub fn unregister_video_format_callback(&mut self) -> Result<()> {
        self.state_mut()?.notifier.unregister_format();
        Ok(())
    }

    /// Register the HDCP status callback for one port. At most one
    /// subscriber per port.
    pub fn register_hdcp_status_callback(
        &mut self,
        handle: PortHandle,
        cb: HdcpStatusCallback,
    ) -> Result<()> {
        let slot = self.resolve(handle)?;
        negotiate::require_hdcp(self.cap(slot), "register_hdcp_status_callback")?;
        self.state_mut()?.notifier.register_hdcp(slot, cb)
    }

    pub fn unregister_hdcp_status_callback(&mut self, handle: PortHandle) -> Result<()> {
        let slot = self.resolve(handle)?;
        self.state_mut()?.notifier.unregister_hdcp(slot);
        Ok(())
    }

    // --- External event entry points (hotplug / firmware side) ---

    /// A display was connected to the port. `hdcp_peer` is the protocol the
    /// sink advertises, or `None` if it has no HDCP engine.
    pub fn notify_display_connected(
        &mut self,
        handle: PortHandle,
        hdcp_peer: Option<HdcpProtocol>,
    ) -> Result<()> {
        let slot = self.resolve(handle)?;
        let state = self.state_mut()?;
        let port = &mut state.ports[slot];
        port.connected = true;
        let changed = port.hdcp.as_mut().and_then(|m| m.peer_connected(hdcp_peer));
        if let Some(status) = changed {
            state.notifier.emit_hdcp(slot, handle, status);
        }
        Ok(())
    }

    /// The display on the port went away.
    pub fn notify_display_disconnected(&mut self, handle: PortHandle) -> Result<()> {
        let slot = self.resolve(handle)?;
        let state = self.state_mut()?;
        let port = &mut state.ports[slot];
        port.connected = false;
        port.active_input = false;
        let changed = port.hdcp.as_mut().and_then(|m| m.peer_disconnected());
        if let Some(status) = changed {
            state.notifier.emit_hdcp(slot, handle, status);
        }
        Ok(())
    }

    /// The connected sink reported whether this port is its active input.
    pub fn notify_active_input(&mut self, handle: PortHandle, active: bool) -> Result<()> {
        let slot = self.resolve(handle)?;
        self.state_mut()?.ports[slot].active_input = active;
        Ok(())
    }

    /// External handshake completion from the platform HDCP engine.
    pub fn resolve_hdcp_authentication(
        &mut self,
        handle: PortHandle,
        outcome: AuthOutcome,
    ) -> Result<()> {
        let slot = self.resolve(handle)?;
        negotiate::require_hdcp(self.cap(slot), "resolve_hdcp_authentication")?;
        let state = self.state_mut()?;
        let machine = state.ports[slot]
            .hdcp
            .as_mut()
            .ok_or(PortError::InvalidParam("HDCP state missing for capable port"))?;
        if let Some(status) = machine.resolve(outcome)? {
            state.notifier.emit_hdcp(slot, handle, status);
        }
        Ok(())
    }

    /// Externally observed output format change (e.g. the decoder switched
    /// the stream's EOTF). Fires the process-wide callback when the port is
    /// active and the format actually changed. A forced HDR mode pins the
    /// output EOTF, so content changes are swallowed while one is set.
    pub fn notify_video_format(&mut self, handle: PortHandle, eotf: HdrStandard) -> Result<()> {
        let slot = self.resolve(handle)?;
        let role = self.cap(slot).role();
        let state = self.state_mut()?;
        let port = &mut state.ports[slot];
        if port.forced_hdr != HdrStandard::None {
            return Ok(());
        }
        let changed = port.eotf != eotf;
        port.eotf = eotf;
        if changed && port.is_active(role) {
            state.notifier.emit_format(eotf);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_registry() -> PortRegistry {
        let mut registry = PortRegistry::with_default_profile();
        registry.init().unwrap();
        registry
    }

    #[test]
    fn get_port_before_init_fails() {
        let registry = PortRegistry::with_default_profile();
        assert_eq!(
            registry.get_port(PortType::Hdmi, 0),
            Err(PortError::NotInitialized)
        );
    }

    #[test]
    fn get_port_is_stable() {
        let registry = ready_registry();
        let a = registry.get_port(PortType::Hdmi, 0).unwrap();
        let b = registry.get_port(PortType::Hdmi, 0).unwrap();
        assert_eq!(a, b);
        let panel = registry.get_port(PortType::Internal, 0).unwrap();
        assert_ne!(a, panel);
    }

    #[test]
    fn negative_index_rejected() {
        let registry = ready_registry();
        assert_eq!(
            registry.get_port(PortType::Hdmi, -1),
            Err(PortError::InvalidParam("port index out of range"))
        );
    }

    #[test]
    fn unknown_port_rejected() {
        let registry = ready_registry();
        assert!(registry.get_port(PortType::Component, 0).is_err());
        assert!(registry.get_port(PortType::Hdmi, 3).is_err());
    }

    #[test]
    fn stale_handle_dies_across_cycles() {
        let mut registry = ready_registry();
        let handle = registry.get_port(PortType::Hdmi, 0).unwrap();
        registry.term().unwrap();
        assert_eq!(registry.is_port_enabled(handle), Err(PortError::NotInitialized));

        registry.init().unwrap();
        // Same slot exists again, but the generation moved on.
        assert!(matches!(
            registry.is_port_enabled(handle),
            Err(PortError::InvalidParam(_))
        ));
        let fresh = registry.get_port(PortType::Hdmi, 0).unwrap();
        assert!(registry.is_port_enabled(fresh).is_ok());
    }

    #[test]
    fn double_init_and_double_term() {
        let mut registry = PortRegistry::with_default_profile();
        registry.init().unwrap();
        assert_eq!(registry.init(), Err(PortError::AlreadyInitialized));
        registry.term().unwrap();
        assert_eq!(registry.term(), Err(PortError::NotInitialized));
    }

    #[test]
    fn resolution_round_trip_and_rejection() {
        let mut registry = ready_registry();
        let handle = registry.get_port(PortType::Hdmi, 0).unwrap();
        let before = registry.get_resolution(handle).unwrap();

        let supported = registry.capability_table().ports()[0].supported_resolutions[1].clone();
        registry.set_resolution(handle, &supported).unwrap();
        assert_eq!(registry.get_resolution(handle).unwrap(), supported);

        // A near-miss must be rejected without touching committed state.
        let mut bogus = before.clone();
        bogus.name = "900p".to_string();
        assert!(registry.set_resolution(handle, &bogus).is_err());
        assert_eq!(registry.get_resolution(handle).unwrap(), supported);
    }

    #[test]
    fn sink_rejects_set_calls() {
        let mut registry = ready_registry();
        let panel = registry.get_port(PortType::Internal, 0).unwrap();
        let spec = registry.capability_table().ports()[1].supported_resolutions[0].clone();
        assert!(matches!(
            registry.set_resolution(panel, &spec),
            Err(PortError::OperationNotSupported { .. })
        ));
        assert!(matches!(
            registry.set_force_hdr_mode(panel, HdrStandard::Hdr10),
            Err(PortError::OperationNotSupported { .. })
        ));
        // Get accessors remain meaningful for sinks.
        assert!(registry.get_resolution(panel).is_ok());
        assert!(registry.get_video_eotf(panel).is_ok());
    }

    #[test]
    fn force_disable_4k_masks_and_gates() {
        let mut registry = ready_registry();
        let handle = registry.get_port(PortType::Hdmi, 0).unwrap();
        let full = registry.supported_tv_resolutions(handle).unwrap();
        assert!(full.intersects(TvResolutions::uhd()));

        registry.set_force_disable_4k(handle, true).unwrap();
        let masked = registry.supported_tv_resolutions(handle).unwrap();
        assert!(!masked.intersects(TvResolutions::uhd()));

        let uhd = registry.capability_table().ports()[0]
            .find_resolution("2160p60")
            .unwrap()
            .clone();
        assert!(matches!(
            registry.set_resolution(handle, &uhd),
            Err(PortError::OperationNotSupported { .. })
        ));

        registry.set_force_disable_4k(handle, false).unwrap();
        assert!(registry.set_resolution(handle, &uhd).is_ok());
    }

    #[test]
    fn allm_is_hdmi_only() {
        let mut registry = ready_registry();
        let hdmi = registry.get_port(PortType::Hdmi, 0).unwrap();
        let panel = registry.get_port(PortType::Internal, 0).unwrap();

        registry.set_allm_enabled(hdmi, true).unwrap();
        assert!(registry.get_allm_enabled(hdmi).unwrap());
        assert!(matches!(
            registry.set_allm_enabled(panel, true),
            Err(PortError::OperationNotSupported { .. })
        ));
    }

    #[test]
    fn output_settings_aggregate_matches_accessors() {
        let registry = ready_registry();
        let handle = registry.get_port(PortType::Hdmi, 0).unwrap();
        let agg = registry.get_current_output_settings(handle).unwrap();
        assert_eq!(agg.video_eotf, registry.get_video_eotf(handle).unwrap());
        assert_eq!(
            agg.matrix_coefficients,
            registry.get_matrix_coefficients(handle).unwrap()
        );
        assert_eq!(agg.color_space, registry.get_color_space(handle).unwrap());
        assert_eq!(agg.color_depth, registry.get_color_depth(handle).unwrap());
        assert_eq!(
            agg.quantization_range,
            registry.get_quantization_range(handle).unwrap()
        );
    }

    #[test]
    fn forced_hdr_fires_format_event_only_when_active() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut registry = ready_registry();
        let handle = registry.get_port(PortType::Hdmi, 0).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        registry
            .register_video_format_callback(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        // Inactive port: format changes silently.
        registry.set_force_hdr_mode(handle, HdrStandard::Hdr10).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        registry.notify_display_connected(handle, Some(HdcpProtocol::Hdcp2x)).unwrap();
        registry.notify_active_input(handle, true).unwrap();
        registry.set_force_hdr_mode(handle, HdrStandard::Hlg).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        registry.reset_output_to_sdr(handle).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(!registry.is_output_hdr(handle).unwrap());
    }
}
