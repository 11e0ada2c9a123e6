//! Mutable runtime state for one physical video port.
//!
//! A `VideoPort` is created by the registry at `init()` from its capability
//! entry and lives until `term()`. Every field here is only ever mutated
//! through a registry operation that already passed the capability and role
//! gates.

use crate::capability::PortCapability;
use crate::hdcp::HdcpAuthenticator;
use crate::types::{
    BackgroundColor, ColorDepth, ColorSpace, HdrStandard, MatrixCoefficients, PortRole,
    QuantizationRange, ResolutionSpec,
};

#[derive(Debug)]
pub(crate) struct VideoPort {
    pub(crate) enabled: bool,
    /// Hotplug state. Internal panel sinks are always connected.
    pub(crate) connected: bool,
    /// For source ports: whether the connected sink reports this port as
    /// its active input. Sinks are active whenever connected.
    pub(crate) active_input: bool,
    pub(crate) resolution: ResolutionSpec,
    pub(crate) color_depth: ColorDepth,
    pub(crate) preferred_color_depth: ColorDepth,
    pub(crate) color_space: ColorSpace,
    /// Current output EOTF.
    pub(crate) eotf: HdrStandard,
    /// Forced HDR mode; `None` means follow content.
    pub(crate) forced_hdr: HdrStandard,
    pub(crate) quantization_range: QuantizationRange,
    pub(crate) matrix_coefficients: MatrixCoefficients,
    pub(crate) background_color: BackgroundColor,
    pub(crate) force_disable_4k: bool,
    pub(crate) ignore_edid: bool,
    /// HDMI Auto Low Latency Mode request state.
    pub(crate) allm: bool,
    /// Present only when the capability table marks HDCP supported.
    pub(crate) hdcp: Option<HdcpAuthenticator>,
}

impl VideoPort {
    /// Default (disabled) state derived from the port's capability entry.
    ///
    /// The default resolution is validated by `CapabilityTable::new`, so a
    /// missing entry here would be a table bug; fall back to the first
    /// supported resolution rather than panic.
    pub(crate) fn new(cap: &PortCapability) -> Self {
        let resolution = cap
            .default_resolution_spec()
            .or_else(|| cap.supported_resolutions.first())
            .cloned()
            .unwrap_or_else(|| ResolutionSpec {
                name: String::new(),
                pixel_resolution: crate::types::PixelResolution::R720x480,
                aspect_ratio: crate::types::AspectRatio::FourByThree,
                stereo_mode: crate::types::StereoMode::Unknown,
                frame_rate: crate::types::FrameRate::Unknown,
                interlaced: false,
            });

        let is_sink = cap.role() == PortRole::Sink;
        let hdcp = cap.hdcp.max_protocol().map(|max| {
            if is_sink {
                HdcpAuthenticator::fixed_sink(max)
            } else {
                HdcpAuthenticator::new(max)
            }
        });

        let eotf = if cap.hdr_standards.contains(&HdrStandard::Sdr) {
            HdrStandard::Sdr
        } else {
            HdrStandard::None
        };

        Self {
            enabled: false,
            connected: is_sink,
            active_input: false,
            resolution,
            color_depth: cap.color_depths.first().copied().unwrap_or(ColorDepth::Unknown),
            preferred_color_depth: ColorDepth::Auto,
            color_space: cap.color_spaces.first().copied().unwrap_or(ColorSpace::Unknown),
            eotf,
            forced_hdr: HdrStandard::None,
            quantization_range: cap.quantization_range,
            matrix_coefficients: cap.matrix_coefficients,
            background_color: BackgroundColor::Black,
            force_disable_4k: false,
            ignore_edid: false,
            allm: false,
            hdcp,
        }
    }

    /// Connected AND routed: sinks are active whenever connected, source
    /// ports additionally need the sink to report them as the active input.
    pub(crate) fn is_active(&self, role: PortRole) -> bool {
        match role {
            PortRole::Sink => self.connected,
            PortRole::Source => self.connected && self.active_input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTable;
    use crate::types::HdcpStatus;

    #[test]
    fn source_port_defaults() {
        let table = CapabilityTable::default_profile();
        let port = VideoPort::new(&table.ports()[0]);
        assert!(!port.enabled);
        assert!(!port.connected);
        assert_eq!(port.resolution.name, "1080p60");
        assert_eq!(port.eotf, HdrStandard::Sdr);
        let hdcp = port.hdcp.as_ref().unwrap();
        assert_eq!(hdcp.status(), HdcpStatus::PortDisabled);
    }

    #[test]
    fn sink_port_defaults() {
        let table = CapabilityTable::default_profile();
        let port = VideoPort::new(&table.ports()[1]);
        // Panel sinks are always connected and active from birth.
        assert!(port.connected);
        assert!(port.is_active(PortRole::Sink));
        assert_eq!(
            port.hdcp.as_ref().unwrap().status(),
            HdcpStatus::Authenticated
        );
    }

    #[test]
    fn source_activity_requires_routing() {
        let table = CapabilityTable::default_profile();
        let mut port = VideoPort::new(&table.ports()[0]);
        assert!(!port.is_active(PortRole::Source));
        port.connected = true;
        assert!(!port.is_active(PortRole::Source));
        port.active_input = true;
        assert!(port.is_active(PortRole::Source));
    }
}
