//! Capability negotiation: exact-membership checks against the platform
//! table.
//!
//! Every mutating format call routes through one of these gates before any
//! state is committed. There is no closest-fit fallback: a request either
//! names an exact member of the port's capability set or it is rejected and
//! the port keeps its prior settings.

use crate::capability::PortCapability;
use crate::error::{PortError, Result};
use crate::types::{ColorDepth, HdrStandard, PortRole, ResolutionSpec};

/// Validate a requested resolution against the port's supported set.
///
/// All typed fields must match a table member exactly, name included.
pub fn negotiate_resolution<'a>(
    cap: &'a PortCapability,
    requested: &ResolutionSpec,
) -> Result<&'a ResolutionSpec> {
    cap.supported_resolutions
        .iter()
        .find(|r| *r == requested)
        .ok_or(PortError::InvalidParam(
            "resolution is not in the port's supported set",
        ))
}

/// Validate a requested color depth against the port's supported set.
///
/// `Unknown` is never a valid request.
pub fn negotiate_color_depth(cap: &PortCapability, requested: ColorDepth) -> Result<ColorDepth> {
    if requested == ColorDepth::Unknown {
        return Err(PortError::InvalidParam("color depth must be concrete or Auto"));
    }
    if cap.color_depths.contains(&requested) {
        Ok(requested)
    } else {
        Err(PortError::InvalidParam(
            "color depth is not in the port's supported set",
        ))
    }
}

/// Validate a forced HDR mode against the port's supported standards.
///
/// `HdrStandard::None` always passes; it clears the forced mode rather than
/// requesting one.
pub fn negotiate_hdr_mode(cap: &PortCapability, requested: HdrStandard) -> Result<HdrStandard> {
    if requested == HdrStandard::None || cap.hdr_standards.contains(&requested) {
        Ok(requested)
    } else {
        Err(PortError::InvalidParam(
            "HDR standard is not in the port's supported set",
        ))
    }
}

/// Role gate: the operation only makes sense on a source port.
pub fn require_source(cap: &PortCapability, operation: &'static str) -> Result<()> {
    match cap.role() {
        PortRole::Source => Ok(()),
        PortRole::Sink => Err(PortError::OperationNotSupported {
            operation,
            reason: "sink ports report format, they do not request it",
        }),
    }
}

/// Capability gate: the port must have an HDCP engine at all.
pub fn require_hdcp(cap: &PortCapability, operation: &'static str) -> Result<()> {
    if cap.hdcp.is_supported() {
        Ok(())
    } else {
        Err(PortError::OperationNotSupported {
            operation,
            reason: "the platform table marks HDCP unsupported on this port",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTable;
    use crate::types::{AspectRatio, FrameRate, PixelResolution, StereoMode};

    fn hdmi_cap() -> PortCapability {
        CapabilityTable::default_profile().ports()[0].clone()
    }

    fn panel_cap() -> PortCapability {
        CapabilityTable::default_profile().ports()[1].clone()
    }

    #[test]
    fn exact_resolution_member_accepted() {
        let cap = hdmi_cap();
        let requested = cap.supported_resolutions[3].clone();
        let accepted = negotiate_resolution(&cap, &requested).unwrap();
        assert_eq!(*accepted, requested);
    }

    #[test]
    fn near_miss_resolution_rejected() {
        let cap = hdmi_cap();
        // Same name and pixel resolution, wrong frame rate: no partial match.
        let mut requested = cap.supported_resolutions[3].clone();
        requested.frame_rate = FrameRate::F50;
        assert_eq!(
            negotiate_resolution(&cap, &requested),
            Err(PortError::InvalidParam(
                "resolution is not in the port's supported set"
            ))
        );
    }

    #[test]
    fn unknown_resolution_rejected() {
        let cap = hdmi_cap();
        let requested = ResolutionSpec {
            name: "1440p".to_string(),
            pixel_resolution: PixelResolution::R1366x768,
            aspect_ratio: AspectRatio::SixteenByNine,
            stereo_mode: StereoMode::Mono,
            frame_rate: FrameRate::F60,
            interlaced: false,
        };
        assert!(negotiate_resolution(&cap, &requested).is_err());
    }

    #[test]
    fn color_depth_membership() {
        let cap = hdmi_cap();
        assert_eq!(negotiate_color_depth(&cap, ColorDepth::TenBit), Ok(ColorDepth::TenBit));
        assert!(negotiate_color_depth(&cap, ColorDepth::TwelveBit).is_err());
        assert!(negotiate_color_depth(&cap, ColorDepth::Unknown).is_err());
    }

    #[test]
    fn hdr_mode_membership_and_clear() {
        let cap = hdmi_cap();
        assert_eq!(negotiate_hdr_mode(&cap, HdrStandard::Hlg), Ok(HdrStandard::Hlg));
        assert!(negotiate_hdr_mode(&cap, HdrStandard::DolbyVision).is_err());
        // None clears the forced mode and is always accepted.
        assert_eq!(negotiate_hdr_mode(&cap, HdrStandard::None), Ok(HdrStandard::None));
    }

    #[test]
    fn role_gates() {
        let hdmi = hdmi_cap();
        let panel = panel_cap();
        assert!(require_source(&hdmi, "set_resolution").is_ok());
        assert!(matches!(
            require_source(&panel, "set_resolution"),
            Err(PortError::OperationNotSupported { .. })
        ));
    }

    #[test]
    fn hdcp_gate() {
        let mut cap = hdmi_cap();
        assert!(require_hdcp(&cap, "enable_hdcp").is_ok());
        cap.hdcp = crate::capability::HdcpCapability::None;
        assert!(matches!(
            require_hdcp(&cap, "enable_hdcp"),
            Err(PortError::OperationNotSupported { .. })
        ));
    }
}
