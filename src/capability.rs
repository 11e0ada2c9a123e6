//! Immutable platform capability tables.
//!
//! A [`CapabilityTable`] is supplied once, before `init()`, and describes
//! what every physical port can do: the resolutions it can drive, the color
//! formats it supports, and whether (and at which protocol versions) HDCP is
//! available. The runtime core treats it as read-only.

use crate::types::{
    AspectRatio, ColorDepth, ColorDepthCapabilities, ColorSpace, FrameRate, HdcpProtocol,
    HdrCapabilities, HdrStandard, MatrixCoefficients, PixelResolution, PortRole, PortType,
    QuantizationRange, ResolutionSpec, StereoMode, SurroundMode, TvResolutions,
};

/// HDCP capability of a physical port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HdcpCapability {
    /// The port has no content protection engine at all.
    None,
    /// The port supports the listed protocol versions.
    Supported {
        /// Supported protocol versions, e.g. both 1.x and 2.x.
        protocols: Vec<HdcpProtocol>,
    },
}

impl HdcpCapability {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported { .. })
    }

    pub fn supports(&self, protocol: HdcpProtocol) -> bool {
        match self {
            Self::None => false,
            Self::Supported { protocols } => protocols.contains(&protocol),
        }
    }

    /// The platform's maximum supported protocol version, if any.
    pub fn max_protocol(&self) -> Option<HdcpProtocol> {
        match self {
            Self::None => None,
            Self::Supported { protocols } => protocols.iter().copied().max(),
        }
    }
}

/// Immutable description of one physical port.
#[derive(Debug, Clone)]
pub struct PortCapability {
    pub port_type: PortType,
    pub index: u32,
    /// Human-readable port name, e.g. "HDMI0".
    pub name: String,
    /// Ordered set of resolutions the port can drive.
    pub supported_resolutions: Vec<ResolutionSpec>,
    /// Name of the resolution the port comes up in; must be a member of
    /// `supported_resolutions`.
    pub default_resolution: String,
    pub color_spaces: Vec<ColorSpace>,
    pub color_depths: Vec<ColorDepth>,
    pub hdr_standards: Vec<HdrStandard>,
    /// TV timing capability word reported by the connected display path.
    pub tv_resolutions: TvResolutions,
    pub hdcp: HdcpCapability,
    pub display_surround: bool,
    pub surround_mode: SurroundMode,
    pub quantization_range: QuantizationRange,
    pub matrix_coefficients: MatrixCoefficients,
    /// DTCP support flag carried through from the platform profile.
    pub dtcp_supported: bool,
}

impl PortCapability {
    pub fn role(&self) -> PortRole {
        self.port_type.role()
    }

    /// Boundary projection of the supported HDR standards.
    pub fn hdr_capabilities(&self) -> HdrCapabilities {
        HdrCapabilities::from_standards(&self.hdr_standards)
    }

    /// Boundary projection of the supported color depths.
    pub fn color_depth_capabilities(&self) -> ColorDepthCapabilities {
        ColorDepthCapabilities::from_depths(&self.color_depths)
    }

    /// Look up a supported resolution by name.
    pub fn find_resolution(&self, name: &str) -> Option<&ResolutionSpec> {
        self.supported_resolutions.iter().find(|r| r.name == name)
    }

    /// The resolution the port comes up in.
    pub fn default_resolution_spec(&self) -> Option<&ResolutionSpec> {
        self.find_resolution(&self.default_resolution)
    }
}

/// The full platform table: one entry per physical port.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    ports: Vec<PortCapability>,
}

impl CapabilityTable {
    /// Build a table from entries, checking the little internal consistency
    /// the core relies on: unique `(type, index)` pairs and a default
    /// resolution that is a member of the supported set.
    pub fn new(ports: Vec<PortCapability>) -> Result<Self, String> {
        for (i, port) in ports.iter().enumerate() {
            if port.supported_resolutions.is_empty() {
                return Err(format!("port {} has no supported resolutions", port.name));
            }
            if port.default_resolution_spec().is_none() {
                return Err(format!(
                    "port {} default resolution '{}' is not in its supported set",
                    port.name, port.default_resolution
                ));
            }
            if ports[..i]
                .iter()
                .any(|p| p.port_type == port.port_type && p.index == port.index)
            {
                return Err(format!(
                    "duplicate port entry {} index {}",
                    port.port_type, port.index
                ));
            }
        }
        Ok(Self { ports })
    }

    pub fn ports(&self) -> &[PortCapability] {
        &self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Resolve a `(type, index)` pair to its table slot.
    pub fn position(&self, port_type: PortType, index: u32) -> Option<usize> {
        self.ports
            .iter()
            .position(|p| p.port_type == port_type && p.index == index)
    }

    /// Built-in default profile: one HDMI source port and one internal
    /// panel sink, mirroring a typical set-top reference configuration.
    pub fn default_profile() -> Self {
        use AspectRatio::{FourByThree, SixteenByNine};

        let hdmi_resolutions = vec![
            res("480p", PixelResolution::R720x480, FourByThree, FrameRate::F60, false),
            res("720p", PixelResolution::R1280x720, SixteenByNine, FrameRate::F60, false),
            res("1080i", PixelResolution::R1920x1080, SixteenByNine, FrameRate::F60, true),
            res("1080p60", PixelResolution::R1920x1080, SixteenByNine, FrameRate::F60, false),
            res("2160p30", PixelResolution::R3840x2160, SixteenByNine, FrameRate::F30, false),
            res("2160p60", PixelResolution::R3840x2160, SixteenByNine, FrameRate::F60, false),
        ];
        let panel_resolutions = vec![
            res("1080p60", PixelResolution::R1920x1080, SixteenByNine, FrameRate::F60, false),
            res("2160p60", PixelResolution::R3840x2160, SixteenByNine, FrameRate::F60, false),
        ];

        let hdmi = PortCapability {
            port_type: PortType::Hdmi,
            index: 0,
            name: "HDMI0".to_string(),
            supported_resolutions: hdmi_resolutions,
            default_resolution: "1080p60".to_string(),
            color_spaces: vec![ColorSpace::Rgb, ColorSpace::YCbCr444, ColorSpace::YCbCr422],
            color_depths: vec![ColorDepth::EightBit, ColorDepth::TenBit, ColorDepth::Auto],
            hdr_standards: vec![HdrStandard::Sdr, HdrStandard::Hdr10, HdrStandard::Hlg],
            tv_resolutions: TvResolutions::R480P
                | TvResolutions::R720P
                | TvResolutions::R1080I
                | TvResolutions::R1080P60
                | TvResolutions::R2160P30
                | TvResolutions::R2160P60,
            hdcp: HdcpCapability::Supported {
                protocols: vec![HdcpProtocol::Hdcp1x, HdcpProtocol::Hdcp2x],
            },
            display_surround: true,
            surround_mode: SurroundMode::DolbyDigital,
            quantization_range: QuantizationRange::Limited,
            matrix_coefficients: MatrixCoefficients::Bt709,
            dtcp_supported: false,
        };

        let panel = PortCapability {
            port_type: PortType::Internal,
            index: 0,
            name: "INTERNAL0".to_string(),
            supported_resolutions: panel_resolutions,
            default_resolution: "2160p60".to_string(),
            color_spaces: vec![ColorSpace::Rgb],
            color_depths: vec![ColorDepth::TenBit],
            hdr_standards: vec![HdrStandard::Sdr, HdrStandard::Hdr10, HdrStandard::DolbyVision],
            tv_resolutions: TvResolutions::R1080P60 | TvResolutions::R2160P60,
            hdcp: HdcpCapability::Supported {
                protocols: vec![HdcpProtocol::Hdcp2x],
            },
            display_surround: false,
            surround_mode: SurroundMode::None,
            quantization_range: QuantizationRange::Full,
            matrix_coefficients: MatrixCoefficients::Bt2020Ncl,
            dtcp_supported: false,
        };

        // The built-in entries are internally consistent.
        Self {
            ports: vec![hdmi, panel],
        }
    }
}

fn res(
    name: &str,
    pixel_resolution: PixelResolution,
    aspect_ratio: AspectRatio,
    frame_rate: FrameRate,
    interlaced: bool,
) -> ResolutionSpec {
    ResolutionSpec {
        name: name.to_string(),
        pixel_resolution,
        aspect_ratio,
        stereo_mode: StereoMode::Mono,
        frame_rate,
        interlaced,
    }
}
