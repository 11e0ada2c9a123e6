//! Core type definitions for video output ports.
//!
//! Enum discriminants and bitmask values mirror the platform wire contract,
//! so capability words handed to/from firmware blobs keep their meaning.
//! Internally the crate works with typed sets; the [`bitflags`] types here
//! are the OR-ed boundary projection.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Whether a port drives an external display or terminates in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    /// Drives an external display; negotiates format and HDCP with it.
    Source,
    /// Terminates in a physical display (internal panel); reports rather
    /// than requests format.
    Sink,
}

/// Physical video port types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortType {
    /// RF modulator (channel 3/4) output.
    Rf,
    /// Baseband (composite, RCA) output.
    Baseband,
    /// S-Video output.
    SVideo,
    /// IEEE 1394 (FireWire) output.
    Ieee1394,
    /// DVI (Panel-Link, HDCP) output.
    Dvi,
    /// Component output.
    Component,
    /// HDMI output.
    Hdmi,
    /// HDMI input.
    HdmiInput,
    /// Internal (integrated panel) output.
    Internal,
}

impl PortType {
    /// Role split: internal panels are sinks, everything else is a source.
    pub fn role(&self) -> PortRole {
        match self {
            Self::Internal => PortRole::Sink,
            _ => PortRole::Source,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rf" => Some(Self::Rf),
            "baseband" | "bb" | "composite" => Some(Self::Baseband),
            "svideo" | "s-video" => Some(Self::SVideo),
            "1394" | "firewire" => Some(Self::Ieee1394),
            "dvi" => Some(Self::Dvi),
            "component" => Some(Self::Component),
            "hdmi" => Some(Self::Hdmi),
            "hdmi-input" | "hdmi-in" => Some(Self::HdmiInput),
            "internal" | "panel" => Some(Self::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rf => write!(f, "RF"),
            Self::Baseband => write!(f, "Baseband"),
            Self::SVideo => write!(f, "S-Video"),
            Self::Ieee1394 => write!(f, "IEEE 1394"),
            Self::Dvi => write!(f, "DVI"),
            Self::Component => write!(f, "Component"),
            Self::Hdmi => write!(f, "HDMI"),
            Self::HdmiInput => write!(f, "HDMI Input"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

/// Standard pixel resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelResolution {
    #[serde(rename = "720x480")]
    R720x480,
    #[serde(rename = "720x576")]
    R720x576,
    #[serde(rename = "1280x720")]
    R1280x720,
    #[serde(rename = "1366x768")]
    R1366x768,
    #[serde(rename = "1920x1080")]
    R1920x1080,
    #[serde(rename = "3840x2160")]
    R3840x2160,
    #[serde(rename = "4096x2160")]
    R4096x2160,
}

impl PixelResolution {
    /// True for the UHD resolutions gated by force-disable-4K.
    pub fn is_4k(&self) -> bool {
        matches!(self, Self::R3840x2160 | Self::R4096x2160)
    }
}

impl fmt::Display for PixelResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::R720x480 => "720x480",
            Self::R720x576 => "720x576",
            Self::R1280x720 => "1280x720",
            Self::R1366x768 => "1366x768",
            Self::R1920x1080 => "1920x1080",
            Self::R3840x2160 => "3840x2160",
            Self::R4096x2160 => "4096x2160",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "4x3")]
    FourByThree,
    #[serde(rename = "16x9")]
    SixteenByNine,
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FourByThree => write!(f, "4:3"),
            Self::SixteenByNine => write!(f, "16:9"),
        }
    }
}

/// Stereoscopic (3D) modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StereoMode {
    Unknown,
    #[serde(rename = "2d")]
    Mono,
    SideBySide,
    TopAndBottom,
}

/// Output frame rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameRate {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "24")]
    F24,
    #[serde(rename = "25")]
    F25,
    #[serde(rename = "30")]
    F30,
    #[serde(rename = "60")]
    F60,
    #[serde(rename = "23.98")]
    F23_98,
    #[serde(rename = "29.97")]
    F29_97,
    #[serde(rename = "50")]
    F50,
    #[serde(rename = "59.94")]
    F59_94,
}

/// A fully specified output resolution request or commitment.
///
/// Mirrors the platform's resolution descriptor: a short display name plus
/// the typed fields the negotiation gate compares memberwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSpec {
    /// Display name, e.g. "1080p60".
    pub name: String,
    pub pixel_resolution: PixelResolution,
    pub aspect_ratio: AspectRatio,
    #[serde(default = "StereoMode::default_mono")]
    pub stereo_mode: StereoMode,
    pub frame_rate: FrameRate,
    /// Scan mode: `true` if interlaced, `false` if progressive.
    #[serde(default)]
    pub interlaced: bool,
}

impl StereoMode {
    fn default_mono() -> Self {
        Self::Mono
    }
}

impl fmt::Display for ResolutionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// HDR/EOTF standards. Bit values match the platform capability word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HdrStandard {
    /// No video format decoded.
    None,
    Hdr10,
    Hlg,
    DolbyVision,
    TechnicolorPrime,
    Hdr10Plus,
    Sdr,
}

impl HdrStandard {
    /// Capability-word bit for this standard (0 for `None`).
    pub fn bit(&self) -> u32 {
        match self {
            Self::None => 0x00,
            Self::Hdr10 => 0x01,
            Self::Hlg => 0x02,
            Self::DolbyVision => 0x04,
            Self::TechnicolorPrime => 0x08,
            Self::Hdr10Plus => 0x10,
            Self::Sdr => 0x20,
        }
    }

    /// True for the standards that light up an HDR output.
    pub fn is_hdr(&self) -> bool {
        !matches!(self, Self::None | Self::Sdr)
    }
}

impl fmt::Display for HdrStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::Hdr10 => "HDR10",
            Self::Hlg => "HLG",
            Self::DolbyVision => "Dolby Vision",
            Self::TechnicolorPrime => "Technicolor Prime",
            Self::Hdr10Plus => "HDR10+",
            Self::Sdr => "SDR",
        };
        write!(f, "{}", s)
    }
}

bitflags! {
    /// OR-ed HDR capability word as exposed at the platform boundary.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HdrCapabilities: u32 {
        const HDR10 = 0x01;
        const HLG = 0x02;
        const DOLBY_VISION = 0x04;
        const TECHNICOLOR_PRIME = 0x08;
        const HDR10_PLUS = 0x10;
        const SDR = 0x20;
    }
}

impl HdrCapabilities {
    /// Build the capability word from an explicit set of standards.
    pub fn from_standards(standards: &[HdrStandard]) -> Self {
        standards
            .iter()
            .fold(Self::empty(), |acc, s| acc | Self::from_bits_truncate(s.bit()))
    }

    pub fn supports(&self, standard: HdrStandard) -> bool {
        standard.bit() != 0 && self.contains(Self::from_bits_truncate(standard.bit()))
    }
}

bitflags! {
    /// OR-ed TV resolution capability word (interlace-aware).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TvResolutions: u32 {
        const R480I = 0x000001;
        const R480P = 0x000002;
        const R576I = 0x000004;
        const R576P = 0x000008;
        const R576P50 = 0x000010;
        const R720P = 0x000020;
        const R720P50 = 0x000040;
        const R1080I = 0x000080;
        const R1080P = 0x000100;
        const R1080P24 = 0x000200;
        const R1080I25 = 0x000400;
        const R1080P25 = 0x000800;
        const R1080P30 = 0x001000;
        const R1080I50 = 0x002000;
        const R1080P50 = 0x004000;
        const R1080P60 = 0x008000;
        const R2160P24 = 0x010000;
        const R2160P25 = 0x020000;
        const R2160P30 = 0x040000;
        const R2160P50 = 0x080000;
        const R2160P60 = 0x100000;
    }
}

impl TvResolutions {
    /// Parse a single profile entry ("1080p60", "480i", ...).
    ///
    /// Not the bitflags-generated `from_name`, which matches flag
    /// identifiers like "R1080P60" rather than profile spellings.
    pub fn parse_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "480i" => Some(Self::R480I),
            "480p" => Some(Self::R480P),
            "576i" => Some(Self::R576I),
            "576p" => Some(Self::R576P),
            "576p50" => Some(Self::R576P50),
            "720p" => Some(Self::R720P),
            "720p50" => Some(Self::R720P50),
            "1080i" => Some(Self::R1080I),
            "1080p" => Some(Self::R1080P),
            "1080p24" => Some(Self::R1080P24),
            "1080i25" => Some(Self::R1080I25),
            "1080p25" => Some(Self::R1080P25),
            "1080p30" => Some(Self::R1080P30),
            "1080i50" => Some(Self::R1080I50),
            "1080p50" => Some(Self::R1080P50),
            "1080p60" => Some(Self::R1080P60),
            "2160p24" => Some(Self::R2160P24),
            "2160p25" => Some(Self::R2160P25),
            "2160p30" => Some(Self::R2160P30),
            "2160p50" => Some(Self::R2160P50),
            "2160p60" => Some(Self::R2160P60),
            _ => None,
        }
    }

    /// The subset representing 4K timings, masked off by force-disable-4K.
    pub fn uhd() -> Self {
        Self::R2160P24 | Self::R2160P25 | Self::R2160P30 | Self::R2160P50 | Self::R2160P60
    }
}

/// Display color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSpace {
    Unknown,
    Rgb,
    #[serde(rename = "ycbcr422")]
    YCbCr422,
    #[serde(rename = "ycbcr444")]
    YCbCr444,
    #[serde(rename = "ycbcr420")]
    YCbCr420,
    Auto,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "Unknown",
            Self::Rgb => "RGB",
            Self::YCbCr422 => "YCbCr 4:2:2",
            Self::YCbCr444 => "YCbCr 4:4:4",
            Self::YCbCr420 => "YCbCr 4:2:0",
            Self::Auto => "Auto",
        };
        write!(f, "{}", s)
    }
}

/// Display color depths. Bit values match the platform capability word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorDepth {
    Unknown,
    #[serde(rename = "8bit")]
    EightBit,
    #[serde(rename = "10bit")]
    TenBit,
    #[serde(rename = "12bit")]
    TwelveBit,
    Auto,
}

impl ColorDepth {
    pub fn bit(&self) -> u32 {
        match self {
            Self::Unknown => 0x00,
            Self::EightBit => 0x01,
            Self::TenBit => 0x02,
            Self::TwelveBit => 0x04,
            Self::Auto => 0x08,
        }
    }
}

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "Unknown",
            Self::EightBit => "8-bit",
            Self::TenBit => "10-bit",
            Self::TwelveBit => "12-bit",
            Self::Auto => "Auto",
        };
        write!(f, "{}", s)
    }
}

bitflags! {
    /// OR-ed color depth capability word as exposed at the boundary.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColorDepthCapabilities: u32 {
        const EIGHT_BIT = 0x01;
        const TEN_BIT = 0x02;
        const TWELVE_BIT = 0x04;
        const AUTO = 0x08;
    }
}

impl ColorDepthCapabilities {
    pub fn from_depths(depths: &[ColorDepth]) -> Self {
        depths
            .iter()
            .fold(Self::empty(), |acc, d| acc | Self::from_bits_truncate(d.bit()))
    }

    pub fn supports(&self, depth: ColorDepth) -> bool {
        depth.bit() != 0 && self.contains(Self::from_bits_truncate(depth.bit()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuantizationRange {
    Unknown,
    Limited,
    Full,
}

impl fmt::Display for QuantizationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "Unknown",
            Self::Limited => "Limited",
            Self::Full => "Full",
        };
        write!(f, "{}", s)
    }
}

/// Color conversion matrix coefficients advertised by the display path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixCoefficients {
    Unknown,
    Bt709,
    Bt470_2Bg,
    Smpte170M,
    XvYcc709,
    XvYcc601,
    Bt2020Ncl,
    Bt2020Cl,
    DviFullRangeRgb,
    HdmiRgb,
    Fcc,
    Smpte240M,
    HdmiFullRangeYCbCr,
}

impl fmt::Display for MatrixCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "Unknown",
            Self::Bt709 => "BT.709",
            Self::Bt470_2Bg => "BT.470-2 BG",
            Self::Smpte170M => "SMPTE 170M",
            Self::XvYcc709 => "xvYCC 709",
            Self::XvYcc601 => "xvYCC 601",
            Self::Bt2020Ncl => "BT.2020 NCL",
            Self::Bt2020Cl => "BT.2020 CL",
            Self::DviFullRangeRgb => "DVI full-range RGB",
            Self::HdmiRgb => "HDMI RGB",
            Self::Fcc => "FCC",
            Self::Smpte240M => "SMPTE 240M",
            Self::HdmiFullRangeYCbCr => "HDMI full-range YCbCr",
        };
        write!(f, "{}", s)
    }
}

/// Surround audio modes reported alongside the video port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurroundMode {
    None,
    DolbyDigital,
    DolbyDigitalPlus,
}

impl fmt::Display for SurroundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::DolbyDigital => "Dolby Digital",
            Self::DolbyDigitalPlus => "Dolby Digital Plus",
        };
        write!(f, "{}", s)
    }
}

/// Background color painted behind/instead of video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundColor {
    Blue,
    Black,
    None,
}

/// HDCP content protection protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HdcpProtocol {
    /// HDCP 1.x.
    #[serde(rename = "1.x")]
    Hdcp1x,
    /// HDCP 2.x.
    #[serde(rename = "2.x")]
    Hdcp2x,
}

impl fmt::Display for HdcpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hdcp1x => write!(f, "HDCP 1.x"),
            Self::Hdcp2x => write!(f, "HDCP 2.x"),
        }
    }
}

/// HDCP authentication status for a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdcpStatus {
    /// Connected sink does not support HDCP (or nothing to power).
    Unpowered,
    /// Authentication has not been initiated.
    Unauthenticated,
    /// Authentication passed; the link is protected.
    Authenticated,
    /// Authentication or link integrity failure.
    AuthenticationFailure,
    /// Handshake in flight.
    InProgress,
    /// The owning video port is disabled.
    PortDisabled,
}

impl fmt::Display for HdcpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unpowered => "Unpowered",
            Self::Unauthenticated => "Unauthenticated",
            Self::Authenticated => "Authenticated",
            Self::AuthenticationFailure => "Authentication failure",
            Self::InProgress => "In progress",
            Self::PortDisabled => "Port disabled",
        };
        write!(f, "{}", s)
    }
}

/// Aggregate of the five per-port output accessors, returned in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub video_eotf: HdrStandard,
    pub matrix_coefficients: MatrixCoefficients,
    pub color_space: ColorSpace,
    pub color_depth: ColorDepth,
    pub quantization_range: QuantizationRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_type_roles() {
        assert_eq!(PortType::Internal.role(), PortRole::Sink);
        assert_eq!(PortType::Hdmi.role(), PortRole::Source);
        assert_eq!(PortType::Component.role(), PortRole::Source);
        assert_eq!(PortType::HdmiInput.role(), PortRole::Source);
    }

    #[test]
    fn port_type_from_str_aliases() {
        assert_eq!(PortType::from_str("HDMI"), Some(PortType::Hdmi));
        assert_eq!(PortType::from_str("panel"), Some(PortType::Internal));
        assert_eq!(PortType::from_str("composite"), Some(PortType::Baseband));
        assert_eq!(PortType::from_str("displayport"), None);
    }

    #[test]
    fn hdr_capability_word_bits() {
        let caps = HdrCapabilities::from_standards(&[
            HdrStandard::Hdr10,
            HdrStandard::Hlg,
            HdrStandard::Sdr,
        ]);
        assert_eq!(caps.bits(), 0x01 | 0x02 | 0x20);
        assert!(caps.supports(HdrStandard::Hlg));
        assert!(!caps.supports(HdrStandard::DolbyVision));
        // `None` carries no bit and is never "supported".
        assert!(!caps.supports(HdrStandard::None));
    }

    #[test]
    fn color_depth_capability_word_bits() {
        let caps = ColorDepthCapabilities::from_depths(&[
            ColorDepth::EightBit,
            ColorDepth::TenBit,
            ColorDepth::Auto,
        ]);
        assert_eq!(caps.bits(), 0x01 | 0x02 | 0x08);
        assert!(caps.supports(ColorDepth::TenBit));
        assert!(!caps.supports(ColorDepth::TwelveBit));
        assert!(!caps.supports(ColorDepth::Unknown));
    }

    #[test]
    fn tv_resolution_names() {
        assert_eq!(TvResolutions::parse_name("1080p60"), Some(TvResolutions::R1080P60));
        assert_eq!(TvResolutions::parse_name("2160p60"), Some(TvResolutions::R2160P60));
        assert_eq!(TvResolutions::parse_name("8k"), None);
        // The profile spelling and the flag identifier are different
        // namespaces; only the latter goes through the generated parser.
        assert_eq!(TvResolutions::from_name("1080p60"), None);
        assert_eq!(TvResolutions::from_name("R1080P60"), Some(TvResolutions::R1080P60));
    }

    #[test]
    fn uhd_mask_covers_2160_only() {
        let uhd = TvResolutions::uhd();
        assert!(uhd.contains(TvResolutions::R2160P24));
        assert!(uhd.contains(TvResolutions::R2160P60));
        assert!(!uhd.intersects(TvResolutions::R1080P60 | TvResolutions::R480I));
    }

    #[test]
    fn hdcp_protocol_ordering() {
        // Preference-ceiling negotiation relies on the version ordering.
        assert!(HdcpProtocol::Hdcp1x < HdcpProtocol::Hdcp2x);
    }

    #[test]
    fn hdr_standard_classification() {
        assert!(HdrStandard::Hdr10.is_hdr());
        assert!(HdrStandard::DolbyVision.is_hdr());
        assert!(!HdrStandard::Sdr.is_hdr());
        assert!(!HdrStandard::None.is_hdr());
    }
}
