//! TOML capability-profile loading.
//!
//! A profile file describes every physical port of a platform; it is parsed
//! once at startup into the immutable [`CapabilityTable`] the registry is
//! built around.
//!
//! ```toml
//! [[port]]
//! type = "hdmi"
//! index = 0
//! name = "HDMI0"
//! default_resolution = "1080p60"
//! hdcp_protocols = ["1.x", "2.x"]
//! color_spaces = ["rgb", "ycbcr444"]
//! color_depths = ["8bit", "10bit"]
//! hdr_standards = ["sdr", "hdr10"]
//! tv_resolutions = ["720p", "1080p60"]
//!
//! [[port.resolution]]
//! name = "1080p60"
//! pixel_resolution = "1920x1080"
//! aspect_ratio = "16x9"
//! frame_rate = "60"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::capability::{CapabilityTable, HdcpCapability, PortCapability};
use crate::types::{
    ColorDepth, ColorSpace, HdcpProtocol, HdrStandard, MatrixCoefficients, PortType,
    QuantizationRange, ResolutionSpec, SurroundMode, TvResolutions,
};

/// Errors from loading or validating a capability profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),

    /// The profile parsed but is not internally consistent.
    #[error("invalid profile: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(rename = "port")]
    ports: Vec<PortEntry>,
}

#[derive(Debug, Deserialize)]
struct PortEntry {
    #[serde(rename = "type")]
    port_type: PortType,
    index: u32,
    name: String,
    #[serde(rename = "resolution")]
    resolutions: Vec<ResolutionSpec>,
    default_resolution: String,
    #[serde(default)]
    hdcp_protocols: Vec<HdcpProtocol>,
    #[serde(default)]
    color_spaces: Vec<ColorSpace>,
    #[serde(default)]
    color_depths: Vec<ColorDepth>,
    #[serde(default)]
    hdr_standards: Vec<HdrStandard>,
    #[serde(default)]
    tv_resolutions: Vec<String>,
    #[serde(default)]
    display_surround: bool,
    #[serde(default = "default_surround_mode")]
    surround_mode: SurroundMode,
    #[serde(default = "default_quantization")]
    quantization_range: QuantizationRange,
    #[serde(default = "default_matrix")]
    matrix_coefficients: MatrixCoefficients,
    #[serde(default)]
    dtcp_supported: bool,
}

fn default_surround_mode() -> SurroundMode {
    SurroundMode::None
}

fn default_quantization() -> QuantizationRange {
    QuantizationRange::Unknown
}

fn default_matrix() -> MatrixCoefficients {
    MatrixCoefficients::Unknown
}

impl PortEntry {
    fn into_capability(self) -> Result<PortCapability, ProfileError> {
        let mut tv_resolutions = TvResolutions::empty();
        for name in &self.tv_resolutions {
            let bit = TvResolutions::parse_name(name).ok_or_else(|| {
                ProfileError::Invalid(format!("unknown tv resolution '{}' for {}", name, self.name))
            })?;
            tv_resolutions |= bit;
        }

        let hdcp = if self.hdcp_protocols.is_empty() {
            HdcpCapability::None
        } else {
            HdcpCapability::Supported {
                protocols: self.hdcp_protocols,
            }
        };

        Ok(PortCapability {
            port_type: self.port_type,
            index: self.index,
            name: self.name,
            supported_resolutions: self.resolutions,
            default_resolution: self.default_resolution,
            color_spaces: self.color_spaces,
            color_depths: self.color_depths,
            hdr_standards: self.hdr_standards,
            tv_resolutions,
            hdcp,
            display_surround: self.display_surround,
            surround_mode: self.surround_mode,
            quantization_range: self.quantization_range,
            matrix_coefficients: self.matrix_coefficients,
            dtcp_supported: self.dtcp_supported,
        })
    }
}

/// Parse a capability table from TOML text.
pub fn parse_profile(text: &str) -> Result<CapabilityTable, ProfileError> {
    let file: ProfileFile = toml::from_str(text)?;
    let ports = file
        .ports
        .into_iter()
        .map(PortEntry::into_capability)
        .collect::<Result<Vec<_>, _>>()?;
    CapabilityTable::new(ports).map_err(ProfileError::Invalid)
}

/// Load a capability table from a TOML profile file.
pub fn load_profile(path: impl AsRef<Path>) -> Result<CapabilityTable, ProfileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let table = parse_profile(&text)?;
    info!(path = %path.display(), ports = table.len(), "capability profile loaded");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[port]]
        type = "hdmi"
        index = 0
        name = "HDMI0"
        default_resolution = "1080p60"
        hdcp_protocols = ["1.x", "2.x"]
        color_spaces = ["rgb", "ycbcr444"]
        color_depths = ["8bit", "10bit", "auto"]
        hdr_standards = ["sdr", "hdr10", "hlg"]
        tv_resolutions = ["720p", "1080p60", "2160p60"]
        display_surround = true
        surround_mode = "dolby-digital"
        quantization_range = "limited"
        matrix_coefficients = "bt709"

        [[port.resolution]]
        name = "720p"
        pixel_resolution = "1280x720"
        aspect_ratio = "16x9"
        frame_rate = "60"

        [[port.resolution]]
        name = "1080p60"
        pixel_resolution = "1920x1080"
        aspect_ratio = "16x9"
        frame_rate = "60"

        [[port]]
        type = "internal"
        index = 0
        name = "PANEL"
        default_resolution = "2160p60"
        hdcp_protocols = ["2.x"]
        color_spaces = ["rgb"]
        color_depths = ["10bit"]
        hdr_standards = ["sdr", "hdr10"]

        [[port.resolution]]
        name = "2160p60"
        pixel_resolution = "3840x2160"
        aspect_ratio = "16x9"
        frame_rate = "60"
    "#;

    #[test]
    fn sample_profile_parses() {
        let table = parse_profile(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);

        let hdmi = &table.ports()[0];
        assert_eq!(hdmi.port_type, PortType::Hdmi);
        assert_eq!(hdmi.supported_resolutions.len(), 2);
        assert!(hdmi.hdcp.supports(HdcpProtocol::Hdcp1x));
        assert!(hdmi.tv_resolutions.contains(TvResolutions::R2160P60));
        assert_eq!(hdmi.quantization_range, QuantizationRange::Limited);

        let panel = &table.ports()[1];
        assert_eq!(panel.port_type, PortType::Internal);
        // Omitted fields take their defaults.
        assert!(!panel.display_surround);
        assert_eq!(panel.matrix_coefficients, MatrixCoefficients::Unknown);
    }

    #[test]
    fn missing_hdcp_protocols_means_unsupported() {
        let text = SAMPLE.replace("hdcp_protocols = [\"1.x\", \"2.x\"]", "");
        let table = parse_profile(&text).unwrap();
        assert!(!table.ports()[0].hdcp.is_supported());
    }

    #[test]
    fn default_resolution_must_be_supported() {
        let text = SAMPLE.replace("default_resolution = \"1080p60\"", "default_resolution = \"8k\"");
        assert!(matches!(parse_profile(&text), Err(ProfileError::Invalid(_))));
    }

    #[test]
    fn unknown_tv_resolution_rejected() {
        let text = SAMPLE.replace("\"2160p60\"]", "\"9000p\"]");
        assert!(matches!(parse_profile(&text), Err(ProfileError::Invalid(_) | ProfileError::Parse(_))));
    }

    #[test]
    fn garbage_toml_rejected() {
        assert!(matches!(parse_profile("[[port"), Err(ProfileError::Parse(_))));
    }
}
