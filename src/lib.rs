//! Video output port runtime core.
//!
//! Manages the lifecycle, capability negotiation, and HDCP content
//! protection state for a platform's physical video output ports, driven by
//! an immutable per-platform capability table.
//!
//! # Quick Start
//!
//! ```
//! use videoport_hal::{PortRegistry, PortType, AuthOutcome, HdcpStatus};
//!
//! let mut registry = PortRegistry::with_default_profile();
//! registry.init()?;
//!
//! let hdmi = registry.get_port(PortType::Hdmi, 0)?;
//! registry.enable_port(hdmi, true)?;
//! registry.enable_hdcp(hdmi, true)?;
//! registry.resolve_hdcp_authentication(hdmi, AuthOutcome::Success)?;
//! assert_eq!(registry.get_hdcp_status(hdmi)?, HdcpStatus::Authenticated);
//! # Ok::<(), videoport_hal::PortError>(())
//! ```

mod capability;
mod error;
mod events;
mod hdcp;
mod negotiate;
mod port;
mod profile;
mod registry;
mod types;

pub use capability::{CapabilityTable, HdcpCapability, PortCapability};
pub use error::PortError;
pub use events::{HdcpStatusCallback, VideoFormatCallback};
pub use hdcp::AuthOutcome;
pub use profile::{load_profile, parse_profile, ProfileError};
pub use registry::{PortHandle, PortRegistry};
pub use types::{
    AspectRatio, BackgroundColor, ColorDepth, ColorDepthCapabilities, ColorSpace, FrameRate,
    HdcpProtocol, HdcpStatus, HdrCapabilities, HdrStandard, MatrixCoefficients, OutputSettings,
    PixelResolution, PortRole, PortType, QuantizationRange, ResolutionSpec, StereoMode,
    SurroundMode, TvResolutions,
};
