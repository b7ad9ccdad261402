//! The OJD overdrive.
//!
//! A mono guitar distortion built from the primitives in [`ojd_core`]: drive
//! dependent peaking EQ around a 16× oversampled soft clipper, followed by a
//! switchable HP/LP tone stack and an output level.
//!
//! # Threads
//!
//! The pedal splits its work between two actors:
//!
//! | actor          | entry points                                          | may allocate / block |
//! |----------------|-------------------------------------------------------|----------------------|
//! | control thread | [`ParameterBridge::parameter_changed`], `prepare`     | yes                  |
//! | audio thread   | [`OjdProcessor::process`]                             | never                |
//!
//! Drive and HP/LP changes are turned into five peaking coefficient sets on
//! the control thread and published through a [`CoefficientExchange`]. The
//! audio thread picks up the newest complete set at the start of a block
//! without taking a lock; a set published mid-block is applied on the next.
//!
//! # Modules
//!
//! - [`params`] - parameter ids, descriptors, raw-value conversions, storage
//! - [`coefficients`] - the five drive-dependent peaking bands
//! - [`waveshaper`] - the clipping curve and its oversampled stage
//! - [`tone_stack`] - HP/LP split and blend
//! - [`chain`] - the fixed eleven-stage signal path
//! - [`exchange`] / [`bridge`] - control-to-audio coefficient handoff
//! - [`processor`] - host-facing wrapper

pub mod bridge;
pub mod chain;
pub mod coefficients;
pub mod error;
pub mod exchange;
pub mod params;
pub mod processor;
pub mod tone_stack;
pub mod waveshaper;

pub use bridge::ParameterBridge;
pub use chain::{PRE_WAVESHAPER_GAIN, STAGE_NAMES, SignalChain};
pub use coefficients::{DriveBands, DriveCoefficients, PeakingBand, drive_coefficients};
pub use error::{PedalError, Result};
pub use exchange::CoefficientExchange;
pub use params::{OjdParam, ParamSnapshot, ParameterSource, PedalParams};
pub use processor::{LatencyReporter, OjdProcessor};
pub use tone_stack::{ToneMode, ToneStack};
pub use waveshaper::Waveshaper;
