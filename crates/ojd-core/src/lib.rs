//! OJD Core - DSP primitives for the OJD overdrive
//!
//! This crate provides the building blocks the pedal's signal chain is made
//! of, designed for real-time audio processing with zero allocation in the
//! audio path.
//!
//! # Core Abstractions
//!
//! - [`Effect`] - Object-safe trait for every processing stage
//! - [`ProcessSpec`] - Sample rate / block size / channel count handed to `prepare`
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order (or first-order) IIR section, Direct Form I
//! - [`BiquadCoefficients`] - Normalized coefficient set, hot-swappable between blocks
//! - [`peaking_eq_coefficients`] - RBJ cookbook peaking EQ
//! - [`first_order_highpass_coefficients`] / [`first_order_lowpass_coefficients`] - bilinear 6 dB/oct
//!
//! ## Gain
//!
//! - [`Gain`] - Linear or dB multiplier, stepped or linearly ramped
//! - [`LinearRamp`] - Constant-rate value ramp
//!
//! ## Anti-Aliasing
//!
//! - [`Oversampled`] - Polyphase half-band IIR oversampling wrapper for static nonlinearities
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`] - Range, default and host flags for a parameter
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ojd-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use ojd_core::{Biquad, Effect, peaking_eq_coefficients};
//!
//! let mut eq = Biquad::new();
//! eq.set(&peaking_eq_coefficients(1600.0, 0.15, 4.0, 48000.0));
//!
//! let mut block = [0.0f32; 64];
//! block[0] = 1.0;
//! eq.process_block_inplace(&mut block);
//! assert!(block.iter().all(|s| s.is_finite()));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod effect;
pub mod gain;
pub mod math;
pub mod oversample;
pub mod param_info;
pub mod ramp;

pub use biquad::{
    Biquad, BiquadCoefficients, first_order_highpass_coefficients,
    first_order_lowpass_coefficients, peaking_eq_coefficients,
};
pub use effect::{Effect, ProcessSpec};
pub use gain::Gain;
pub use math::{db_to_linear, flush_denormal, linear_to_db, map_range};
pub use oversample::{
    HalfbandCoefficients, MAX_OVERSAMPLE_FACTOR, MAX_OVERSAMPLE_ORDER, Oversampled,
    design_halfband,
};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamUnit};
pub use ramp::LinearRamp;
