//! Hardware Abstraction Layer (HAL) for the serial audio bus
//!
//! This crate provides the trait-based boundary between the audio renderer
//! and the vendor I2S driver, so the renderer can be developed and tested
//! without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Caller (decoder task, capture task)
//!         ↓
//! Renderer (lifecycle + sample path)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Vendor I2S driver + DMA
//! ```
//!
//! # Modules
//!
//! - [`i2s`] - the [`I2sBus`] driver trait and its install-time types
//! - [`audio_types`] - validated newtypes (bus id, bit depth, sample rate, ADC routing)
//! - [`audio_config`] - board wiring and the fixed DMA policy
//! - [`clock_config`] - bit/master clock derivation
//! - [`mocks`] - recording mock bus (`std` feature or tests)
//!
//! # Features
//!
//! - `std`: Enable standard library support and the mock bus (for testing)
//! - `defmt`: Enable defmt::Format derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register and signal names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors; callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(feature = "std")]
extern crate std;

pub mod audio_config;
pub mod audio_types;
pub mod clock_config;
pub mod i2s;
pub mod mocks;

// Re-export the driver trait and its types
pub use i2s::{
    BusEvent, ChannelFormat, ClockOutput, CommFormat, DacChannels, DriverConfig, I2sBus,
    ModeFlags, PinConfig,
};

// Re-export newtypes
pub use audio_types::{
    AdcChannel, AdcUnit, BitDepth, BusId, OutOfRangeError, SampleRateHz, UnsupportedBitDepth,
};

pub use clock_config::{ClockPlan, ClockSource};

#[cfg(any(test, feature = "std"))]
pub use mocks::{BusCall, MockBusError, MockI2sBus};
