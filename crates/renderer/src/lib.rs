//! Audio renderer over a serial audio bus
//!
//! Two parts sit on top of the [`platform::I2sBus`] boundary:
//!
//! - the configuration and lifecycle manager ([`Renderer`],
//!   [`RendererRegistry`], [`SharedRenderer`]), which installs, clocks,
//!   starts, stops and tears down one bus per renderer;
//! - the sample path ([`Renderer::render_samples`], [`Renderer::read_raw`],
//!   [`rescale_adc16`], [`rectify_adc16`]), which moves PCM between caller
//!   buffers and the DMA ring.
//!
//! # Architecture
//!
//! ```text
//! decoder task ──render_samples──┐        ┌── read_raw ── capture task
//!                                 ↓        ↑
//!                        Renderer<B: I2sBus>
//!                    (config, state, underflow monitor)
//!                                 ↓
//!                 I2S driver: DMA ring (16 × 128 frames)
//! ```
//!
//! # Features
//!
//! - `std`: enable the platform mock bus for downstream tests
//! - `defmt`: log through defmt and derive `defmt::Format`
//! - `tracing`: log through tracing (host builds)

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
#![warn(clippy::print_stdout)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod adc;
pub mod config;
pub mod error;
pub mod format;
pub mod frames;
pub mod pack;
pub mod registry;
pub mod renderer;
pub mod retry;
pub mod sample_path;
pub mod shared;
pub mod underrun;

pub use adc::{rectify_adc16, rescale_adc16, AdcConvertError};
pub use config::{FormatPolicy, RendererConfig, RendererMode};
pub use error::{RegistryError, RendererError};
pub use format::{PcmFormat, PcmLayout, RenderPath, RenderReport};
pub use registry::RendererRegistry;
pub use renderer::{Renderer, RendererState};
pub use retry::{Exhausted, RetryPolicy};
pub use shared::{shared, SharedRenderer};
pub use underrun::{UnderflowMonitor, UnderflowState};
