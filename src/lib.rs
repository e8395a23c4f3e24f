// THEORY:
// This file is the entry point for the `chroma_seek` library crate. It exposes the
// `AcquisitionLoop` and its data structures (`AcquisitionConfig`, `Target`,
// `TargetReader`, `AcquisitionSummary`) as the high-level interface. The stages the
// loop is built from live under `core_modules` and stay public so they can be used
// and tested one at a time.
//
// OS integration is optional: the `screen` feature adds an `xcap`-backed display
// source and the `input` feature adds an `enigo`-backed pointer injector. Without
// them the crate runs against `SyntheticDisplay` and the in-memory injectors.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::{AcquisitionConfig, AutoMovePolicy};
pub use core_modules::marker::TargetMarker;
pub use core_modules::target::{Target, TargetPublisher, TargetReader, target_slot};
pub use error::{AcquisitionError, CaptureError, ConfigError, InjectionError};
pub use pipeline::{AcquisitionHandle, AcquisitionLoop, AcquisitionSummary};
