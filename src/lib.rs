//! WayCue is the proximity guidance core of an indoor navigation aid for
//! blind and low-vision visitors. It listens to a stream of location
//! samples, works out which nearby landmarks are worth announcing given the
//! direction the visitor is walking, and speaks short "In front: X" or "On
//! the left: Y" phrases through a serialized speech queue.
//!
//! The same building blocks also drive floor announcements, the nearest
//! landmark and restroom queries, and marker based guidance for the camera
//! (AR) mode.
//!
//! Start with [`engine::ProximityGuidanceEngine`]; everything it needs is
//! loaded from RON files by [`config`] and [`venue`].

pub mod args;
pub mod ar_guide;
pub mod audio_sink;
pub mod catalog;
pub mod component;
pub mod config;
pub mod diagnostics;
pub mod dummy_source;
pub mod engine;
pub mod error;
pub mod floor_plan;
pub mod gate;
pub mod geometry;
pub mod gui;
pub mod location;
pub mod phrase;
pub mod selector;
pub mod speech;
pub mod trace_decoder;
pub mod venue;
pub mod zone;
