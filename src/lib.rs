//! Visual canvas editing engine for flashcard decks.
//!
//! The engine owns the interactive side of the card editor: turning raw
//! pointer and keyboard input into element mutations, keeping an in-memory
//! mirror of element geometry that re-renders immediately, and coalescing
//! the resulting writes into as few calls to the backing store as possible.
//! Rendering element content, network transport and undo/redo bookkeeping
//! belong to the host; the engine talks to them through [`engine::Action`]s
//! and the [`coalescer::Persistence`] / [`engine::History`] traits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level editor instance ([`engine::EngineCore`]) and outbound actions |
//! | [`element`] | Element records, kinds and sparse patches |
//! | [`store`] | Ordered in-memory element store |
//! | [`geometry`] | Snapping, clamping, duplication and z-index helpers |
//! | [`hit`] | Hit-testing against handles, the canvas corner and element bodies |
//! | [`input`] | Input event types and the interaction session state machine |
//! | [`coalescer`] | Debounced write-coalescing to the backing store |
//! | [`clipboard`] | Single-slot clipboard and duplication |
//! | [`layers`] | Z-order operations |
//! | [`constraints`] | Layout constraints recomputed on canvas resize |
//! | [`keyboard`] | Global hotkey dispatch |
//! | [`viewport`] | Screen to canvas coordinate conversion |
//! | [`config`] | Editor feature flags |
//! | [`error`] | Error types |
//! | [`bindings`] | WebAssembly host bindings |
//! | [`consts`] | Shared numeric constants (minimum sizes, canvas limits, timings) |

pub mod bindings;
pub mod clipboard;
pub mod coalescer;
pub mod config;
pub mod consts;
pub mod constraints;
pub mod element;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod keyboard;
pub mod layers;
pub mod store;
pub mod viewport;
