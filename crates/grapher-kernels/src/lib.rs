//! Fixed-point surface kernels: graph configuration, the periodic kernel,
//! the four surfaces and the animation step.
//!
//! Every kernel exists twice: a native evaluator over [`grapher_fixed::Fx`]
//! and an emitter producing the command list that computes the same value
//! in game. The two are kept in lockstep by the cross-check tests.
#![forbid(unsafe_code)]

pub mod animate;
pub mod config;
pub mod params;
pub mod periodic;
pub mod registers;
pub mod surface;

pub use animate::{AnimationState, emit_animate, emit_init_velocity, emit_reset};
pub use config::GraphConfig;
pub use params::{ConfigError, Envelope, GraphParams, MAX_MARKERS};
pub use periodic::{calc_sine, emit_calc_sine};
pub use registers::Registers;
pub use surface::{Height, Surface};
