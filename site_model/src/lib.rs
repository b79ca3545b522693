//! # Site Model
//!
//! The "ground truth" crate - site observations, the structural-risk model,
//! and the fixed topology of connections between sites.
//! This crate holds no alerting or routing state.

pub mod error;
pub mod risk;
pub mod sites;
pub mod topology;

pub use error::*;
pub use risk::*;
pub use sites::*;
pub use topology::*;
