//! # Evac Core
//!
//! Watches site risk for escalation and guides a traveler out. This crate
//! reads observations and topology from `site_model`, detects entry into
//! the high risk band, plans a risk-adaptive escape route, and tracks
//! progress along it hop by hop.
//!
//! ## Core Components
//!
//! - **routing**: Adaptive edge weights, target selection, and shortest-path search
//! - **alert**: Edge-triggered state machine holding the single active plan
//! - **navigation**: The traveler's position along the active plan
//! - **engine**: Owns the sites and runs the full update cycle
//! - **events**: What each operation reports back
//!
//! ## Design Philosophy
//!
//! - **Recomputed, not cached**: Scores and bands are derived from observations on every cycle
//! - **Edge-Triggered**: Only a change into the high band raises an alert
//! - **Always a Plan**: Every alert carries a plan, even if it says there is nowhere to go

pub mod alert;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod navigation;
pub mod routing;

pub use alert::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use navigation::*;
pub use routing::*;
