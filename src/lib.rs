//! Scroll-driven architectural walkthrough.
//!
//! The library holds everything that reacts to scroll progress and user
//! events: the camera transition rig, wall culling, accent/sun emission,
//! furniture layouts and the entrance marker, all owned by [`session::Walkthrough`].
//! Rendering and windowing live in the binary.

pub mod angles;
pub mod bindings;
pub mod camera;
pub mod config;
pub mod emission;
pub mod error;
pub mod furniture;
pub mod i18n;
pub mod marker;
pub mod model;
pub mod scene;
pub mod scroll;
pub mod session;
pub mod visibility;

pub use config::WalkthroughConfig;
pub use error::{Result, WalkthroughError};
pub use session::{FrameSummary, Walkthrough};
