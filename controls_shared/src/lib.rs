//! `controls_shared`
//!
//! Types shared between the input core, its collaborators and tests.
//!
//! Design goals:
//! - The wire record has a fixed layout and never changes size.
//! - Collaborators (collision map, transport) sit behind traits.
//! - No `unsafe`.

pub mod collision;
pub mod config;
pub mod input;
pub mod math;
pub mod net;
pub mod weapon;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::input::*;
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::weapon::*;
}
