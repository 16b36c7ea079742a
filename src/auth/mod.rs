//! # Auth
//!
//! The bearer-token authenticator and the external Auth Control Plane
//! client are out of scope for this crate: only the [`Claims`] shape
//! they produce is consumed here.

mod claims;

pub use claims::Claims;
