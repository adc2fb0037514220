//! Client-side auth state.
//!
//! DESIGN
//! ======
//! `token` owns the raw credential, `session` owns the logged-in flag and
//! profile. Both sit on the same `Storage` so they can be reset together.

pub mod session;
pub mod token;
