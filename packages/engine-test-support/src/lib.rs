//! Test support for the session engine.
//!
//! Kept in its own crate so unit tests (via `ctor` in the library) and every
//! integration test binary share one subscriber setup.

pub mod logging;
