//! Command implementations.
//!
//! Each command takes its collaborators already built and returns the text to
//! print, so the same code runs against the mock provider in tests.

pub mod check;
pub mod diff;
pub mod extract;
pub mod lookup;

pub use self::check::execute_check;
pub use self::diff::execute_diff;
pub use self::extract::execute_extract;
pub use self::lookup::execute_lookup;
