pub mod admin;
pub mod borrow;
pub mod bribe;
pub mod distribute;
pub mod gauge;
pub mod initialize;
pub mod options;
pub mod quote;
pub mod stake;
pub mod swap;
pub mod vote;

// Glob re-exports for Anchor compatibility
#[allow(ambiguous_glob_reexports)]
pub use admin::*;
pub use borrow::*;
pub use bribe::*;
pub use distribute::*;
pub use gauge::*;
pub use initialize::*;
pub use options::*;
pub use quote::*;
pub use stake::*;
pub use swap::*;
pub use vote::*;
