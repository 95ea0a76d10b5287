pub mod borrow;
pub mod bribe;
pub mod config;
pub mod curve;
pub mod escrow;
pub mod gauge;
pub mod rewards;
pub mod voter;

pub use borrow::*;
pub use bribe::*;
pub use config::*;
pub use curve::*;
pub use escrow::*;
pub use gauge::*;
pub use rewards::*;
pub use voter::*;
