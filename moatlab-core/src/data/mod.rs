//! Data sources: provider trait, local file store, universe lists.

pub mod local;
pub mod provider;
pub mod universe;

pub use local::LocalStore;
pub use provider::{DataError, MarketDataProvider};
pub use universe::{bare_code, qualify_a_share, Member, Universe, UniverseError};
