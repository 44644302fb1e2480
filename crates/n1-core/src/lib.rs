pub mod drops;
pub mod error;
pub mod events;
pub mod karma;
pub mod marketplace;
pub mod offers;
pub mod requests;
pub mod store;
pub mod threads;
pub mod users;
pub mod validation;

pub mod types;

pub use crate::error::MarketError;
pub use crate::marketplace::{Marketplace, RequestContext};
pub use crate::store::Store;
