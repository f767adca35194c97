//! Link metadata and rain-reading access.
//!
//! The store boundary of the system: a [`LinkStore`] capability is
//! constructed once by the entry point and passed by handle into the
//! components that need it. [`LinkCoordinateCache`] holds the pixel
//! coordinates of every link in the map area for the domain's lifetime;
//! [`assemble_observations`] joins the cache with time-sliced readings
//! into the flat observation list the grid builder consumes.

pub mod assemble;
pub mod cache;
pub mod error;
pub mod mongo;
pub mod store;

pub use assemble::assemble_observations;
pub use cache::{LinkCoordinate, LinkCoordinateCache};
pub use error::{Result, StoreError};
pub use mongo::MongoLinkStore;
pub use store::{FetchOutcome, LinkMeta, LinkStore, RainReading};
