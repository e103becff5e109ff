//! Domain models.
//!
//! Validated domain objects as handed out by the repositories. Wire
//! payloads (create/patch request bodies) live next to the routes that
//! accept them.

pub mod product;
pub mod user;

pub use product::{NewProduct, Product};
pub use user::{User, UserPatch};
