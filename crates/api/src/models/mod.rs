//! Domain models for the API.
//!
//! These types represent validated domain objects separate from database
//! row types. They serialize with camelCase keys, which is the wire
//! contract the storefront client expects.

pub mod contact;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use contact::ContactMessage;
pub use order::{Order, OrderItem};
pub use product::{Product, ProductAuthor, ProductWithAuthor};
pub use review::{Review, ReviewAuthor, ReviewWithAuthor};
pub use user::{Address, User, UserSummary};
