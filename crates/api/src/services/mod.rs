//! Business logic and external service clients.

pub mod auth;
pub mod media;
pub mod payments;

pub use auth::{AuthError, AuthService};
pub use media::{MediaClient, MediaError};
pub use payments::{PaymentClient, PaymentError};
