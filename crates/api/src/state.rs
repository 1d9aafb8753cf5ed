//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::media::MediaClient;
use crate::services::payments::{PaymentClient, PaymentError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    payments: PaymentClient,
    media: MediaClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment client cannot be built from the
    /// configured credentials.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, PaymentError> {
        let payments = PaymentClient::new(&config.payments)?;
        let media = MediaClient::new(&config.media);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                media,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment processor client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Get a reference to the media hosting client.
    #[must_use]
    pub fn media(&self) -> &MediaClient {
        &self.inner.media
    }
}
