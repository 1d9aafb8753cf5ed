//! HTTP route handlers.
//!
//! # Route Table
//!
//! ## Auth (`/api/auth`) - auth rate limited
//! - `POST /register` - Create an account
//! - `POST /login` - Login, sets the session cookie
//! - `POST /logout` - Clear the session cookie
//! - `GET /users` - List users (admin)
//! - `DELETE /users/{id}` - Delete a user (admin)
//! - `PUT /users/{id}` - Change a user's role (admin)
//! - `PATCH /edit-profile` - Update the caller's profile
//! - `GET /user-by-email/{email}` - Look up a user by email
//!
//! ## Products (`/api/products`)
//! - `POST /create-product` - Create a product
//! - `GET /` - List with filters and pagination
//! - `GET /related/{id}` - Related products
//! - `GET /{id}` - Single product with reviews
//! - `PATCH /update-product/{id}` - Update (admin)
//! - `DELETE /{id}` - Delete (admin)
//!
//! ## Reviews (`/api/reviews`)
//! - `POST /post-review` - Post or replace a review (multipart)
//!
//! ## Orders (`/api/orders`)
//! - `POST /create-checkout-session` - Start hosted checkout
//! - `POST /confirm-payment` - Record the order after redirect
//! - `GET /{email}` - Orders for an email
//! - `GET /order/{id}` - Single order
//! - `GET /` - All orders (admin)
//! - `PATCH /update-order-status/{id}` - Change status (admin)
//! - `DELETE /delete-order/{id}` - Delete (admin)
//!
//! ## Stats (`/api/stats`)
//! - `GET /user-stats/{email}` - Shopper dashboard figures
//! - `GET /admin-stats` - Site-wide figures (admin)
//!
//! ## Contact (`/api/contact`)
//! - `POST /` - Submit the contact form
//! - `GET /` - List submissions (admin)
//!
//! ## Uploads
//! - `POST /api/uploadImage` - Upload an image (multipart)

pub mod auth;
pub mod contact;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod stats;
pub mod uploads;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::middleware::rate_limit::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Build the full API router.
///
/// The general limiter covers every `/api` route; auth routes additionally
/// carry the stricter login/registration limiter.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/reviews", review_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/stats", stats_routes())
        .nest("/api/contact", contact_routes())
        .route("/api/uploadImage", post(uploads::upload_image))
        .layer(api_rate_limiter())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users", get(auth::list_users))
        .route(
            "/users/{id}",
            put(auth::update_user_role).delete(auth::delete_user),
        )
        .route("/edit-profile", patch(auth::edit_profile))
        .route("/user-by-email/{email}", get(auth::user_by_email))
        .layer(auth_rate_limiter())
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/create-product", post(products::create_product))
        .route("/", get(products::list_products))
        .route("/related/{id}", get(products::related_products))
        .route(
            "/{id}",
            get(products::single_product).delete(products::delete_product),
        )
        .route("/update-product/{id}", patch(products::update_product))
}

fn review_routes() -> Router<AppState> {
    Router::new().route("/post-review", post(reviews::post_review))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/create-checkout-session", post(orders::create_checkout_session))
        .route("/confirm-payment", post(orders::confirm_payment))
        .route("/{email}", get(orders::orders_by_email))
        .route("/order/{id}", get(orders::order_by_id))
        .route("/", get(orders::list_orders))
        .route("/update-order-status/{id}", patch(orders::update_order_status))
        .route("/delete-order/{id}", delete(orders::delete_order))
}

fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/user-stats/{email}", get(stats::user_stats))
        .route("/admin-stats", get(stats::admin_stats))
}

fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(contact::submit_contact).get(contact::list_contacts))
}
