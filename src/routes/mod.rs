pub mod auth;
pub mod contractors;
pub mod dashboard;
pub mod emails;
pub mod health;
pub mod me;
pub mod notifications;
pub mod offers;
pub mod search;
pub mod support;
pub mod tasks;
pub mod users;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login))
        // Protected routes
        .route("/me", get(me::get_me))
        // Users (admin only)
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Contractors
        .route(
            "/contractors",
            get(contractors::list_contractors).post(contractors::create_contractor),
        )
        .route(
            "/contractors/:id",
            get(contractors::get_contractor)
                .put(contractors::update_contractor)
                .delete(contractors::delete_contractor),
        )
        // Tasks
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/:id/toggle", post(tasks::toggle_task))
        // Offers
        .route("/offers", get(offers::list_offers).post(offers::create_offer))
        .route("/offers/calculate", post(offers::calculate_offer))
        .route(
            "/offers/:id",
            get(offers::get_offer)
                .put(offers::update_offer)
                .delete(offers::delete_offer),
        )
        .route("/offers/:id/status", post(offers::change_offer_status))
        .route("/offers/:id/send", post(offers::send_offer))
        // Emails
        .route("/emails", get(emails::list_emails).post(emails::create_email))
        .route(
            "/emails/:id",
            get(emails::get_email).delete(emails::delete_email),
        )
        .route("/emails/:id/send", post(emails::send_email))
        .route("/emails/:id/read", post(emails::mark_email_read))
        // Support tickets
        .route("/support", get(support::list_tickets).post(support::create_ticket))
        .route(
            "/support/:id",
            get(support::get_ticket)
                .put(support::update_ticket)
                .delete(support::delete_ticket),
        )
        .route("/support/:id/status", post(support::change_ticket_status))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:id/read", post(notifications::mark_read))
        // Search & analytics
        .route("/search", get(search::search_all))
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
}
