//! Route handlers
//!
//! - crud: generic list/get/create/update/delete over one collection
//! - resources, posts, quiz: the content types mounted under /api/data
//! - auth: OAuth login, callback, current user, org invitations
//! - health: database reachability

pub mod auth;
pub mod crud;
pub mod health;
pub mod posts;
pub mod quiz;
pub mod resources;

use axum::Router;

use crate::models::{Post, Question, Resource};
use crate::state::AppState;

/// Content routes for every collection under /api/data
pub fn data_router() -> Router<AppState> {
    Router::new()
        .merge(crud::routes::<Resource>())
        .merge(crud::routes::<Post>())
        .merge(crud::routes::<Question>())
}
