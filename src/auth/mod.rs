pub mod bearer;
pub mod handler;
pub mod jwt;
pub mod state;
pub mod users;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Authenticated caller, injected into request extensions by `require_auth`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub role: String,
}
