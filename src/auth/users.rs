use subtle::ConstantTimeEq;

use super::Principal;
use crate::config::UserEntry;

/// Locally configured accounts checked by `POST /login`.
pub struct UserStore {
    users: Vec<UserEntry>,
}

impl UserStore {
    pub fn new(users: Vec<UserEntry>) -> Self {
        Self { users }
    }

    /// Returns the principal when both username and password match.
    ///
    /// Unknown users still go through a password comparison so both failure
    /// modes cost the same.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Principal> {
        let user = self.users.iter().find(|u| u.username == username);
        let expected = user.map(|u| u.password.as_bytes()).unwrap_or(&[]);
        let password_ok: bool = expected.ct_eq(password.as_bytes()).into();

        match user {
            Some(u) if password_ok => Some(Principal {
                username: u.username.clone(),
                role: u.role.clone(),
            }),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
