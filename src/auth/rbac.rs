//! Role definitions for route gating.
//!
//! Every registered account carries the `user` role; `admin` is granted
//! out of band (seed data or direct SQL).

use lazy_static::lazy_static;
use std::collections::HashMap;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// Role definition
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
}

lazy_static! {
    pub static ref ROLES: HashMap<&'static str, Role> = {
        let mut roles = HashMap::new();

        roles.insert(
            ROLE_USER,
            Role {
                name: ROLE_USER.to_string(),
                description: "Registered shopper: browse the catalog, manage a cart, place orders"
                    .to_string(),
            },
        );

        roles.insert(
            ROLE_ADMIN,
            Role {
                name: ROLE_ADMIN.to_string(),
                description: "Administrator: manage the catalog and update order statuses"
                    .to_string(),
            },
        );

        roles
    };
}

/// Returns true if the role name is one of the defined roles
pub fn is_known_role(name: &str) -> bool {
    ROLES.contains_key(name)
}
