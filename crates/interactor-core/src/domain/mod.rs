//! Domain types shared by the query, permission and proposal layers.

pub mod account;
pub mod error;
pub mod role;

pub use account::ManagedAccount;
pub use error::{QueryError, QueryResult};
pub use role::{RoleId, RoleInfo, RolePreset, RoleSet};
