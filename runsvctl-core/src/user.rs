use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Numeric identifiers of a service account, for callers that `chown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OwnerIds {
    pub uid: u32,
    pub gid: u32,
}

pub trait UserDatabase: Send + Sync {
    /// `Ok(None)` when the account does not exist.
    fn lookup(&self, username: &str) -> Result<Option<OwnerIds>>;
}

/// The host's passwd database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUserDatabase;

impl UserDatabase for SystemUserDatabase {
    fn lookup(&self, username: &str) -> Result<Option<OwnerIds>> {
        let user = nix::unistd::User::from_name(username)?;
        Ok(user.map(|u| OwnerIds {
            uid: u.uid.as_raw(),
            gid: u.gid.as_raw(),
        }))
    }
}

impl UserDatabase for HashMap<String, OwnerIds> {
    fn lookup(&self, username: &str) -> Result<Option<OwnerIds>> {
        Ok(self.get(username).copied())
    }
}

#[derive(Clone)]
pub struct UserValidator {
    database: Arc<dyn UserDatabase>,
}

impl Default for UserValidator {
    fn default() -> Self {
        Self::new(Arc::new(SystemUserDatabase))
    }
}

impl UserValidator {
    pub fn new(database: Arc<dyn UserDatabase>) -> Self {
        Self { database }
    }

    pub fn ensure_user_exists(&self, username: &str) -> Result<()> {
        self.resolve_owner_ids(username).map(|_| ())
    }

    /// A failing lookup is reported the same way as a missing account.
    pub fn resolve_owner_ids(&self, username: &str) -> Result<OwnerIds> {
        if username.is_empty() {
            return Err(Error::UserNotFound(username.to_string()));
        }

        match self.database.lookup(username) {
            Ok(Some(ids)) => {
                debug!(user = username, uid = ids.uid, gid = ids.gid, "Resolved user");
                Ok(ids)
            }
            Ok(None) => Err(Error::UserNotFound(username.to_string())),
            Err(e) => {
                warn!(user = username, error = %e, "User lookup failed");
                Err(Error::UserNotFound(username.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UserValidator {
        let mut users = HashMap::new();
        users.insert("homebridge".to_string(), OwnerIds { uid: 1001, gid: 1002 });
        UserValidator::new(Arc::new(users))
    }

    #[test]
    fn test_resolve_known_user() {
        assert_eq!(
            validator().resolve_owner_ids("homebridge").unwrap(),
            OwnerIds { uid: 1001, gid: 1002 }
        );
        assert!(validator().ensure_user_exists("homebridge").is_ok());
    }

    #[test]
    fn test_unknown_user() {
        let err = validator().ensure_user_exists("ghost").unwrap_err();
        assert!(matches!(err, Error::UserNotFound(name) if name == "ghost"));
    }

    #[test]
    fn test_empty_user() {
        assert!(matches!(
            validator().ensure_user_exists(""),
            Err(Error::UserNotFound(_))
        ));
    }

    #[test]
    fn test_failing_lookup_is_user_not_found() {
        struct Broken;
        impl UserDatabase for Broken {
            fn lookup(&self, _: &str) -> Result<Option<OwnerIds>> {
                Err(Error::Unix(nix::errno::Errno::EIO))
            }
        }

        let validator = UserValidator::new(Arc::new(Broken));
        assert!(matches!(
            validator.resolve_owner_ids("anyone"),
            Err(Error::UserNotFound(_))
        ));
    }

    #[test]
    fn test_system_database_knows_root() {
        let ids = UserValidator::default().resolve_owner_ids("root").unwrap();
        assert_eq!(ids.uid, 0);
    }
}
