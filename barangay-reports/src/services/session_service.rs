use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use validator::Validate;

use barangay_shared::errors::{AppError, AppResult, ErrorCode};
use barangay_shared::types::auth::{Identity, UserRole};

use crate::config::AdminCredentials;
use crate::models::User;
use crate::store::EntityStore;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl SignupRequest {
    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password,
        }
    }
}

/// Authenticates callers and owns the persisted "current session" pointer.
#[derive(Clone)]
pub struct SessionService {
    store: EntityStore,
    admin: AdminCredentials,
}

impl SessionService {
    pub fn new(store: EntityStore, admin: AdminCredentials) -> Self {
        Self { store, admin }
    }

    pub fn signup(&self, req: SignupRequest) -> AppResult<User> {
        let req = req.trimmed();
        req.validate()?;

        let mut users: Vec<User> = self.store.load()?;
        let wanted = req.username.to_lowercase();
        let taken = users.iter().any(|u| u.username.to_lowercase() == wanted)
            || self.admin.username.to_lowercase() == wanted;
        if taken {
            return Err(AppError::new(ErrorCode::UsernameTaken, "username already exists"));
        }

        let user = User {
            name: req.name,
            username: req.username,
            password_secret: req.password,
            role: UserRole::Resident,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        self.store.save(&users)?;

        tracing::info!(username = %user.username, "account created");
        Ok(user)
    }

    /// Case-sensitive username and password match. The built-in admin pair
    /// is checked first and is the only way to an admin identity.
    pub fn login(&self, username: &str, password: &str) -> AppResult<Identity> {
        let username = username.trim();

        let identity = if username == self.admin.username && password == self.admin.password {
            Identity::admin(self.admin.name.clone(), self.admin.username.clone())
        } else {
            let users: Vec<User> = self.store.load()?;
            let found = users
                .into_iter()
                .find(|u| u.username == username && u.password_secret == password);

            match found {
                // Admin rights come only from the built-in pair, never from a stored role.
                Some(user) => Identity::resident(user.name, user.username),
                None => {
                    counter!("barangay_logins_total", "outcome" => "rejected").increment(1);
                    tracing::warn!(username, "login rejected");
                    return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid credentials"));
                }
            }
        };

        self.store.set_session(&identity)?;
        counter!("barangay_logins_total", "outcome" => "accepted").increment(1);
        tracing::info!(username = %identity.username, role = %identity.role, "logged in");
        Ok(identity)
    }

    pub fn logout(&self) -> AppResult<()> {
        if let Some(identity) = self.store.session()? {
            tracing::info!(username = %identity.username, "logged out");
        }
        self.store.clear_session()
    }

    pub fn current(&self) -> AppResult<Option<Identity>> {
        self.store.session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barangay_shared::errors::ErrorKind;

    fn service() -> SessionService {
        SessionService::new(EntityStore::in_memory(), AdminCredentials::default())
    }

    fn signup(name: &str, username: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn signup_then_login_yields_resident() {
        let svc = service();
        for (name, username) in [("Ana Cruz", "ana"), ("Ben Reyes", "ben"), ("Cora Lim", "cora")] {
            svc.signup(signup(name, username, &format!("{username}-pw"))).unwrap();
        }

        for username in ["ana", "ben", "cora"] {
            let identity = svc.login(username, &format!("{username}-pw")).unwrap();
            assert_eq!(identity.role, UserRole::Resident);
            assert!(!identity.is_admin());
            assert_eq!(svc.current().unwrap(), Some(identity));
        }
    }

    #[test]
    fn username_collision_is_case_insensitive() {
        let svc = service();
        svc.signup(signup("Ana", "Ana", "pw")).unwrap();
        let err = svc.signup(signup("Other Ana", "aNA", "pw2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn admin_username_cannot_be_claimed() {
        let err = service().signup(signup("Fake", "Barangay_Admin", "pw")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UsernameTaken);
    }

    #[test]
    fn empty_fields_fail_validation() {
        let svc = service();
        for req in [signup("", "u", "p"), signup("n", "  ", "p"), signup("n", "u", "")] {
            assert_eq!(svc.signup(req).unwrap_err().kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn login_is_case_sensitive() {
        let svc = service();
        svc.signup(signup("Ana", "ana", "Secret")).unwrap();
        assert_eq!(svc.login("ANA", "Secret").unwrap_err().kind(), ErrorKind::Authentication);
        assert_eq!(svc.login("ana", "secret").unwrap_err().kind(), ErrorKind::Authentication);
        assert_eq!(svc.current().unwrap(), None);
    }

    #[test]
    fn builtin_admin_logs_in_without_user_record() {
        let svc = service();
        let identity = svc.login("barangay_admin", "barangay123").unwrap();
        assert!(identity.is_admin());
        assert_eq!(identity.role, UserRole::Admin);
        assert_eq!(identity.name, "Barangay Admin");
    }

    #[test]
    fn logout_clears_session() {
        let svc = service();
        svc.login("barangay_admin", "barangay123").unwrap();
        svc.logout().unwrap();
        assert_eq!(svc.current().unwrap(), None);
    }
}
