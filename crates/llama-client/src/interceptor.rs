//! Response interceptor applying the 401 policy

use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;
use crate::transport::Outcome;
use crate::Result;
use std::sync::Arc;

/// Turns transport outcomes into results, tearing the session down on 401
#[derive(Debug, Clone)]
pub struct Interceptor {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl Interceptor {
    /// Create an interceptor over `session` and `navigator`
    #[must_use]
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// Navigator this interceptor drives
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Resolve an outcome
    ///
    /// A 401 received away from the login page logs out and navigates to
    /// login. On the login page nothing changes. Either way the caller gets
    /// the unauthorized error back.
    pub fn resolve<T>(&self, outcome: Outcome<T>) -> Result<T> {
        match outcome {
            Outcome::Ok(value) => Ok(value),
            Outcome::Unauthorized(err) => {
                self.handle_unauthorized();
                Err(err)
            }
            Outcome::Error(err) => Err(err),
        }
    }

    fn handle_unauthorized(&self) {
        let current = self.navigator.current_path();
        if current == Route::Login.path() {
            tracing::debug!("401 on the login page, leaving session untouched");
            return;
        }

        tracing::warn!(from = %current, "backend rejected the session, logging out");
        if let Err(err) = self.session.logout() {
            tracing::warn!(error = %err, "could not persist logout");
        }
        self.navigator.navigate(Route::Login);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::navigation::HistoryNavigator;
    use crate::storage::MemoryStore;
    use crate::ClientError;
    use llama_core::SessionUser;
    use pretty_assertions::assert_eq;

    fn logged_in() -> SessionStore {
        let session = SessionStore::new(Arc::new(MemoryStore::new()), "auth-storage");
        session.login(SessionUser::default(), "tok").unwrap();
        session
    }

    fn unauthorized() -> Outcome<()> {
        Outcome::Unauthorized(ClientError::Unauthorized {
            message: Some("Token expirado".to_string()),
        })
    }

    #[test]
    fn test_unauthorized_off_login_logs_out_and_redirects() {
        let session = logged_in();
        let nav = Arc::new(HistoryNavigator::new(Route::Courses));
        let interceptor = Interceptor::new(session.clone(), nav.clone());

        let err = interceptor.resolve(unauthorized()).unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.backend_message(), Some("Token expirado"));
        assert!(!session.is_authenticated());
        assert_eq!(nav.current(), Route::Login);
    }

    #[test]
    fn test_unauthorized_on_login_changes_nothing() {
        let session = logged_in();
        let before = session.state();
        let nav = Arc::new(HistoryNavigator::new(Route::Login));
        let interceptor = Interceptor::new(session.clone(), nav.clone());

        let err = interceptor.resolve(unauthorized()).unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(session.state(), before);
        assert_eq!(nav.history(), vec![Route::Login]);
    }

    #[test]
    fn test_other_errors_pass_through() {
        let session = logged_in();
        let nav = Arc::new(HistoryNavigator::new(Route::Cycles));
        let interceptor = Interceptor::new(session.clone(), nav.clone());

        let outcome: Outcome<()> = Outcome::Error(ClientError::Status {
            status: 500,
            message: None,
        });
        let err = interceptor.resolve(outcome).unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(session.is_authenticated());
        assert_eq!(nav.current(), Route::Cycles);
    }
}
