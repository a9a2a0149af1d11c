//! Per-invocation wiring of session, navigator and API client

use anyhow::{Context, bail};
use llama_client::{
    ApiClient, FileStore, HistoryNavigator, KeyValueStore, Navigator, Route, RouteGuard,
    SessionStore, resources,
};
use llama_core::Config;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a command needs
#[derive(Debug)]
pub(crate) struct Shell {
    pub(crate) api: ApiClient,
    pub(crate) navigator: Arc<HistoryNavigator>,
    pub(crate) host: String,
}

impl Shell {
    /// Open the stored session positioned at `route`, without guarding it
    pub(crate) fn open(config: &Config, route: Route) -> anyhow::Result<Self> {
        let dir = config.session.resolved_storage_dir();
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(&dir));
        let session = SessionStore::new(storage, config.session.storage_key.clone());

        let navigator = Arc::new(HistoryNavigator::new(route));
        let api = ApiClient::new(
            &config.api,
            session,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        )
        .context("building HTTP client")?;

        tracing::debug!(storage = %dir.display(), route = %route, "shell opened");
        Ok(Self {
            api,
            navigator,
            host: config.api.base_url.clone(),
        })
    }

    /// Open the session and run the route guard for `route`
    pub(crate) fn enter(config: &Config, route: Route) -> anyhow::Result<Self> {
        let shell = Self::open(config, route)?;
        if RouteGuard::enter(shell.session(), shell.navigator.as_ref(), route) {
            return Ok(shell);
        }

        match shell.navigator.current() {
            Route::Login => bail!("not signed in; run `llama-admin login` first"),
            _ => bail!("your role cannot open {route}"),
        }
    }

    pub(crate) const fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Turn a request failure into the message the user sees
    ///
    /// A rejected token has already cleared the session at this point.
    pub(crate) fn failure(&self, err: &llama_client::ClientError, fallback: &str) -> anyhow::Error {
        if err.is_unauthorized() && self.navigator.current() == Route::Login {
            warn!("session rejected by the backend");
            return anyhow::anyhow!("session expired; run `llama-admin login` again");
        }
        anyhow::anyhow!(err.user_message(fallback))
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
        let response = resources::login(&self.api, email, password)
            .await
            .map_err(|err| anyhow::anyhow!(err.user_message("Login failed")))?;

        let (user, token) = response.into_session();
        let name = user.display_name();
        let role = user.role_kind();
        self.session()
            .login(user, token)
            .context("storing the session")?;
        self.navigator.navigate(Route::Dashboard);

        info!(user = %name, role = %role, "signed in");
        println!("Signed in as {name} ({role})");
        Ok(())
    }

    pub(crate) fn logout(&self) -> anyhow::Result<()> {
        self.session().logout().context("clearing the session")?;
        self.navigator.navigate(Route::Login);
        println!("Signed out");
        Ok(())
    }

    pub(crate) fn whoami(&self) {
        let state = self.session().state();
        match (&state.user, state.is_authenticated) {
            (Some(user), true) => {
                println!("{} <{}>", user.display_name(), user.email.as_deref().unwrap_or("-"));
                println!("role: {}", user.role_kind());
            }
            _ => println!("Not signed in"),
        }
    }
}
