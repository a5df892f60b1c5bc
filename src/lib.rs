//! coopbook
//!
//! Typed data layer for a small poultry farm record-keeping dashboard backed
//! by a Supabase project: coops, chicken batches, egg production, feed,
//! health events, sales, and the reports derived from them.
//!
//! There is no global session. Sign in once, keep the returned
//! [`SessionContext`], and pass it to every record call.
//!
//! ```no_run
//! use coopbook::prelude::*;
//!
//! # async fn run() -> coopbook::Result<()> {
//! let book = CoopBook::from_env()?;
//! let session = book.sign_in("farmer@example.com", "secret").await?;
//!
//! let coop = book
//!     .coops()
//!     .create(&session, &CoopDraft { name: "Kandang A".into(), capacity: 500 })
//!     .await?;
//!
//! let report = book.report(&session, ReportWindow::ThirtyDay).await?;
//! println!("{} made a profit of {}", coop.name, report.profit);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod models;
pub mod records;
pub mod report;
pub mod session;
pub mod validate;
pub mod window;

use coopbook_auth::{Auth, SignUpResponse};
use coopbook_postgrest::PostgrestClient;
use tracing::info;

use crate::config::{ClientOptions, CoopBookConfig};
use crate::models::*;
use crate::records::{Connection, Profiles, Record, Records};
use crate::report::{DashboardStats, FinancialReport};
use crate::session::{CurrentUser, SessionContext};
use crate::window::ReportWindow;

pub use crate::error::{Error, Result};

/// Entry point: the project connection plus one accessor per table
#[derive(Debug, Clone)]
pub struct CoopBook {
    config: CoopBookConfig,
    options: ClientOptions,
    conn: Connection,
    auth: Auth,
}

impl CoopBook {
    pub fn new(config: CoopBookConfig) -> Result<Self> {
        Self::new_with_options(config, ClientOptions::default())
    }

    pub fn new_with_options(config: CoopBookConfig, options: ClientOptions) -> Result<Self> {
        let http_client = options.build_http_client()?;
        let auth = Auth::new(config.base_url(), &config.anon_key, http_client.clone());
        let conn = Connection::new(&config, &options, http_client);
        Ok(Self {
            config,
            options,
            conn,
            auth,
        })
    }

    /// Configure from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(CoopBookConfig::from_env()?)
    }

    pub fn config(&self) -> &CoopBookConfig {
        &self.config
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The underlying auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Raw request builder for `table`, authorized as the session's user.
    pub fn from(&self, table: &str, session: &SessionContext) -> Result<PostgrestClient> {
        self.conn.table(table, session)
    }

    pub fn records<R: Record>(&self) -> Records<R> {
        Records::new(self.conn.clone())
    }

    pub fn profiles(&self) -> Profiles {
        Profiles::new(self.conn.clone())
    }

    pub fn coops(&self) -> Records<Coop> {
        self.records()
    }

    pub fn chickens(&self) -> Records<Chicken> {
        self.records()
    }

    pub fn egg_production(&self) -> Records<EggProduction> {
        self.records()
    }

    pub fn feed(&self) -> Records<Feed> {
        self.records()
    }

    pub fn health_records(&self) -> Records<HealthRecord> {
        self.records()
    }

    pub fn sales(&self) -> Records<Sale> {
        self.records()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionContext> {
        let auth_session = self.auth.sign_in_with_password(email, password).await?;
        let session = SessionContext::try_from(auth_session)?;
        info!(user = %session.user_id(), "signed in");
        Ok(session)
    }

    /// Register a new account. `None` means the project requires email
    /// confirmation before the first sign-in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<SessionContext>> {
        match self.auth.sign_up(email, password).await? {
            SignUpResponse::Session(session) => {
                let session = SessionContext::try_from(session)?;
                info!(user = %session.user_id(), "signed up");
                Ok(Some(session))
            }
            SignUpResponse::PendingConfirmation(user) => {
                info!(user = %user.id, "signed up, awaiting email confirmation");
                Ok(None)
            }
        }
    }

    /// Exchange the session's refresh token for a fresh session.
    pub async fn refresh(&self, session: &SessionContext) -> Result<SessionContext> {
        let refreshed = self.auth.refresh_session(&session.refresh_token).await?;
        SessionContext::try_from(refreshed)
    }

    /// Ask the provider who the session belongs to.
    pub async fn current_user(&self, session: &SessionContext) -> Result<CurrentUser> {
        let user = self.auth.get_user(session.bearer()?).await?;
        let id: uuid::Uuid = user
            .id
            .parse()
            .map_err(|_| Error::InvalidSession(format!("user id {:?} is not a UUID", user.id)))?;
        Ok(CurrentUser {
            id,
            email: user.email,
        })
    }

    pub async fn sign_out(&self, session: &SessionContext) -> Result<()> {
        self.auth.sign_out(session.token()?).await?;
        info!(user = %session.user_id(), "signed out");
        Ok(())
    }

    /// Dashboard numbers as of today.
    pub async fn dashboard(&self, session: &SessionContext) -> Result<DashboardStats> {
        DashboardStats::fetch(self, session, today()).await
    }

    /// Financial report for `window`, ending today.
    pub async fn report(
        &self,
        session: &SessionContext,
        window: ReportWindow,
    ) -> Result<FinancialReport> {
        FinancialReport::fetch(self, session, window, today()).await
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, CoopBookConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::records::{ListFilter, Profiles, Record, Records, SortOrder};
    pub use crate::report::{DashboardStats, FinancialReport};
    pub use crate::session::{CurrentUser, SessionContext};
    pub use crate::window::{DateRange, ReportWindow};
    pub use crate::CoopBook;
}
