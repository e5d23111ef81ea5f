use std::sync::Arc;

use gatehouse_core::permissions::PermissionTable;
use gatehouse_core::preferences::OptionGroup;
use gatehouse_db::repositories::{EmailTokenRepo, PreferenceRepo, RoleRepo, UserRepo};
use gatehouse_db::{DbPool, Dialect};
use gatehouse_mail::Mailer;

use crate::config::ServerConfig;
use crate::identity::{EmailTokens, IdentityService};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub identity: Arc<IdentityService>,
    pub roles: Arc<RoleRepo>,
    pub preferences: Arc<PreferenceRepo>,
}

impl AppState {
    /// Wire the repositories and services over one pool.
    pub fn new(
        pool: DbPool,
        dialect: Dialect,
        config: ServerConfig,
        permissions: PermissionTable,
        option_schema: OptionGroup,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let tokens = EmailTokens::new(
            EmailTokenRepo::new(pool.clone(), dialect),
            mailer,
            config.identity.clone(),
        );
        let identity = IdentityService::new(
            UserRepo::new(pool.clone(), dialect),
            tokens,
            config.jwt.clone(),
            config.password_cost,
        );

        Self {
            roles: Arc::new(RoleRepo::new(pool.clone(), dialect, Arc::new(permissions))),
            preferences: Arc::new(PreferenceRepo::new(
                pool.clone(),
                dialect,
                Arc::new(option_schema),
            )),
            identity: Arc::new(identity),
            config: Arc::new(config),
            pool,
        }
    }
}
