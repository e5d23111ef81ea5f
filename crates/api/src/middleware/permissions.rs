//! Permission checks for the active `(user, organization)` pair.

use gatehouse_core::error::CoreError;
use gatehouse_core::permissions::Permissions;

use super::session::RequestIdentity;
use crate::error::AppResult;
use crate::state::AppState;

impl RequestIdentity {
    /// Everything the caller's roles in the active organization grant.
    pub async fn permissions(&self, state: &AppState) -> AppResult<Permissions> {
        Ok(state
            .roles
            .get_permissions(self.user_id, self.organization_id)
            .await?)
    }

    /// Fail with `auth_forbidden` unless every task is granted.
    ///
    /// ```ignore
    /// identity.require(&state, &[PERMISSION_LIST_USERS]).await?;
    /// ```
    pub async fn require(&self, state: &AppState, tasks: &[&str]) -> AppResult<()> {
        let granted = self.permissions(state).await?;
        if !granted.allowed_to(tasks) {
            tracing::warn!(
                user_id = self.user_id,
                org_id = self.organization_id,
                ?tasks,
                "Permission denied"
            );
            return Err(CoreError::Forbidden.into());
        }
        Ok(())
    }
}
