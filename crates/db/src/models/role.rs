//! Role assignment write outcomes.

/// What a role replacement actually did to the `roles` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolesUpdate {
    /// Whether the previous assignment was deleted.
    pub cleared: bool,
    /// Number of rows inserted.
    pub inserted: usize,
}

impl RolesUpdate {
    pub fn is_noop(&self) -> bool {
        !self.cleared && self.inserted == 0
    }
}
