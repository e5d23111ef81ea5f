pub mod organizations;
pub mod preferences;
pub mod roles;
pub mod users;
