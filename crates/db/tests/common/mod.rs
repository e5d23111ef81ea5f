//! Shared setup for store tests: a migrated in-memory SQLite database.

#![allow(dead_code)]

use gatehouse_core::user::{Extensions, NewUser};
use gatehouse_db::{create_memory_pool, run_migrations, DbPool, Dialect};

pub async fn test_pool() -> DbPool {
    let pool = create_memory_pool()
        .await
        .expect("in-memory database should open");
    run_migrations(&pool, Dialect::Sqlite)
        .await
        .expect("schema should apply");
    pool
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$2b$04$not-a-real-hash".to_string(),
        extensions: Extensions::new(),
    }
}
