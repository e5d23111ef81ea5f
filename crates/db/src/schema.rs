//! Table definitions, one set per dialect.
//!
//! Timestamps are stored as BIGINT Unix seconds and every integer column is
//! BIGINT so rows decode identically through the `Any` driver.

use crate::Dialect;

const POSTGRES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL DEFAULT '',
        activation BIGINT NULL,
        extensions TEXT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_organizations (
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        org_id BIGINT NOT NULL,
        join_date BIGINT NOT NULL,
        PRIMARY KEY (user_id, org_id)
    )",
    "CREATE TABLE IF NOT EXISTS resetrequests (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        email VARCHAR(255) NOT NULL,
        token VARCHAR(255) NOT NULL,
        issued BIGINT NOT NULL,
        kind BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_resetrequests_user_kind ON resetrequests (user_id, kind)",
    "CREATE TABLE IF NOT EXISTS roles (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        org_id BIGINT NOT NULL,
        role_id BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_roles_user_org ON roles (user_id, org_id)",
    "CREATE TABLE IF NOT EXISTS userpref (
        user_id BIGINT PRIMARY KEY,
        settings TEXT NOT NULL
    )",
];

const MYSQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL DEFAULT '',
        activation BIGINT NULL,
        extensions TEXT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_organizations (
        user_id BIGINT NOT NULL,
        org_id BIGINT NOT NULL,
        join_date BIGINT NOT NULL,
        PRIMARY KEY (user_id, org_id)
    )",
    "CREATE TABLE IF NOT EXISTS resetrequests (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        user_id BIGINT NOT NULL,
        email VARCHAR(255) NOT NULL,
        token VARCHAR(255) NOT NULL,
        issued BIGINT NOT NULL,
        kind BIGINT NOT NULL,
        INDEX idx_resetrequests_user_kind (user_id, kind)
    )",
    "CREATE TABLE IF NOT EXISTS roles (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        user_id BIGINT NOT NULL,
        org_id BIGINT NOT NULL,
        role_id BIGINT NOT NULL,
        INDEX idx_roles_user_org (user_id, org_id)
    )",
    "CREATE TABLE IF NOT EXISTS userpref (
        user_id BIGINT PRIMARY KEY,
        settings TEXT NOT NULL
    )",
];

const SQLITE: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL DEFAULT '',
        activation BIGINT NULL,
        extensions TEXT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_organizations (
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        org_id BIGINT NOT NULL,
        join_date BIGINT NOT NULL,
        PRIMARY KEY (user_id, org_id)
    )",
    "CREATE TABLE IF NOT EXISTS resetrequests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id BIGINT NOT NULL,
        email TEXT NOT NULL,
        token TEXT NOT NULL,
        issued BIGINT NOT NULL,
        kind BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_resetrequests_user_kind ON resetrequests (user_id, kind)",
    "CREATE TABLE IF NOT EXISTS roles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id BIGINT NOT NULL,
        org_id BIGINT NOT NULL,
        role_id BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_roles_user_org ON roles (user_id, org_id)",
    "CREATE TABLE IF NOT EXISTS userpref (
        user_id BIGINT PRIMARY KEY,
        settings TEXT NOT NULL
    )",
];

/// DDL statements to run in order for `dialect`. All are idempotent.
pub fn statements(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::Postgres => POSTGRES,
        Dialect::MySql => MYSQL,
        Dialect::Sqlite => SQLITE,
    }
}
