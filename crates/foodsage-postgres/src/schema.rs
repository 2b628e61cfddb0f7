//! Table definitions, applied one statement at a time.

pub(crate) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        user_id TEXT PRIMARY KEY,
        items   TEXT[] NOT NULL CHECK (cardinality(items) > 0),
        version BIGINT NOT NULL CHECK (version > 0)
    )
    "#,
];
