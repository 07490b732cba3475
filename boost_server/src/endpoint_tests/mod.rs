//! Endpoint tests.
//!
//! These spin up an in-process actix service against a throwaway SQLite database, so they cover
//! the full request path: identity middleware, ACL, handler, engine, database.
mod catalog;
mod helpers;
mod orders;
mod top_ups;
mod wallet;
mod webhook;
