//! Task board back-end.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │          │ <─────── │    └─ api.rs  (route handlers, AppState)         │
//! └──────────┘          │         ├─ auth.rs     (token gate extractor)    │
//!                       │         ├─ payload.rs  (JSON body -> draft/patch)│
//!                       │         v                                        │
//!                       │  service.rs  (validate, place, persist)          │
//!                       │         │                                        │
//!                       │         v                                        │
//!                       │  store.rs (TaskStore trait) <- db.rs (SQLite)    │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Typical Request Flow (drag a card into another lane)
//!
//! 1. `PATCH /api/tasks/{id}/move` with `{toStatus, toIndex}` reaches
//!    `api::move_task()` once `auth::Authorized` has accepted the token.
//! 2. `payload::parse_move()` turns the body into a `MoveTarget`, reporting
//!    every malformed field at once.
//! 3. `service::move_task()` runs inside `DbHandle::call`: it reads the
//!    destination lane, drops the moved task from it, and places the task
//!    between the neighbors at the requested index.
//! 4. Status and position are written in one `update_fields` call and the
//!    stored task is returned as the canonical answer.

pub mod api;
pub mod auth;
pub mod db;
pub mod payload;
pub mod server;
pub mod service;
pub mod store;
