//! Optimistic client for the board's HTTP contract.
//!
//! | Module      | Responsibility                                           |
//! |-------------|----------------------------------------------------------|
//! | `local`     | `LocalBoard` replica, lane views, snapshot/restore, move planning |
//! | `transport` | `BoardApi` trait, `HttpBoardApi` (reqwest), `ClientError` |
//! | `reconcile` | `BoardClient`: optimistic apply, then confirm or roll back |

pub mod local;
pub mod reconcile;
pub mod transport;

pub use local::{LocalBoard, MovePlan, Snapshot};
pub use reconcile::{BoardClient, Notice, PENDING_PREFIX};
pub use transport::{BoardApi, ClientError, HttpBoardApi, MoveRequest};
