//! CLI command implementations.
//!
//! | Module      | Commands handled |
//! |-------------|------------------|
//! | `serve`     | `Serve`          |
//! | `init`      | `Init`           |
//! | `rebalance` | `Rebalance`      |

pub mod init;
pub mod rebalance;
pub mod serve;

pub use init::cmd_init;
pub use rebalance::cmd_rebalance;
pub use serve::cmd_serve;
