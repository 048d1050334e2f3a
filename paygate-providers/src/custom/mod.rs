//! Self-contained custom gateway.
//!
//! Only runs in test mode; see [`CustomGateway::new`].

mod gateway;
mod simulator;

pub use gateway::CustomGateway;
pub use simulator::TestModeSimulator;
