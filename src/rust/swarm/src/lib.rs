//! Resource grouping and resource-agent plumbing for the swarm cluster
//! manager.
//!
//! The core is [`DisjointSetCollection`]: one universe of named resources,
//! partitioned independently per dimension. [`agent`] wraps external OCF and
//! LSB agent scripts; [`local::LocalEngine`] ties configured groups together.

pub mod agent;
pub mod cli;
pub mod collection;
pub mod config;
pub mod disjoint;
pub mod hash;
pub mod interner;
pub mod key;
pub mod local;
pub mod logging;

#[cfg(feature = "python")]
mod python;

pub use agent::{open_resource_agent, AgentError, ResourceAgent, ReturnCode};
pub use collection::DisjointSetCollection;
pub use config::SwarmConfig;
pub use disjoint::DisjointSetError;
pub use hash::HashError;
pub use interner::ElementId;
pub use key::Key;

#[cfg(test)]
mod tests;
