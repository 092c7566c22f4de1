//! Wire types for the cluster scheduler REST API.
//!
//! These types mirror the JSON shapes the external cluster manager expects
//! and returns (job submit envelope, status response, `X-SLURM-USER-TOKEN`
//! auth). They are shared between `dm-scheduler`'s client and its tests;
//! nothing here talks to the network.

pub mod status;
pub mod types;

pub use status::{ClusterJobState, JobStatus};
pub use types::*;
