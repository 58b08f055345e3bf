pub mod config;
pub mod diagnosis;
pub mod engine;
pub mod error;
pub mod invariants;
pub mod pool;
pub mod prioritization;
pub mod reinforcement;
pub mod selection;
pub mod sequencing;
pub mod types;

pub use config::ReccoConfig;
pub use engine::{ReccoEngine, TrailOutcome, TrailRequest};
pub use error::ReccoError;
pub use pool::{ContentPool, InMemoryContentPool, PoolItem};
#[allow(unused_imports)]
pub use types::*;
