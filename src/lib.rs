//! raidmind - grid agents that learn to cross a defended map
//!
//! Agents walk a tile grid toward a goal while avoiding hazardous structures. They share one
//! tabular Q-learning table, explore epsilon-greedily, are penalised for stalling and looping,
//! and retreat when badly hurt.

pub mod grid;
pub mod rl;

/// Identifier type used for agents.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
