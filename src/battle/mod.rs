pub mod ai;
pub mod attributes;
pub mod conditions;
pub mod context;
pub mod damage;
pub mod engine;
pub mod phase_queue;
pub mod phases;
pub mod runner;
pub mod state;
pub mod stats;
pub mod tags;
pub mod turn_order;

#[cfg(test)]
mod tests;
