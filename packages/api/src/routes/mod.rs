pub mod agents;
pub mod challenges;
pub mod claim;
pub mod games;
pub mod health;
pub mod queue;
