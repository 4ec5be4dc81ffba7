pub mod agent;
pub mod game;
pub mod move_record;
pub mod ticket;
