pub mod classify;
pub mod incidents;
pub mod intake;
pub mod roles;
