// Service exports
pub mod gateway;

pub use gateway::ConnectionGateway;
