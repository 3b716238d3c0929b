pub mod actor;
pub mod ballot;
pub mod election;
