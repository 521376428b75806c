//! Storage adapters implementing the domain ports. Only an in-memory backend
//! exists: the mock deliberately keeps no state across restarts.

pub mod in_memory;
