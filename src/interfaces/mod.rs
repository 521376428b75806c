//! Inbound adapters. The HTTP surface is the only one: a small axum API that
//! integrators point their clients and webhook receivers at.

pub mod http;
