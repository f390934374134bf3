//! Platform wire formats and the HTTP REST adapter.

mod client;
pub mod dto;
pub mod gateway;

pub use client::{API_BASE, HttpRestClient};
pub use gateway::{GatewayEventType, GatewayOpcode, GatewayPayload};
