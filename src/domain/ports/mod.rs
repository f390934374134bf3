mod gateway_port;
mod rest_port;

pub use gateway_port::{GatewayCommand, GatewayPort, RequestGuildMembers};
pub use rest_port::RestPort;

#[cfg(test)]
pub mod mocks {
    pub use super::gateway_port::mock::MockGateway;
    pub use super::rest_port::MockRestPort;
}
