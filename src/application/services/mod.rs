mod relay_error;
mod relay_service;

pub use relay_error::{ProtocolFault, RelayError};
pub use relay_service::{AudioDelivery, ContainerPolicy, RelayOptions, RelayService, parse_reply};
