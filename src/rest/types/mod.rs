pub mod request;
pub mod response;

pub use request::MessageRequest;
pub use response::{GatewayResponse, Message};
