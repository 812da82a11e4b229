// Interface adapters: wire protocol, network handling, and tokio-backed ports.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod timing;
pub mod utils;
