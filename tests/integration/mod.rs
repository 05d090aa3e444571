pub mod relay_api;
pub mod session_flow;
