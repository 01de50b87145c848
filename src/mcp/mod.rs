//! MCP protocol surface: the server handler and the HTTP mount.

pub mod dashboard;
pub mod router;
pub mod service;

pub use router::{is_mcp_path, mcp_router, mount, PrefixRouter};
pub use service::BridgeService;
