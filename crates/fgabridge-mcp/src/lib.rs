//! # fgabridge-mcp
//!
//! The tool-dispatch core of the bridge: it exposes OpenFGA operations as
//! named, schema-described tools that agents discover and call over MCP.
//!
//! ```text
//! AI Agent (Claude, GPT, ...)
//!       │
//!       │ stdio JSON-RPC / POST /call / SSE bridge
//!       ▼
//! ┌───────────────────┐
//! │  fgabridge server │
//! │  1. Resolve tool  │  ← catalog
//! │  2. Check args    │  ← dispatch
//! │  3. Call backend  │  ← fgabridge-client
//! │  4. Format result │  ← format
//! └─────────┬─────────┘
//!           │
//!           ▼
//!     OpenFGA HTTP API
//! ```
//!
//! Two failure planes are kept apart on purpose: dispatch-level rejections
//! (unknown tool, missing arguments) are typed errors that become 4xx/5xx
//! responses, while failures inside an operation (backend down, store
//! missing) come back as readable `"Error …"` result strings so the calling
//! agent always has something to work with.

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod http;
pub mod ops;
pub mod protocol;
pub mod server;

pub use catalog::{ToolRegistry, ToolSpec};
pub use dispatch::{dispatch, DispatchError};
pub use error::McpError;
pub use http::{AppState, HttpServer};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, ToolContent, ToolDefinition};
pub use server::McpServer;
