//! Purpose: Library crate backing the `gridpulse` MCP server binary.
//! Exports: session core, result serialization, engine contract, MCP dispatch,
//! Exports: tool surface, case discovery, server configuration.
//! Role: Internal library for the binary and tests; not a stable public SDK.
//! Invariants: The engine is reached only through `engine::EngineModel` /
//! Invariants: `engine::CaseLoader`; no module talks to solver internals.

pub mod cases;
pub mod config;
pub mod core;
pub mod engine;
pub mod mcp;
pub mod tools;
