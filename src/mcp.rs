//! Purpose: Transport-agnostic MCP JSON-RPC core for the simulation server.
//! Exports: `McpDispatcher`, `McpHandler`, request/response envelopes.
//! Role: Protocol adapter between a byte transport and the tool layer.
//! Invariants: Unknown methods and malformed request shapes map to protocol errors.
//! Invariants: Tool execution failures are successful responses with `isError`.
//! Invariants: Handlers take `&self`; the tool layer is internally synchronized
//! Invariants: and may be driven from concurrent callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const JSON_RPC_VERSION: &str = "2.0";
const MCP_PROTOCOL_VERSION: &str = "2025-11-25";
const PARSE_ERROR_CODE: i32 = -32700;
const INVALID_REQUEST_CODE: i32 = -32600;
const METHOD_NOT_FOUND_CODE: i32 = -32601;
const INVALID_PARAMS_CODE: i32 = -32602;
const INTERNAL_ERROR_CODE: i32 = -32603;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    String(String),
    Number(i64),
    Null,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: JsonRpcId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn success(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR_CODE, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST_CODE, message)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(METHOD_NOT_FOUND_CODE, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS_CODE, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR_CODE, message)
    }
}

/// A notification produces no response; everything else does.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    Response(JsonRpcResponse),
    NoResponse,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<Value>,
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl ToolCallResult {
    /// Successful call: the payload rides both as text content and structured.
    pub fn payload(payload: Value) -> Self {
        let text = payload.to_string();
        Self {
            content: vec![json!({ "type": "text", "text": text })],
            is_error: false,
            structured_content: Some(payload),
        }
    }

    /// Domain failure: a structured `{success: false, error}` record with
    /// `isError` set. Protocol-level errors do not go through here.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let payload = json!({ "success": false, "error": message });
        Self {
            content: vec![json!({ "type": "text", "text": message })],
            is_error: true,
            structured_content: Some(payload),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

pub trait McpHandler {
    fn list_tools(&self) -> Vec<ToolSpec>;
    fn call_tool(&self, request: ToolCallRequest) -> Result<ToolCallResult, JsonRpcError>;
    fn list_resources(&self) -> Vec<ResourceSpec>;
    fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContent>, JsonRpcError>;
}

pub struct McpDispatcher<H> {
    server_name: String,
    server_version: String,
    handler: H,
}

impl<H: McpHandler> McpDispatcher<H> {
    pub fn new(server_name: impl Into<String>, server_version: impl Into<String>, handler: H) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn dispatch_value(&self, value: Value) -> DispatchOutcome {
        match parse_request(value) {
            Ok(request) => self.dispatch_request(request),
            Err(response) => DispatchOutcome::Response(response),
        }
    }

    pub fn dispatch_request(&self, request: JsonRpcRequest) -> DispatchOutcome {
        let id = request.id.clone();
        let routed = self.route(request);
        match id {
            Some(id) => DispatchOutcome::Response(match routed {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(error) => JsonRpcResponse::failure(id, error),
            }),
            None => DispatchOutcome::NoResponse,
        }
    }

    fn route(&self, request: JsonRpcRequest) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": false },
                    "resources": { "subscribe": false, "listChanged": false },
                },
                "serverInfo": {
                    "name": self.server_name.as_str(),
                    "version": self.server_version.as_str(),
                },
            })),
            "notifications/initialized" | "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.handler.list_tools() })),
            "tools/call" => {
                let params = object_params(request.params, "tools/call requires object params")?;
                let name = require_str(&params, "name", "tools/call requires string param `name`")?;
                let arguments = match params.get("arguments") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(map)) => map.clone(),
                    Some(_) => {
                        return Err(JsonRpcError::invalid_params(
                            "tools/call `arguments` must be an object",
                        ));
                    }
                };
                let result = self.handler.call_tool(ToolCallRequest { name, arguments })?;
                serde_json::to_value(result)
                    .map_err(|_| JsonRpcError::internal_error("failed to encode tool result"))
            }
            "resources/list" => Ok(json!({ "resources": self.handler.list_resources() })),
            "resources/read" => {
                let params = object_params(request.params, "resources/read requires object params")?;
                let uri = require_str(&params, "uri", "resources/read requires string param `uri`")?;
                let contents = self.handler.read_resource(&uri)?;
                Ok(json!({ "contents": contents }))
            }
            other => Err(JsonRpcError::method_not_found(format!(
                "method not found: {other}"
            ))),
        }
    }
}

pub fn parse_jsonrpc_line(line: &str) -> Result<Value, JsonRpcError> {
    serde_json::from_str::<Value>(line).map_err(|_| JsonRpcError::parse_error("invalid JSON"))
}

fn parse_request(value: Value) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let Value::Object(mut object) = value else {
        return Err(JsonRpcResponse::failure(
            JsonRpcId::Null,
            JsonRpcError::invalid_request("request must be a JSON object"),
        ));
    };

    let id = match object.remove("id") {
        None => None,
        Some(Value::String(value)) => Some(JsonRpcId::String(value)),
        Some(Value::Number(value)) => match value.as_i64() {
            Some(value) => Some(JsonRpcId::Number(value)),
            None => {
                return Err(JsonRpcResponse::failure(
                    JsonRpcId::Null,
                    JsonRpcError::invalid_request("id must be an integer number"),
                ));
            }
        },
        Some(Value::Null) => Some(JsonRpcId::Null),
        Some(_) => {
            return Err(JsonRpcResponse::failure(
                JsonRpcId::Null,
                JsonRpcError::invalid_request("id must be a string, integer number, or null"),
            ));
        }
    };
    let error_id = id.clone().unwrap_or(JsonRpcId::Null);

    match object.remove("jsonrpc").and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    }) {
        Some(version) if version == JSON_RPC_VERSION => {}
        _ => {
            return Err(JsonRpcResponse::failure(
                error_id,
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }
    }

    let method = match object.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return Err(JsonRpcResponse::failure(
                error_id,
                JsonRpcError::invalid_request("missing method field"),
            ));
        }
    };

    Ok(JsonRpcRequest {
        jsonrpc: JSON_RPC_VERSION.to_string(),
        id,
        method,
        params: object.remove("params"),
    })
}

fn object_params(
    params: Option<Value>,
    message: &'static str,
) -> Result<Map<String, Value>, JsonRpcError> {
    match params {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(JsonRpcError::invalid_params(message)),
    }
}

fn require_str(
    params: &Map<String, Value>,
    key: &str,
    message: &'static str,
) -> Result<String, JsonRpcError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| JsonRpcError::invalid_params(message))
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoHandler;

    impl McpHandler for EchoHandler {
        fn list_tools(&self) -> Vec<ToolSpec> {
            vec![ToolSpec {
                name: "load_case".to_string(),
                description: "Load a case".to_string(),
                input_schema: json!({"type":"object","properties":{}}),
            }]
        }

        fn call_tool(&self, request: ToolCallRequest) -> Result<ToolCallResult, JsonRpcError> {
            if request.name == "missing_session" {
                return Ok(ToolCallResult::failure("Session not found: xyz"));
            }
            Ok(ToolCallResult::payload(json!({
                "success": true,
                "tool": request.name,
                "args": request.arguments,
            })))
        }

        fn list_resources(&self) -> Vec<ResourceSpec> {
            vec![ResourceSpec {
                uri: "server://info".to_string(),
                name: "info".to_string(),
                description: Some("Server information".to_string()),
                mime_type: Some("text/markdown".to_string()),
            }]
        }

        fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContent>, JsonRpcError> {
            if uri != "server://info" {
                return Err(JsonRpcError::invalid_params(format!(
                    "unknown resource: {uri}"
                )));
            }
            Ok(vec![ResourceContent {
                uri: uri.to_string(),
                mime_type: Some("text/markdown".to_string()),
                text: Some("# info".to_string()),
            }])
        }
    }

    fn dispatcher() -> McpDispatcher<EchoHandler> {
        McpDispatcher::new("gridpulse", "0.1.0", EchoHandler)
    }

    fn request(id: i64, method: &str, params: Value) -> Value {
        json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
    }

    fn response(outcome: DispatchOutcome) -> JsonRpcResponse {
        match outcome {
            DispatchOutcome::Response(response) => response,
            DispatchOutcome::NoResponse => panic!("expected a response"),
        }
    }

    #[test]
    fn initialize_reports_server_identity_and_capabilities() {
        let out = response(dispatcher().dispatch_value(request(1, "initialize", json!({}))));
        assert_eq!(out.error, None);
        let result = out.result.expect("result");
        assert_eq!(result["protocolVersion"], json!(MCP_PROTOCOL_VERSION));
        assert_eq!(result["serverInfo"]["name"], json!("gridpulse"));
        assert_eq!(result["capabilities"]["tools"]["listChanged"], json!(false));
    }

    #[test]
    fn notification_without_id_produces_no_response() {
        let outcome = dispatcher().dispatch_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
            "params": {},
        }));
        assert_eq!(outcome, DispatchOutcome::NoResponse);
    }

    #[test]
    fn tools_list_and_call_round_trip() {
        let d = dispatcher();
        let list = response(d.dispatch_value(request(2, "tools/list", json!({}))));
        assert_eq!(
            list.result.expect("list")["tools"][0]["name"],
            json!("load_case")
        );

        let call = response(d.dispatch_value(request(
            3,
            "tools/call",
            json!({ "name": "load_case", "arguments": { "case_path": "demo3.xlsx" } }),
        )));
        assert_eq!(call.error, None);
        let result = call.result.expect("call");
        assert_eq!(result["structuredContent"]["success"], json!(true));
        assert_eq!(
            result["structuredContent"]["args"]["case_path"],
            json!("demo3.xlsx")
        );
    }

    #[test]
    fn tool_domain_failure_is_an_is_error_result() {
        let call = response(dispatcher().dispatch_value(request(
            4,
            "tools/call",
            json!({ "name": "missing_session", "arguments": {} }),
        )));
        assert_eq!(call.error, None);
        let result = call.result.expect("result");
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["structuredContent"]["success"], json!(false));
        assert_eq!(
            result["structuredContent"]["error"],
            json!("Session not found: xyz")
        );
    }

    #[test]
    fn unknown_method_is_a_protocol_error() {
        let out = response(dispatcher().dispatch_value(request(5, "tools/unknown", json!({}))));
        assert_eq!(out.error.expect("error").code, METHOD_NOT_FOUND_CODE);
    }

    #[test]
    fn malformed_call_params_are_invalid_params() {
        let out = response(dispatcher().dispatch_value(request(
            6,
            "tools/call",
            json!({ "name": "load_case", "arguments": "nope" }),
        )));
        assert_eq!(out.error.expect("error").code, INVALID_PARAMS_CODE);
    }

    #[test]
    fn resources_list_and_read_round_trip() {
        let d = dispatcher();
        let list = response(d.dispatch_value(request(7, "resources/list", json!({}))));
        assert_eq!(
            list.result.expect("list")["resources"][0]["uri"],
            json!("server://info")
        );
        let read = response(d.dispatch_value(request(
            8,
            "resources/read",
            json!({ "uri": "server://info" }),
        )));
        assert_eq!(
            read.result.expect("read")["contents"][0]["text"],
            json!("# info")
        );
    }

    #[test]
    fn non_object_request_is_invalid() {
        let out = response(dispatcher().dispatch_value(json!([1, 2, 3])));
        assert_eq!(out.error.expect("error").code, INVALID_REQUEST_CODE);
        assert_eq!(out.id, JsonRpcId::Null);
    }
}
