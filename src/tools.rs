//! Purpose: The simulation tool surface served over MCP.
//! Exports: `SimToolHandler`.
//! Role: Binds the session registry, case loader, and result serializers to the
//! Role: eleven caller-visible tools plus the `server://info` resource.
//! Invariants: Malformed argument shapes are protocol errors; domain failures
//! Invariants: (unknown session, missing precondition, engine faults) are
//! Invariants: structured `{success:false, error}` results and never crash.
//! Invariants: Engine calls run under the session's model lock, one at a time
//! Invariants: per session; distinct sessions proceed independently.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::cases;
use crate::config::ServerConfig;
use crate::core::error::{Error, ErrorKind};
use crate::core::serialize;
use crate::core::session::SessionManager;
use crate::engine::{CaseLoader, LoadOptions, PowerFlowParams, TimeDomainParams};
use crate::mcp::{
    JsonRpcError, McpHandler, ResourceContent, ResourceSpec, ToolCallRequest, ToolCallResult,
    ToolSpec,
};

const SERVER_INFO_URI: &str = "server://info";

pub struct SimToolHandler {
    config: ServerConfig,
    sessions: Arc<SessionManager>,
    loader: Arc<dyn CaseLoader>,
}

impl SimToolHandler {
    pub fn new(
        config: ServerConfig,
        sessions: Arc<SessionManager>,
        loader: Arc<dyn CaseLoader>,
    ) -> Self {
        Self {
            config,
            sessions,
            loader,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    fn list_available_cases(&self) -> Result<Value, Error> {
        let found = cases::list_cases(&self.config.cases_dir);
        Ok(json!({
            "success": true,
            "count": found.len(),
            "cases": found,
            "cases_dir": self.config.cases_dir.display().to_string(),
        }))
    }

    fn load_case(&self, case_path: &str, setup: bool, no_output: bool) -> Result<Value, Error> {
        let full_path = cases::resolve_case_path(&self.config.cases_dir, case_path)?;
        let model = self.loader.load(&full_path, &LoadOptions { setup, no_output })?;
        let system_info = serialize::system_info(model.as_ref());
        let session_id = self.sessions.create(model, case_path)?;
        info!(session_id = %session_id, case = %case_path, "loaded case");
        Ok(json!({
            "success": true,
            "session_id": session_id,
            "case_path": case_path,
            "system_info": system_info,
        }))
    }

    fn get_system_info(&self, session_id: &str) -> Result<Value, Error> {
        let session = self.sessions.get(session_id)?;
        let model = session.model();
        let mut payload = serialize::system_info(model.as_ref());
        payload["success"] = json!(true);
        payload["session_id"] = json!(session_id);
        Ok(payload)
    }

    fn list_sessions(&self) -> Result<Value, Error> {
        let sessions = self.sessions.list();
        Ok(json!({
            "success": true,
            "count": sessions.len(),
            "sessions": sessions,
        }))
    }

    fn close_session(&self, session_id: &str) -> Result<Value, Error> {
        if !self.sessions.close(session_id) {
            return Err(session_not_found(session_id));
        }
        info!(session_id = %session_id, "closed session");
        Ok(json!({
            "success": true,
            "message": format!("Session {session_id} closed successfully"),
        }))
    }

    fn run_power_flow(&self, session_id: &str, params: PowerFlowParams) -> Result<Value, Error> {
        let session = self.sessions.get(session_id)?;
        let mut model = session.model();
        model.run_power_flow(&params)?;
        let mut payload = serialize::power_flow_results(model.as_ref());
        payload["success"] = json!(true);
        Ok(payload)
    }

    fn run_time_domain(
        &self,
        session_id: &str,
        mut params: TimeDomainParams,
    ) -> Result<Value, Error> {
        let session = self.sessions.get(session_id)?;
        let mut model = session.model();
        if !model.power_flow().converged {
            return Err(Error::new(ErrorKind::Precondition).with_message(
                "Power flow must be run successfully before time-domain simulation",
            ));
        }
        if params.end_time.is_none() {
            params.end_time = Some(self.config.default_tds_end_time);
        }
        if params.step.is_none() {
            params.step = Some(self.config.default_tds_step);
        }
        model.run_time_domain(&params)?;
        let status = model.time_domain();
        Ok(json!({
            "success": true,
            "converged": status.completed && !status.busted,
            "exec_time": status.exec_time,
            "time_range": [status.t_start, status.t_end],
            "n_points": model.time_axis().len(),
            "message": "Time-domain simulation completed. Use get_tds_results to retrieve data.",
        }))
    }

    fn run_eigenvalue(&self, session_id: &str) -> Result<Value, Error> {
        let session = self.sessions.get(session_id)?;
        let mut model = session.model();
        if !model.power_flow().converged {
            return Err(Error::new(ErrorKind::Precondition)
                .with_message("Power flow must be run successfully before eigenvalue analysis"));
        }
        model.run_eigenvalue()?;
        let mut payload = serialize::eigenvalue_results(model.as_ref())?;
        payload["success"] = json!(true);
        Ok(payload)
    }

    fn get_pflow_results(&self, session_id: &str) -> Result<Value, Error> {
        let session = self.sessions.get(session_id)?;
        let model = session.model();
        let mut payload = serialize::power_flow_results(model.as_ref());
        payload["success"] = json!(true);
        Ok(payload)
    }

    fn get_tds_results(
        &self,
        session_id: &str,
        variables: Option<Vec<String>>,
        max_points: Option<usize>,
    ) -> Result<Value, Error> {
        let session = self.sessions.get(session_id)?;
        let model = session.model();
        let max_points = max_points.unwrap_or(self.config.max_result_points);
        let mut payload =
            serialize::time_domain_results(model.as_ref(), variables.as_deref(), max_points)?;
        payload["success"] = json!(true);
        Ok(payload)
    }

    fn list_tds_variables(&self, session_id: &str) -> Result<Value, Error> {
        let session = self.sessions.get(session_id)?;
        let model = session.model();
        let mut payload = serialize::variable_catalog(model.as_ref())?;
        payload["success"] = json!(true);
        Ok(payload)
    }

    fn server_info_page(&self) -> String {
        let tool_lines: Vec<String> = self
            .list_tools()
            .into_iter()
            .map(|tool| format!("- `{}`: {}", tool.name, tool.description))
            .collect();
        format!(
            "# {name} MCP Server\n\n\
             Version: {version}\n\n\
             Exposes stateful power system simulation sessions: load a case,\n\
             run power flow / time-domain / eigenvalue analyses, retrieve results.\n\n\
             ## Tools\n\n{tools}\n\n\
             ## Typical workflow\n\n\
             1. `list_available_cases`\n\
             2. `load_case` -> session_id\n\
             3. `run_power_flow`\n\
             4. `run_time_domain`\n\
             5. `get_tds_results`\n\n\
             ## Configuration\n\n\
             - Max sessions: {max_sessions}\n\
             - Session TTL: {ttl}s\n\
             - Max result points: {max_points}\n\
             - Cases directory: {cases_dir}\n",
            name = self.config.server_name(),
            version = self.config.server_version(),
            tools = tool_lines.join("\n"),
            max_sessions = self.config.max_sessions,
            ttl = self.config.session_ttl.as_secs(),
            max_points = self.config.max_result_points,
            cases_dir = self.config.cases_dir.display(),
        )
    }
}

impl McpHandler for SimToolHandler {
    fn list_tools(&self) -> Vec<ToolSpec> {
        vec![
            tool(
                "list_available_cases",
                "List available case files under the configured cases directory",
                json!({ "type": "object", "properties": {} }),
            ),
            tool(
                "load_case",
                "Load a case file and create a new simulation session",
                json!({
                    "type": "object",
                    "properties": {
                        "case_path": {
                            "type": "string",
                            "description": "Case path, relative to the cases directory or absolute",
                        },
                        "setup": { "type": "boolean", "default": true },
                        "no_output": { "type": "boolean", "default": true },
                    },
                    "required": ["case_path"],
                }),
            ),
            tool(
                "get_system_info",
                "Get detailed information about a loaded system",
                session_schema(json!({})),
            ),
            tool(
                "list_sessions",
                "List all active simulation sessions",
                json!({ "type": "object", "properties": {} }),
            ),
            tool(
                "close_session",
                "Close and remove a simulation session",
                session_schema(json!({})),
            ),
            tool(
                "run_power_flow",
                "Run power flow calculation on a loaded system",
                session_schema(json!({
                    "tol": { "type": "number", "description": "Convergence tolerance" },
                    "max_iter": { "type": "integer", "description": "Maximum iterations" },
                    "method": { "type": "string", "description": "Solution method" },
                })),
            ),
            tool(
                "run_time_domain",
                "Run time-domain simulation (requires a converged power flow)",
                session_schema(json!({
                    "tf": { "type": "number", "description": "Simulation end time in seconds" },
                    "tstep": { "type": "number", "description": "Integration step in seconds" },
                    "tol": { "type": "number", "description": "Convergence tolerance" },
                    "method": { "type": "string", "description": "Integration method" },
                })),
            ),
            tool(
                "run_eigenvalue",
                "Run eigenvalue analysis (requires a converged power flow)",
                session_schema(json!({})),
            ),
            tool(
                "get_pflow_results",
                "Get power flow results for a session",
                session_schema(json!({})),
            ),
            tool(
                "get_tds_results",
                "Get time-domain results, optionally filtered and downsampled",
                session_schema(json!({
                    "variables": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Variable names to retrieve; all state variables when omitted",
                    },
                    "max_points": {
                        "type": "integer",
                        "description": "Bound on returned points per array (0 disables)",
                    },
                })),
            ),
            tool(
                "list_tds_variables",
                "List state and algebraic variable names from a time-domain run",
                session_schema(json!({})),
            ),
        ]
    }

    fn call_tool(&self, request: ToolCallRequest) -> Result<ToolCallResult, JsonRpcError> {
        let args = &request.arguments;
        debug!(tool = %request.name, "tool call");
        let outcome = match request.name.as_str() {
            "list_available_cases" => self.list_available_cases(),
            "load_case" => self.load_case(
                &required_str(args, "case_path")?,
                optional_bool(args, "setup")?.unwrap_or(true),
                optional_bool(args, "no_output")?.unwrap_or(true),
            ),
            "get_system_info" => self.get_system_info(&required_str(args, "session_id")?),
            "list_sessions" => self.list_sessions(),
            "close_session" => self.close_session(&required_str(args, "session_id")?),
            "run_power_flow" => self.run_power_flow(
                &required_str(args, "session_id")?,
                PowerFlowParams {
                    tol: optional_f64(args, "tol")?,
                    max_iter: optional_u64(args, "max_iter")?.map(|v| v as u32),
                    method: optional_str(args, "method")?,
                },
            ),
            "run_time_domain" => self.run_time_domain(
                &required_str(args, "session_id")?,
                TimeDomainParams {
                    end_time: optional_f64(args, "tf")?,
                    step: optional_f64(args, "tstep")?,
                    tol: optional_f64(args, "tol")?,
                    method: optional_str(args, "method")?,
                },
            ),
            "run_eigenvalue" => self.run_eigenvalue(&required_str(args, "session_id")?),
            "get_pflow_results" => self.get_pflow_results(&required_str(args, "session_id")?),
            "get_tds_results" => self.get_tds_results(
                &required_str(args, "session_id")?,
                optional_str_list(args, "variables")?,
                optional_u64(args, "max_points")?.map(|v| v as usize),
            ),
            "list_tds_variables" => self.list_tds_variables(&required_str(args, "session_id")?),
            other => {
                return Err(JsonRpcError::invalid_params(format!(
                    "unknown tool: {other}"
                )));
            }
        };

        match outcome {
            Ok(payload) => Ok(ToolCallResult::payload(payload)),
            Err(err) => {
                debug!(tool = %request.name, error = %err, "tool call failed");
                Ok(ToolCallResult::failure(err.caller_message()))
            }
        }
    }

    fn list_resources(&self) -> Vec<ResourceSpec> {
        vec![ResourceSpec {
            uri: SERVER_INFO_URI.to_string(),
            name: "Server information".to_string(),
            description: Some("Server capabilities, tools, and configuration".to_string()),
            mime_type: Some("text/markdown".to_string()),
        }]
    }

    fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContent>, JsonRpcError> {
        if uri != SERVER_INFO_URI {
            return Err(JsonRpcError::invalid_params(format!(
                "unknown resource: {uri}"
            )));
        }
        Ok(vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: Some("text/markdown".to_string()),
            text: Some(self.server_info_page()),
        }])
    }
}

fn session_not_found(session_id: &str) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("Session not found")
        .with_session(session_id)
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Object schema with `session_id` required plus tool-specific properties.
fn session_schema(extra_properties: Value) -> Value {
    let mut properties = Map::new();
    properties.insert(
        "session_id".to_string(),
        json!({ "type": "string", "description": "Session identifier from load_case" }),
    );
    if let Value::Object(extra) = extra_properties {
        properties.extend(extra);
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": ["session_id"],
    })
}

fn required_str(args: &Map<String, Value>, key: &str) -> Result<String, JsonRpcError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("missing string param `{key}`")))
}

fn optional_str(args: &Map<String, Value>, key: &str) -> Result<Option<String>, JsonRpcError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(JsonRpcError::invalid_params(format!(
            "param `{key}` must be a string"
        ))),
    }
}

fn optional_bool(args: &Map<String, Value>, key: &str) -> Result<Option<bool>, JsonRpcError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(JsonRpcError::invalid_params(format!(
            "param `{key}` must be a boolean"
        ))),
    }
}

fn optional_f64(args: &Map<String, Value>, key: &str) -> Result<Option<f64>, JsonRpcError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(value)) => value.as_f64().map(Some).ok_or_else(|| {
            JsonRpcError::invalid_params(format!("param `{key}` must be a number"))
        }),
        Some(_) => Err(JsonRpcError::invalid_params(format!(
            "param `{key}` must be a number"
        ))),
    }
}

fn optional_u64(args: &Map<String, Value>, key: &str) -> Result<Option<u64>, JsonRpcError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(value)) => value.as_u64().map(Some).ok_or_else(|| {
            JsonRpcError::invalid_params(format!("param `{key}` must be a non-negative integer"))
        }),
        Some(_) => Err(JsonRpcError::invalid_params(format!(
            "param `{key}` must be a non-negative integer"
        ))),
    }
}

fn optional_str_list(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, JsonRpcError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(values)) => {
            let mut out = Vec::with_capacity(values.len());
            for value in values {
                match value.as_str() {
                    Some(value) => out.push(value.to_string()),
                    None => {
                        return Err(JsonRpcError::invalid_params(format!(
                            "param `{key}` must be an array of strings"
                        )));
                    }
                }
            }
            Ok(Some(out))
        }
        Some(_) => Err(JsonRpcError::invalid_params(format!(
            "param `{key}` must be an array of strings"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use serde_json::{Value, json};
    use tempfile::TempDir;

    use super::*;
    use crate::engine::synthetic::SyntheticLoader;

    fn handler_with_cases(names: &[&str]) -> (TempDir, SimToolHandler) {
        let temp = tempfile::tempdir().expect("tempdir");
        for name in names {
            fs::write(temp.path().join(name), b"").expect("write case");
        }
        let mut config = ServerConfig::new(temp.path().to_path_buf());
        config.max_sessions = 4;
        config.session_ttl = Duration::from_secs(3600);
        let handler = SimToolHandler::new(
            config,
            Arc::new(SessionManager::new(4, Duration::from_secs(3600))),
            Arc::new(SyntheticLoader),
        );
        (temp, handler)
    }

    fn call(handler: &SimToolHandler, name: &str, args: Value) -> Value {
        let arguments = args.as_object().cloned().unwrap_or_default();
        let result = handler
            .call_tool(ToolCallRequest {
                name: name.to_string(),
                arguments,
            })
            .expect("no protocol error");
        result.structured_content.expect("structured payload")
    }

    fn load(handler: &SimToolHandler, case: &str) -> String {
        let payload = call(handler, "load_case", json!({ "case_path": case }));
        assert_eq!(payload["success"], json!(true));
        payload["session_id"].as_str().expect("session id").to_string()
    }

    #[test]
    fn tool_catalog_is_complete() {
        let (_temp, handler) = handler_with_cases(&[]);
        let names: Vec<String> = handler
            .list_tools()
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "list_available_cases",
                "load_case",
                "get_system_info",
                "list_sessions",
                "close_session",
                "run_power_flow",
                "run_time_domain",
                "run_eigenvalue",
                "get_pflow_results",
                "get_tds_results",
                "list_tds_variables",
            ]
        );
    }

    #[test]
    fn list_available_cases_reports_sorted_paths() {
        let (_temp, handler) = handler_with_cases(&["b.xlsx", "a.raw"]);
        let payload = call(&handler, "list_available_cases", json!({}));
        assert_eq!(payload["count"], json!(2));
        assert_eq!(payload["cases"], json!(["a.raw", "b.xlsx"]));
    }

    #[test]
    fn load_case_registers_a_session_with_summary() {
        let (_temp, handler) = handler_with_cases(&["demo3.xlsx"]);
        let payload = call(&handler, "load_case", json!({ "case_path": "demo3.xlsx" }));
        assert_eq!(payload["success"], json!(true));
        assert_eq!(payload["case_path"], json!("demo3.xlsx"));
        assert_eq!(payload["system_info"]["models"]["Bus"]["count"], json!(3));
        assert_eq!(handler.sessions().len(), 1);
    }

    #[test]
    fn load_case_missing_file_fails_without_registering() {
        let (_temp, handler) = handler_with_cases(&[]);
        let payload = call(&handler, "load_case", json!({ "case_path": "nope.xlsx" }));
        assert_eq!(payload["success"], json!(false));
        assert!(payload["error"].as_str().unwrap().contains("Case file not found"));
        assert!(handler.sessions().is_empty());
    }

    #[test]
    fn load_case_engine_failure_registers_nothing() {
        let (_temp, handler) = handler_with_cases(&["corrupt.xlsx"]);
        let payload = call(&handler, "load_case", json!({ "case_path": "corrupt.xlsx" }));
        assert_eq!(payload["success"], json!(false));
        assert!(handler.sessions().is_empty());
    }

    #[test]
    fn unknown_session_is_a_uniform_failure() {
        let (_temp, handler) = handler_with_cases(&[]);
        for tool_name in [
            "get_system_info",
            "run_power_flow",
            "run_time_domain",
            "run_eigenvalue",
            "get_pflow_results",
            "get_tds_results",
            "list_tds_variables",
        ] {
            let payload = call(&handler, tool_name, json!({ "session_id": "missing" }));
            assert_eq!(payload["success"], json!(false), "{tool_name}");
            assert_eq!(payload["error"], json!("Session not found: missing"), "{tool_name}");
        }
    }

    #[test]
    fn close_session_round_trip() {
        let (_temp, handler) = handler_with_cases(&["demo3.xlsx"]);
        let id = load(&handler, "demo3.xlsx");
        let payload = call(&handler, "close_session", json!({ "session_id": id }));
        assert_eq!(payload["success"], json!(true));
        let payload = call(&handler, "close_session", json!({ "session_id": id }));
        assert_eq!(payload["success"], json!(false));
        let payload = call(&handler, "get_system_info", json!({ "session_id": id }));
        assert_eq!(payload["success"], json!(false));
    }

    #[test]
    fn full_analysis_flow() {
        let (_temp, handler) = handler_with_cases(&["demo3.xlsx"]);
        let id = load(&handler, "demo3.xlsx");

        let pflow = call(&handler, "run_power_flow", json!({ "session_id": id }));
        assert_eq!(pflow["converged"], json!(true));
        assert_eq!(pflow["buses"]["voltage"].as_array().unwrap().len(), 3);

        let tds = call(
            &handler,
            "run_time_domain",
            json!({ "session_id": id, "tf": 2.0, "tstep": 0.1 }),
        );
        assert_eq!(tds["success"], json!(true));
        assert_eq!(tds["converged"], json!(true));
        assert_eq!(tds["time_range"], json!([0.0, 2.0]));
        assert_eq!(tds["n_points"], json!(21));

        let variables = call(&handler, "list_tds_variables", json!({ "session_id": id }));
        assert_eq!(variables["n_states"], json!(4));

        let results = call(
            &handler,
            "get_tds_results",
            json!({ "session_id": id, "variables": ["v_Bus_1"], "max_points": 10 }),
        );
        assert_eq!(results["downsampled"], json!(true));
        assert_eq!(results["downsample_factor"], json!(2));
        assert!(results["variables"].as_object().unwrap().contains_key("v_Bus_1"));

        let eig = call(&handler, "run_eigenvalue", json!({ "session_id": id }));
        assert_eq!(eig["n_eigenvalues"], json!(4));

        let sessions = call(&handler, "list_sessions", json!({}));
        assert_eq!(sessions["count"], json!(1));
    }

    #[test]
    fn time_domain_requires_converged_power_flow() {
        let (_temp, handler) = handler_with_cases(&["demo3.xlsx", "diverge.xlsx"]);

        // no power flow run at all
        let id = load(&handler, "demo3.xlsx");
        let payload = call(&handler, "run_time_domain", json!({ "session_id": id }));
        assert_eq!(payload["success"], json!(false));
        assert!(payload["error"].as_str().unwrap().contains("Power flow"));
        // engine untouched: results remain unavailable
        let payload = call(&handler, "get_tds_results", json!({ "session_id": id }));
        assert!(payload["error"].as_str().unwrap().contains("not initialized"));

        // non-converged power flow gates the same way
        let id = load(&handler, "diverge.xlsx");
        let payload = call(&handler, "run_power_flow", json!({ "session_id": id }));
        assert_eq!(payload["converged"], json!(false));
        let payload = call(&handler, "run_time_domain", json!({ "session_id": id }));
        assert_eq!(payload["success"], json!(false));
        let payload = call(&handler, "run_eigenvalue", json!({ "session_id": id }));
        assert_eq!(payload["success"], json!(false));
    }

    #[test]
    fn tds_results_before_any_run_are_a_precondition_failure() {
        let (_temp, handler) = handler_with_cases(&["demo3.xlsx"]);
        let id = load(&handler, "demo3.xlsx");
        let payload = call(&handler, "get_tds_results", json!({ "session_id": id }));
        assert_eq!(payload["success"], json!(false));
        assert_eq!(
            payload["error"],
            json!("Time-domain simulation not initialized")
        );
        assert!(payload.get("time").is_none());
    }

    #[test]
    fn malformed_arguments_are_protocol_errors() {
        let (_temp, handler) = handler_with_cases(&[]);
        let err = handler
            .call_tool(ToolCallRequest {
                name: "get_system_info".to_string(),
                arguments: Map::new(),
            })
            .err()
            .expect("protocol error");
        assert!(err.message.contains("session_id"));

        let err = handler
            .call_tool(ToolCallRequest {
                name: "no_such_tool".to_string(),
                arguments: Map::new(),
            })
            .err()
            .expect("protocol error");
        assert!(err.message.contains("unknown tool"));
    }

    #[test]
    fn server_info_resource_renders() {
        let (_temp, handler) = handler_with_cases(&[]);
        let resources = handler.list_resources();
        assert_eq!(resources.len(), 1);
        let contents = handler.read_resource(SERVER_INFO_URI).expect("read");
        let text = contents[0].text.as_deref().expect("text");
        assert!(text.contains("load_case"));
        assert!(text.contains("Max sessions: 4"));
        assert!(handler.read_resource("server://other").is_err());
    }
}
