//! Purpose: Run the MCP server over stdio transport.
//! Exports: `serve`.
//! Role: Bridge newline-delimited JSON-RPC lines to the shared dispatcher.
//! Invariants: stdout only emits JSON-RPC messages (one JSON value per line);
//! Invariants: logs go to stderr.
//! Invariants: stdin EOF exits cleanly; parse and protocol errors are surfaced
//! Invariants: as JSON-RPC error responses, never as process failures.

use std::io::{self, BufRead, BufReader, BufWriter, Write};

use gridpulse::core::error::{Error, ErrorKind};
use gridpulse::mcp::{DispatchOutcome, McpDispatcher, McpHandler, parse_jsonrpc_line};
use serde_json::{Value, json};

pub(super) fn serve<H: McpHandler>(dispatcher: &McpDispatcher<H>) -> Result<(), Error> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = BufWriter::new(stdout.lock());
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read MCP request")
                .with_source(err)
        })?;
        if read == 0 {
            flush(&mut writer)?;
            return Ok(());
        }

        let message = line.trim_end_matches(['\n', '\r']);
        if message.is_empty() {
            continue;
        }

        let request = match parse_jsonrpc_line(message) {
            Ok(value) => value,
            Err(error) => {
                let payload = json!({
                    "jsonrpc": "2.0",
                    "id": Value::Null,
                    "error": { "code": error.code, "message": error.message },
                });
                write_json_line(&mut writer, &payload)?;
                continue;
            }
        };

        match dispatcher.dispatch_value(request) {
            DispatchOutcome::NoResponse => {}
            DispatchOutcome::Response(response) => {
                let payload = serde_json::to_value(response).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode MCP response")
                        .with_source(err)
                })?;
                write_json_line(&mut writer, &payload)?;
            }
        }
    }
}

fn write_json_line(
    writer: &mut BufWriter<io::StdoutLock<'_>>,
    payload: &Value,
) -> Result<(), Error> {
    serde_json::to_writer(&mut *writer, payload).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode MCP message")
            .with_source(err)
    })?;
    writer.write_all(b"\n").map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write MCP message")
            .with_source(err)
    })?;
    flush(writer)
}

fn flush(writer: &mut BufWriter<io::StdoutLock<'_>>) -> Result<(), Error> {
    writer.flush().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to flush MCP output")
            .with_source(err)
    })
}
