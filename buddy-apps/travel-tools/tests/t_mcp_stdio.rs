//!  Travel Buddy Tools
//!
//!  Copyright (C) 2026  Travel Buddy Contributors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! MCP server integration tests using subprocess with stdio transport.

#![cfg(test)]

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Once;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;

const TIMEOUT: Duration = Duration::from_secs(5);

const SERP_BIN: &str = env!("CARGO_BIN_EXE_travel-serp-mcp");
const FLIGHT_BIN: &str = env!("CARGO_BIN_EXE_travel-flight-mcp");

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_thread_ids(true)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
            .with_writer(std::io::stderr)
            .with_env_filter(EnvFilter::new("debug"))
            .init();
    });
}

fn load_schema_from_file(name: &str) -> Result<Value> {
    let schema_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("schemas")
        .join(name);
    let content = std::fs::read_to_string(&schema_path)
        .context(format!("Failed to read schema file: {:?}", schema_path))?;
    serde_json::from_str(&content)
        .context(format!("Failed to parse schema file: {:?}", schema_path))
}

struct McpSession {
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl McpSession {
    /// Spawns `bin stdio` with placeholder credentials and an unreachable upstream.
    fn spawn(bin: &str) -> Result<Self> {
        let mut child = Command::new(bin)
            .arg("stdio")
            .env("SERPAPI_KEY", "test-key")
            .env("CURRENCYFREAKS_API_KEY", "test-key")
            .env("SERPAPI_ENDPOINT", "http://127.0.0.1:9/search.json")
            .env("CURRENCYFREAKS_ENDPOINT", "http://127.0.0.1:9/rates")
            .env("KAYAK_BASE_URL", "http://127.0.0.1:9")
            .env("RUST_LOG", "warn")
            .stdout(Stdio::piped())
            .stdin(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context(format!("Failed to spawn {}", bin))?;

        let stdin = child.stdin.take().context("stdin")?;
        let stdout = BufReader::new(child.stdout.take().context("stdout")?).lines();
        Ok(Self {
            _child: child,
            stdin,
            stdout,
        })
    }

    async fn send(&mut self, message: Value) -> Result<()> {
        let mut line = message.to_string();
        line.push('\n');
        tracing::debug!("-> {}", line.trim_end());
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Next JSON-RPC response carrying `id`, skipping notifications.
    async fn response(&mut self, id: i64) -> Result<Value> {
        loop {
            let line = tokio::time::timeout(TIMEOUT, self.stdout.next_line())
                .await
                .context("Timed out waiting for server response")??
                .context("Server closed stdout")?;
            tracing::debug!("<- {}", line);
            let Ok(message) = serde_json::from_str::<Value>(&line) else {
                continue;
            };
            if message.get("id").and_then(Value::as_i64) == Some(id) {
                return Ok(message);
            }
        }
    }

    async fn initialize(&mut self) -> Result<Value> {
        self.send(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }
        }))
        .await?;
        let init = self.response(1).await?;
        self.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await?;
        Ok(init)
    }

    async fn list_tools(&mut self) -> Result<Vec<String>> {
        self.send(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
            .await?;
        let resp = self.response(2).await?;
        let tools = resp["result"]["tools"]
            .as_array()
            .context("tools/list result has no tools array")?;
        Ok(tools
            .iter()
            .filter_map(|t| t["name"].as_str().map(str::to_string))
            .collect())
    }

    /// Text content of a tool call result.
    async fn call_tool(&mut self, id: i64, name: &str, args: Value) -> Result<String> {
        self.send(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": args}
        }))
        .await?;
        let resp = self.response(id).await?;
        resp["result"]["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .context(format!("No text content in response: {}", resp))
    }
}

#[tokio::test]
async fn test_serp_server_initialize_and_list_tools() -> Result<()> {
    init_tracing();
    let mut session = McpSession::spawn(SERP_BIN)?;

    let init = session.initialize().await?;
    assert_eq!(init["jsonrpc"], "2.0");
    assert!(init["result"]["capabilities"]["tools"].is_object());

    let mut names = session.list_tools().await?;
    names.sort();
    assert_eq!(
        names,
        vec![
            "current_date",
            "find_hotel_detail",
            "get_latest_currency_rates",
            "search_events",
            "search_hotels",
            "search_places",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_serp_server_current_date() -> Result<()> {
    init_tracing();
    let mut session = McpSession::spawn(SERP_BIN)?;
    session.initialize().await?;

    let text = session.call_tool(3, "current_date", json!({})).await?;
    let value: Value = serde_json::from_str(&text)?;
    let schema = load_schema_from_file("current-date.json")?;
    let validator = jsonschema::Validator::new(&schema)?;
    let errors: Vec<String> = validator.iter_errors(&value).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "{:?} in {}", errors, value);
    Ok(())
}

#[tokio::test]
async fn test_serp_server_errors_stay_in_envelope() -> Result<()> {
    init_tracing();
    let mut session = McpSession::spawn(SERP_BIN)?;
    session.initialize().await?;

    // rejected before any request goes out
    let text = session
        .call_tool(
            4,
            "search_hotels",
            json!({
                "query": "Lisbon",
                "check_in_date": "2099-05-01",
                "check_out_date": "2099-05-04",
                "hotel_class": ["SIX_STAR"]
            }),
        )
        .await?;
    let value: Value = serde_json::from_str(&text)?;
    assert_eq!(value.as_object().map(|o| o.len()), Some(1));
    assert!(value["error"].as_str().unwrap().starts_with("Invalid hotel_class: SIX_STAR"));

    // unreachable upstream
    let text = session
        .call_tool(5, "get_latest_currency_rates", json!({"base": "USD"}))
        .await?;
    let value: Value = serde_json::from_str(&text)?;
    assert!(value["error"].as_str().unwrap().starts_with("API request failed"));
    Ok(())
}

#[tokio::test]
async fn test_flight_server_tool_and_validation() -> Result<()> {
    init_tracing();
    let mut session = McpSession::spawn(FLIGHT_BIN)?;
    session.initialize().await?;

    let names = session.list_tools().await?;
    assert_eq!(names, vec!["scrape_flights_tool"]);

    let text = session
        .call_tool(
            3,
            "scrape_flights_tool",
            json!({
                "departure_airport": "YYZ",
                "arrival_airport": "HKG",
                "departure_date": "2099-07-01",
                "start_index": 4,
                "end_index": 2
            }),
        )
        .await?;
    assert_eq!(
        text,
        "end_index must be an integer greater than or equal to start_index."
    );

    let text = session
        .call_tool(
            4,
            "scrape_flights_tool",
            json!({
                "departure_airport": "YYZ",
                "arrival_airport": "HKG",
                "departure_date": "2099-07-01"
            }),
        )
        .await?;
    assert!(text.starts_with("Error fetching flight data: "), "{}", text);
    assert!(text.ends_with("\nTotal results: 0"), "{}", text);
    Ok(())
}

#[tokio::test]
async fn test_mcp_help_output() -> Result<()> {
    init_tracing();
    for (bin, name) in [(SERP_BIN, "travel-serp-mcp"), (FLIGHT_BIN, "travel-flight-mcp")] {
        let output = Command::new(bin).arg("--help").output().await?;
        assert!(output.status.success(), "Help should succeed");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(name), "Help should show binary name");
        assert!(stdout.contains("stdio"), "Help should show stdio command");
        assert!(stdout.contains("http"), "Help should show http command");
    }
    Ok(())
}

#[tokio::test]
async fn test_mcp_version_output() -> Result<()> {
    init_tracing();
    let output = Command::new(SERP_BIN).arg("--version").output().await?;
    assert!(output.status.success(), "Version should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[tokio::test]
async fn test_serp_server_requires_api_keys() -> Result<()> {
    init_tracing();
    let output = Command::new(SERP_BIN)
        .arg("stdio")
        .env_remove("SERPAPI_KEY")
        .env_remove("CURRENCYFREAKS_API_KEY")
        .stdin(Stdio::null())
        .output()
        .await?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--serpapi-key"), "{}", stderr);
    Ok(())
}
