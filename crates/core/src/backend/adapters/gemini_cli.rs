//! Gemini backend implementation using JSON-RPC via stdio.
//!
//! This adapter spawns the `gemini-cli` process, submits one generation
//! request as a JSON-RPC message over stdin and converts the streamed
//! JSON-RPC responses on stdout into tagged [`Fragment`]s.

use crate::backend::base::{Backend, BackendError, Fragment, FragmentStream};
use async_trait::async_trait;
use prd_protocol::GenerationRequest;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_stream::StreamExt;

/// Backend adapter speaking to the Gemini CLI over stdin/stdout pipes.
pub struct GeminiCliBackend {
    /// Binary name or path of the CLI, normally "gemini-cli".
    binary: String,
}

impl GeminiCliBackend {
    pub fn new() -> Self {
        Self {
            binary: "gemini-cli".to_string(),
        }
    }

    /// Use a specific binary name or path instead of the default.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for GeminiCliBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for GeminiCliBackend {
    async fn check_availability(&self) -> bool {
        // The CLI must be on PATH and the API key configured.
        let cli_available = which::which(&self.binary).is_ok();
        let api_key_available = std::env::var("GEMINI_API_KEY").is_ok();

        cli_available && api_key_available
    }

    async fn issue(&self, request: &GenerationRequest) -> Result<FragmentStream, BackendError> {
        // 1. Spawn the CLI with stdin/stdout pipes
        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BackendError::Connect(format!("Failed to spawn {}: {}", self.binary, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| BackendError::Connect("Failed to capture stdin".to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BackendError::Connect("Failed to capture stdout".to_string()))?;

        // 2. Submit the generation request as one JSON-RPC message
        let rpc = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: "generateStream".to_string(),
            params: GenerateParams {
                model: request.model_id.clone(),
                system: request.system_instruction.clone(),
                prompt: request.prompt.clone(),
                thinking_budget: request.reasoning_budget,
            },
        };

        let request_str = serde_json::to_string(&rpc)
            .map_err(|e| BackendError::Connect(format!("Failed to serialize request: {}", e)))?;

        stdin
            .write_all(request_str.as_bytes())
            .await
            .map_err(|e| BackendError::Connect(format!("Failed to write to stdin: {}", e)))?;
        stdin
            .write_all(b"\n")
            .await
            .map_err(|e| BackendError::Connect(format!("Failed to write newline: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| BackendError::Connect(format!("Failed to flush stdin: {}", e)))?;

        // Close stdin to signal end of input
        drop(stdin);

        // 3. Convert streamed JSON-RPC responses into fragments
        let reader = BufReader::new(stdout);
        let lines = reader.lines();
        let lines_stream = tokio_stream::wrappers::LinesStream::new(lines);

        let fragments = lines_stream
            .map(|line_result| match line_result {
                Ok(line) => {
                    if line.trim().is_empty() {
                        return None;
                    }

                    match serde_json::from_str::<JsonRpcResponse>(&line) {
                        Ok(response) => convert_response(response),
                        Err(e) => Some(Err(BackendError::StreamParse(format!(
                            "Failed to parse JSON-RPC response: {} (line: {})",
                            e, line
                        )))),
                    }
                }
                Err(e) => Some(Err(BackendError::StreamParse(e.to_string()))),
            })
            .filter_map(|opt| opt);

        Ok(Box::pin(fragments))
    }
}

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: u32,
    method: String,
    params: GenerateParams,
}

/// Parameters for the generateStream method.
#[derive(Debug, Serialize)]
struct GenerateParams {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_budget: Option<u32>,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u32,
    result: Option<ResponseResult>,
    error: Option<JsonRpcError>,
}

/// One streamed generation result chunk.
#[derive(Debug, Deserialize)]
struct ResponseResult {
    #[serde(default)]
    text: Option<String>,

    /// True when the chunk belongs to the reasoning channel.
    #[serde(default)]
    thought: bool,

    /// True on the terminating chunk.
    #[serde(default)]
    done: bool,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Convert one JSON-RPC response line into a tagged fragment.
fn convert_response(response: JsonRpcResponse) -> Option<Result<Fragment, BackendError>> {
    if let Some(error) = response.error {
        return Some(Err(BackendError::Api(format!(
            "Gemini API error (code {}): {}",
            error.code, error.message
        ))));
    }

    let result = response.result?;
    if result.done {
        return None;
    }

    let text = result.text?;
    if text.is_empty() {
        return None;
    }

    if result.thought {
        Some(Ok(Fragment::Reasoning(text)))
    } else {
        Some(Ok(Fragment::Text(text)))
    }
}
