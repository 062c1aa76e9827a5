//! Test doubles shared by the bridge tests.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::core::error::BridgeError;
use crate::core::executor::{Invocation, ProcessRunner};

enum Scripted {
    Stdout(String),
    SpawnError(io::ErrorKind),
    Timeout,
    Exit(Option<i32>, String),
}

/// A [`ProcessRunner`] that replays canned outcomes and records invocations.
pub struct ScriptedRunner {
    name: String,
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn push(self, response: Scripted) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
        self
    }

    /// Queues a successful run printing `stdout`.
    pub fn respond_ok(self, stdout: &str) -> Self {
        self.push(Scripted::Stdout(stdout.to_string()))
    }

    /// Queues a version answer followed by one envelope with `result`.
    pub fn available_then_result(self, result: &str) -> Self {
        self.respond_ok("1.0.0 (Claude Code)")
            .respond_ok(&envelope_json(result))
    }

    /// Queues a failure to start the process.
    pub fn respond_spawn_error(self, kind: io::ErrorKind) -> Self {
        self.push(Scripted::SpawnError(kind))
    }

    /// Queues a deadline expiry.
    pub fn respond_timeout(self) -> Self {
        self.push(Scripted::Timeout)
    }

    /// Queues an unsuccessful exit.
    pub fn respond_exit(self, code: Option<i32>, stderr: &str) -> Self {
        self.push(Scripted::Exit(code, stderr.to_string()))
    }

    /// Returns every invocation received so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn execute(&self, invocation: &Invocation) -> Result<String, BridgeError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        match next {
            Some(Scripted::Stdout(stdout)) => Ok(stdout),
            Some(Scripted::SpawnError(kind)) => Err(BridgeError::Spawn {
                executable: self.name.clone(),
                source: io::Error::from(kind),
            }),
            Some(Scripted::Timeout) => Err(BridgeError::Timeout {
                executable: self.name.clone(),
                deadline_ms: invocation.deadline.map_or(0, |d| d.as_millis()),
            }),
            Some(Scripted::Exit(code, stderr)) => Err(BridgeError::Process {
                executable: self.name.clone(),
                code,
                stderr,
            }),
            None => Err(BridgeError::Process {
                executable: self.name.clone(),
                code: None,
                stderr: "no scripted response left".to_string(),
            }),
        }
    }

    fn executable(&self) -> String {
        self.name.clone()
    }
}

/// Builds a successful envelope the way the tool prints it.
pub fn envelope_json(result: &str) -> String {
    json!({
        "type": "result",
        "subtype": "success",
        "cost_usd": 0.0123,
        "is_error": false,
        "duration_ms": 4210,
        "duration_api_ms": 4000,
        "num_turns": 1,
        "result": result,
        "session_id": "3f2c9a6e-session",
    })
    .to_string()
}
