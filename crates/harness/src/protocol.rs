//! Bridge protocol between a test page and the host.
//!
//! The page driver writes one JSON envelope per line on stdout:
//! `{"v":1,"type":"testDone","report":{...}}`. The completion hook inside
//! the page produces the `testDone` and `finished` payloads; everything else
//! comes from the driver itself. The host only depends on this schema, never
//! on the in-page test framework.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HarnessError, HarnessResult};

/// Envelope version understood by this host
pub const PROTOCOL_VERSION: u64 = 1;

/// One failed check inside a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
}

/// Outcome of one test case that had at least one failing check (`reportTestDone`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub name: String,
    #[serde(default)]
    pub module: String,
    pub failed: u32,
    pub total: u32,
    #[serde(default)]
    pub assertions: Vec<AssertionFailure>,
}

/// Aggregate counts for a finished document (`reportFinished`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFinished {
    pub failed: u32,
    pub passed: u32,
    pub total: u32,
    /// Milliseconds
    pub runtime: u64,
}

/// Everything a page session can report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageEvent {
    /// Browser is up and the bridge functions are registered
    Ready,
    LaunchFailed {
        message: String,
    },
    Console {
        level: String,
        text: String,
    },
    PageError {
        message: String,
    },
    /// The document fired `load`
    Loaded,
    NavigationFailed {
        #[serde(default)]
        status: Option<u16>,
        message: String,
    },
    TestDone {
        report: TestReport,
    },
    Finished {
        context: RunFinished,
    },
}

/// Decode one line of driver output.
///
/// Returns `Ok(None)` for lines that are not protocol envelopes (stray
/// output from the driver's dependencies).
pub fn decode_line(line: &str) -> HarnessResult<Option<PageEvent>> {
    let line = line.trim();
    if !line.starts_with('{') {
        return Ok(None);
    }

    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(line) else {
        return Ok(None);
    };
    if !fields.contains_key("type") {
        return Ok(None);
    }

    match fields.remove("v").and_then(|v| v.as_u64()) {
        Some(PROTOCOL_VERSION) => {}
        Some(other) => {
            return Err(HarnessError::Protocol(format!(
                "unsupported envelope version {} (expected {})",
                other, PROTOCOL_VERSION
            )))
        }
        None => return Err(HarnessError::Protocol("envelope without version".into())),
    }

    serde_json::from_value(Value::Object(fields))
        .map(Some)
        .map_err(|e| HarnessError::Protocol(format!("malformed envelope: {}", e)))
}
