//! Completion hook tests
//!
//! Runs the injected hook under Node.js against a stub `window` and QUnit,
//! capturing what reaches the bridge functions. Skipped when `node` is not
//! on PATH.

use std::io::Write;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::process::Command;

use deckhand_harness::playwright::HOOK_SOURCE;
use deckhand_harness::{RunFinished, TestReport};

/// Stub page: records bridge calls and console errors, prints them on exit
const PAGE: &str = r#"
var sent = { testDone: [], finished: [], errors: [] };
var callbacks = {};
var listeners = [];
globalThis.window = globalThis;
globalThis.document = { readyState: 'complete' };
window.addEventListener = function (type, fn) {
  if (type === 'load') listeners.push(fn);
};
console.error = function () {
  sent.errors.push(Array.prototype.map.call(arguments, String).join(' '));
};
window.reportTestDone = function (report) { sent.testDone.push(report); };
window.reportFinished = function (context) { sent.finished.push(context); };
function fakeQUnit() {
  return {
    config: {},
    dump: {
      parse: function (v) { return v === undefined ? 'undefined' : JSON.stringify(v); }
    },
    log: function (fn) { callbacks.log = fn; },
    testDone: function (fn) { callbacks.testDone = fn; },
    done: function (fn) { callbacks.done = fn; }
  };
}
process.on('exit', function () {
  require('fs').writeSync(1, JSON.stringify(sent));
});
"#;

fn in_path(bin: &str) -> bool {
    std::process::Command::new(bin)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run `hook` in the stub page between `setup` and `drive`
async fn run_hook(hook: &str, setup: &str, drive: &str) -> Value {
    let mut script = tempfile::Builder::new().suffix(".js").tempfile().unwrap();
    writeln!(script, "{}\n{};\n{}\n;{}", PAGE, setup, hook, drive).unwrap();
    script.flush().unwrap();

    let output = tokio::time::timeout(
        Duration::from_secs(10),
        Command::new("node").arg(script.path()).output(),
    )
    .await
    .expect("hook kept the page alive")
    .unwrap();

    assert!(
        output.status.success(),
        "node failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[tokio::test]
async fn test_only_failing_tests_are_reported_in_order() {
    if !in_path("node") {
        eprintln!("Skipping: node not available in PATH");
        return;
    }

    let sent = run_hook(
        HOOK_SOURCE,
        "window.QUnit = fakeQUnit();",
        r#"
        sent.testTimeout = window.QUnit.config.testTimeout;
        callbacks.log({ result: true, message: 'ok', expected: 1, actual: 1 });
        callbacks.testDone({ name: 'passes', module: 'Reveal', failed: 0, total: 1 });
        callbacks.log({ result: false, message: 'x is 5', expected: 5, actual: undefined });
        callbacks.log({ result: false, message: 'same title', expected: 'a', actual: 'b' });
        callbacks.log({ result: false, message: 'threw' });
        callbacks.testDone({ name: 'slide()', module: 'Reveal', failed: 3, total: 4 });
        callbacks.done({ failed: 3, passed: 2, total: 5, runtime: 41.6 });
        "#,
    )
    .await;

    assert_eq!(sent["testTimeout"], 60000);
    assert_eq!(sent["errors"], json!([]));

    let reports: Vec<TestReport> = serde_json::from_value(sent["testDone"].clone()).unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!((report.name.as_str(), report.module.as_str()), ("slide()", "Reveal"));
    assert_eq!((report.failed, report.total), (3, 4));

    let assertions: Vec<_> = report
        .assertions
        .iter()
        .map(|a| (a.message.as_str(), a.expected.as_deref(), a.actual.as_deref()))
        .collect();
    assert_eq!(
        assertions,
        vec![
            ("x is 5", Some("5"), Some("undefined")),
            ("same title", Some("\"a\""), Some("\"b\"")),
            ("threw", None, None),
        ]
    );

    let finished: Vec<RunFinished> = serde_json::from_value(sent["finished"].clone()).unwrap();
    assert_eq!(
        finished,
        vec![RunFinished {
            failed: 3,
            passed: 2,
            total: 5,
            runtime: 42,
        }]
    );
}

#[tokio::test]
async fn test_waits_for_load_then_polls_for_qunit() {
    if !in_path("node") {
        eprintln!("Skipping: node not available in PATH");
        return;
    }

    let sent = run_hook(
        HOOK_SOURCE,
        "document.readyState = 'loading';",
        r#"
        sent.listenersBeforeLoad = listeners.length;
        setTimeout(function () {
          sent.installedAtLoad = typeof callbacks.done === 'function';
          listeners.forEach(function (fn) { fn(); });
        }, 20);
        setTimeout(function () { window.QUnit = fakeQUnit(); }, 80);
        setTimeout(function () {
          callbacks.done({ failed: 0, passed: 7, total: 7, runtime: 12 });
        }, 250);
        "#,
    )
    .await;

    assert_eq!(sent["listenersBeforeLoad"], 1);
    assert_eq!(sent["installedAtLoad"], false);
    assert_eq!(
        sent["finished"],
        json!([{ "failed": 0, "passed": 7, "total": 7, "runtime": 12 }])
    );
    assert_eq!(sent["errors"], json!([]));
}

#[tokio::test]
async fn test_polling_gives_up_after_its_limit() {
    if !in_path("node") {
        eprintln!("Skipping: node not available in PATH");
        return;
    }
    assert!(HOOK_SOURCE.contains("POLL_LIMIT_MS = 60000"));
    let hook = HOOK_SOURCE.replace("POLL_LIMIT_MS = 60000", "POLL_LIMIT_MS = 100");

    // the page only exits once the poll timer is cleared
    let sent = run_hook(&hook, "", "").await;

    assert_eq!(sent["finished"], json!([]));
    let errors = sent["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("QUnit not found after 100ms"));
}

#[tokio::test]
async fn test_install_failure_is_contained() {
    if !in_path("node") {
        eprintln!("Skipping: node not available in PATH");
        return;
    }

    let sent = run_hook(
        HOOK_SOURCE,
        r#"
        window.QUnit = fakeQUnit();
        window.QUnit.log = function () { throw new Error('boom'); };
        "#,
        "sent.reachedEnd = true;",
    )
    .await;

    assert_eq!(sent["reachedEnd"], true);
    assert_eq!(sent["finished"], json!([]));
    let errors = sent["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("completion hook failed"));
}
