//! `prevue check`: run render cycles headlessly.
//!
//! The entry goes through the same pipeline as in the browser, with oxc as
//! the transpiler and an embedded QuickJS engine as the page runtime. With
//! `--watch` the executor follows the session and every outcome is
//! reported until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::actor::fs::FsActor;
use crate::config::PreviewConfig;
use crate::executor::IsolatedExecutor;
use crate::pipeline::{Pipeline, Timing};
use crate::preview::{ExecutionOutcome, OutcomeBoard, PreviewSession, RenderCycle};
use crate::runtime::{NativeLoader, OxcTranspiler, QuickJs, libraries};
use crate::source::scan_dir;

/// Slack on top of watchdog and settle before giving up on a report.
const REPORT_GRACE: Duration = Duration::from_secs(1);

type HeadlessExecutor = IsolatedExecutor<OxcTranspiler, QuickJs, NativeLoader>;

/// Result of a headless check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub cycle: RenderCycle,
    pub entry: Option<String>,
    pub address: String,
    pub outcome: ExecutionOutcome,
}

impl CheckReport {
    fn new(session: &PreviewSession, cycle: RenderCycle, outcome: ExecutionOutcome) -> Self {
        let selection = session.selection();
        Self {
            cycle,
            entry: selection.path,
            address: selection.address,
            outcome,
        }
    }

    pub const fn passed(&self) -> bool {
        !self.outcome.is_failure()
    }
}

/// Scan sources, check the current entry and print the report.
///
/// Returns whether the last reported check passed.
pub fn check_preview(config: &PreviewConfig, json: bool, watch: bool) -> Result<bool> {
    let watcher = super::start_watcher(config, watch)?;
    let sources = scan_dir(&config.source_dir(), &config.source)?;
    let session = Arc::new(PreviewSession::new(config.clone(), sources));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to create tokio runtime")?;

    match watcher {
        Some(watcher) => rt.block_on(watch_checks(session, watcher, |report| {
            emit(&report, json, false)
        })),
        None => {
            let report = rt.block_on(run_check(&session))?;
            emit(&report, json, true)?;
            Ok(report.passed())
        }
    }
}

fn headless_executor(config: &PreviewConfig) -> HeadlessExecutor {
    let pipeline = Pipeline::new(
        OxcTranspiler,
        QuickJs::new(config.preview.watchdog()),
        NativeLoader,
        libraries(&config.runtime),
        Timing::from_config(&config.preview),
    );
    IsolatedExecutor::new(pipeline, Arc::new(OutcomeBoard::new()))
}

/// Mount the session's current cycle and wait for its outcome.
pub async fn run_check(session: &PreviewSession) -> Result<CheckReport> {
    let config = session.config();
    let executor = headless_executor(config);

    let cycle = session.current();
    executor.mount(cycle, &session.document(cycle));

    let limit = config.preview.watchdog() + config.preview.settle() + REPORT_GRACE;
    let outcome = tokio::time::timeout(limit, executor.board().wait(cycle))
        .await
        .with_context(|| format!("cycle {cycle} reported no outcome within {limit:?}"))?
        .with_context(|| format!("cycle {cycle} was superseded"))?;

    Ok(CheckReport::new(session, cycle, outcome))
}

/// Check every cycle `watcher` starts, handing each outcome to `report`.
///
/// A cycle superseded before it reports is skipped. Returns once the
/// outcome board closes, with whether the last report passed.
pub async fn watch_checks(
    session: Arc<PreviewSession>,
    watcher: FsActor,
    mut report: impl FnMut(CheckReport) -> Result<()>,
) -> Result<bool> {
    let executor = Arc::new(headless_executor(session.config()));
    let mut states = executor.board().subscribe();

    let following = tokio::spawn(Arc::clone(&executor).follow(Arc::clone(&session)));
    let watching = tokio::spawn(watcher.run(Arc::clone(&session)));

    let mut passed = true;
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        let Some(outcome) = state.outcome else {
            continue;
        };
        let checked = CheckReport::new(&session, state.cycle, outcome);
        passed = checked.passed();
        if let Err(e) = report(checked) {
            following.abort();
            watching.abort();
            return Err(e);
        }
    }
    Ok(passed)
}

/// Print `report`, as JSON when `json` is set.
fn emit(report: &CheckReport, json: bool, pretty: bool) -> Result<()> {
    match (json, pretty) {
        (true, true) => println!("{}", serde_json::to_string_pretty(report)?),
        (true, false) => println!("{}", serde_json::to_string(report)?),
        (false, _) => print_report(report),
    }
    Ok(())
}

fn print_report(report: &CheckReport) {
    let entry = report.entry.as_deref().unwrap_or("-");
    match &report.outcome {
        ExecutionOutcome::Empty => {
            crate::log!("check"; "no entry file, placeholder shown");
        }
        ExecutionOutcome::Success => {
            crate::log!("check"; "{} {} ({})", "✓".green(), entry, report.address);
        }
        failure => {
            crate::log!("check"; "{} {}: {}", "✗".red(), entry, failure.title());
            if let Some(message) = failure.message() {
                eprintln!("{message}");
            }
            if let ExecutionOutcome::RuntimeError { line: Some(line), .. } = failure {
                eprintln!("  --> line {line}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::NO_COMPONENT;

    fn session(files: &[(&str, &str)]) -> PreviewSession {
        let mut config = PreviewConfig::default();
        config.preview.settle_ms = 1;
        PreviewSession::new(config, files.iter().map(|(p, s)| (*p, *s)).collect())
    }

    #[tokio::test]
    async fn test_check_mounts_default_export() {
        let session = session(&[(
            "app/page.tsx",
            "export default function Page() { return <h1>Hello</h1>; }",
        )]);
        let report = run_check(&session).await.unwrap();
        assert_eq!(report.outcome, ExecutionOutcome::Success);
        assert_eq!(report.entry.as_deref(), Some("app/page.tsx"));
        assert!(report.passed());
    }

    #[tokio::test]
    async fn test_check_reports_syntax_error() {
        let session = session(&[("page.jsx", "export default function ( {")]);
        let report = run_check(&session).await.unwrap();
        assert!(matches!(report.outcome, ExecutionOutcome::CompileError { .. }));
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn test_check_reports_missing_component() {
        let session = session(&[("page.tsx", "const helper = 1;")]);
        let report = run_check(&session).await.unwrap();
        assert_eq!(report.outcome, ExecutionOutcome::runtime(NO_COMPONENT, None));
    }

    #[tokio::test]
    async fn test_check_empty_sources() {
        let report = run_check(&session(&[])).await.unwrap();
        assert_eq!(report.outcome, ExecutionOutcome::Empty);
        assert!(report.passed());
        assert_eq!(report.entry, None);
    }

    async fn next_report(rx: &mut tokio::sync::mpsc::UnboundedReceiver<CheckReport>) -> CheckReport {
        tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_watch_reports_each_edit() {
        let temp = tempfile::TempDir::new().unwrap();
        let page = temp.path().join("page.tsx");
        std::fs::write(&page, "export default function Page() { return null; }").unwrap();

        let mut config = PreviewConfig::default();
        config.root = temp.path().to_path_buf();
        config.preview.settle_ms = 1;
        let watcher = FsActor::new(&config).unwrap();
        let sources = scan_dir(&config.source_dir(), &config.source).unwrap();
        let session = Arc::new(PreviewSession::new(config, sources));

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tokio::spawn(watch_checks(session, watcher, move |report| {
            let _ = tx.send(report);
            Ok(())
        }));

        let first = next_report(&mut rx).await;
        assert_eq!(first.cycle, RenderCycle::FIRST);
        assert_eq!(first.outcome, ExecutionOutcome::Success);

        std::fs::write(&page, "export default function ( {").unwrap();
        let second = next_report(&mut rx).await;
        assert!(second.cycle > RenderCycle::FIRST);
        assert!(matches!(second.outcome, ExecutionOutcome::CompileError { .. }));
    }

    #[test]
    fn test_report_json() {
        let report = CheckReport {
            cycle: RenderCycle::FIRST,
            entry: Some("page.tsx".into()),
            address: "localhost:3000/".into(),
            outcome: ExecutionOutcome::compile("Unexpected token"),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cycle"], 1);
        assert_eq!(json["outcome"]["kind"], "compile_error");
    }
}
