use super::*;
use super::boundary::Surface;
use crate::config::RuntimeConfig;
use crate::preview::{OutcomeBoard, RenderCycle};
use crate::runtime::testing::ScriptedLoader;
use crate::runtime::{OxcTranspiler, QuickJs, libraries};
use std::sync::atomic::Ordering;
use tokio::time::Instant;

const ENTRY: &str = "app/page.tsx";

fn timing() -> Timing {
    Timing {
        watchdog: Duration::from_millis(5000),
        settle: Duration::from_millis(100),
    }
}

fn pipeline(loader: ScriptedLoader) -> Pipeline<OxcTranspiler, QuickJs, ScriptedLoader> {
    Pipeline::new(
        OxcTranspiler,
        QuickJs::default(),
        loader,
        libraries(&RuntimeConfig::default()),
        timing(),
    )
}

fn boundary() -> Boundary {
    Boundary::new(RenderCycle::FIRST, Arc::new(OutcomeBoard::new()))
}

#[tokio::test(start_paused = true)]
async fn test_default_export_mounts_and_loader_leaves_within_settle() {
    let b = boundary();
    let start = Instant::now();
    pipeline(ScriptedLoader::new())
        .run(&b, ENTRY, "export default function App() { return <h1>hi</h1>; }")
        .await;

    assert_eq!(start.elapsed(), Duration::from_millis(100));
    assert_eq!(b.outcome(), Some(ExecutionOutcome::Success));
    assert_eq!(b.loader(), Loader::Removed);
    assert_eq!(
        b.surface(),
        Surface::Mounted {
            component: "default".into()
        }
    );
    assert_eq!(
        b.stages(),
        [
            Stage::Loading,
            Stage::Transpiling,
            Stage::Executing,
            Stage::ComponentResolution,
            Stage::Mounted,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_loader_still_visible_until_settled() {
    let b = Arc::new(boundary());
    let running = Arc::clone(&b);
    let task = tokio::spawn(async move {
        pipeline(ScriptedLoader::new())
            .run(&running, ENTRY, "export default function App() {}")
            .await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(b.loader(), Loader::Visible);
    assert!(matches!(b.surface(), Surface::Mounted { .. }));
    assert_eq!(b.outcome(), None);

    task.await.unwrap();
    assert_eq!(b.loader(), Loader::Removed);
}

#[tokio::test(start_paused = true)]
async fn test_syntax_error_is_compile_error_with_diagnostic() {
    let source = "export default function App( { return <div>; }";
    let expected = OxcTranspiler.transpile(ENTRY, source).unwrap_err().to_string();

    let b = boundary();
    pipeline(ScriptedLoader::new()).run(&b, ENTRY, source).await;

    assert_eq!(b.outcome(), Some(ExecutionOutcome::compile(expected)));
    assert_eq!(b.loader(), Loader::Hidden);
    assert_eq!(
        b.stages(),
        [Stage::Loading, Stage::Transpiling, Stage::Failed]
    );
    assert!(matches!(b.surface(), Surface::Panel { title: "Compile Error", .. }));
}

#[tokio::test(start_paused = true)]
async fn test_no_component_message_is_exact() {
    let b = boundary();
    pipeline(ScriptedLoader::new())
        .run(&b, ENTRY, "const answer = 42;\nfunction helper() { return answer; }")
        .await;

    assert_eq!(
        b.outcome(),
        Some(ExecutionOutcome::runtime(
            "No component found — must export a component",
            None
        ))
    );
    assert_eq!(b.loader(), Loader::Hidden);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_scan_picks_lexically_first() {
    let b = boundary();
    pipeline(ScriptedLoader::new())
        .run(
            &b,
            ENTRY,
            "function Zoo() { return null; }\nfunction Card() { return null; }",
        )
        .await;
    assert_eq!(
        b.surface(),
        Surface::Mounted {
            component: "Card".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_thrown_fault_is_runtime_error_with_line() {
    let b = boundary();
    pipeline(ScriptedLoader::new())
        .run(&b, "app/page.jsx", "const a = 1;\nthrow new Error('exploded');")
        .await;

    assert_eq!(
        b.outcome(),
        Some(ExecutionOutcome::runtime("exploded", Some(2)))
    );
    assert!(matches!(
        b.surface(),
        Surface::Panel { title: "Runtime Error", line: Some(2), .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_render_fault_is_runtime_error() {
    let b = boundary();
    pipeline(ScriptedLoader::new())
        .run(
            &b,
            ENTRY,
            "export default function App() {\n  throw new Error('failed to render');\n}",
        )
        .await;

    assert_eq!(
        b.outcome(),
        Some(ExecutionOutcome::runtime("failed to render", Some(2)))
    );
    assert_eq!(
        b.stages(),
        [
            Stage::Loading,
            Stage::Transpiling,
            Stage::Executing,
            Stage::ComponentResolution,
            Stage::Failed,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reference_error_is_runtime_error() {
    let b = boundary();
    pipeline(ScriptedLoader::new())
        .run(
            &b,
            ENTRY,
            "missingHelper();\nexport default function App() { return null; }",
        )
        .await;

    let Some(ExecutionOutcome::RuntimeError { message, line }) = b.outcome() else {
        panic!("expected a runtime error, got {:?}", b.outcome());
    };
    assert!(message.contains("missingHelper"), "{message}");
    assert_eq!(line, Some(1));
    assert_eq!(b.loader(), Loader::Hidden);
    assert_eq!(
        b.stages(),
        [Stage::Loading, Stage::Transpiling, Stage::Executing, Stage::Failed]
    );
}

#[tokio::test(start_paused = true)]
async fn test_factory_returned_default_export_mounts() {
    let b = boundary();
    pipeline(ScriptedLoader::new())
        .run(
            &b,
            ENTRY,
            "function make() { return function Page() { return null; }; }\nexport default make();",
        )
        .await;

    assert_eq!(b.outcome(), Some(ExecutionOutcome::Success));
    assert_eq!(
        b.surface(),
        Surface::Mounted {
            component: "default".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_library_failure_names_the_library() {
    let loader = ScriptedLoader::new()
        .delay(Library::ReactDom, 30)
        .fail(Library::ReactDom);
    let b = boundary();
    pipeline(loader)
        .run(&b, ENTRY, "export default function App() {}")
        .await;

    assert_eq!(
        b.outcome(),
        Some(ExecutionOutcome::runtime("Failed to load ReactDOM", None))
    );
    assert_eq!(b.loader(), Loader::Hidden);
    assert_eq!(b.stages(), [Stage::Loading, Stage::Failed]);
}

#[tokio::test(start_paused = true)]
async fn test_loading_waits_for_every_library() {
    let loader = ScriptedLoader::new()
        .fail(Library::React)
        .delay(Library::React, 10)
        .delay(Library::Babel, 50);
    let b = boundary();
    let start = Instant::now();
    pipeline(loader)
        .run(&b, ENTRY, "export default function App() {}")
        .await;

    assert_eq!(start.elapsed(), Duration::from_millis(50));
    assert_eq!(
        b.outcome(),
        Some(ExecutionOutcome::runtime("Failed to load React", None))
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_transpiler_after_loading() {
    let loader = ScriptedLoader::new().undefined(Library::Babel);
    let b = boundary();
    pipeline(loader)
        .run(&b, ENTRY, "export default function App() {}")
        .await;

    assert_eq!(
        b.outcome(),
        Some(ExecutionOutcome::compile("required libraries unavailable"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_tailwind_global_is_not_fatal() {
    let loader = ScriptedLoader::new().undefined(Library::Tailwind);
    let b = boundary();
    pipeline(loader)
        .run(&b, ENTRY, "export default function App() {}")
        .await;
    assert_eq!(b.outcome(), Some(ExecutionOutcome::Success));
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_hides_loader_while_loading_hangs() {
    let loader = ScriptedLoader::new().delay(Library::Babel, 8000);
    let calls = loader.calls();
    let b = Arc::new(boundary());
    let running = Arc::clone(&b);
    let task = tokio::spawn(async move {
        pipeline(loader)
            .run(&running, ENTRY, "export default function App() {}")
            .await;
    });

    tokio::time::sleep(Duration::from_millis(5001)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(b.loader(), Loader::Hidden);
    assert_eq!(b.outcome(), None);

    // The watchdog never ends the pipeline; it still mounts later.
    task.await.unwrap();
    assert_eq!(b.outcome(), Some(ExecutionOutcome::Success));
    assert_eq!(b.loader(), Loader::Hidden);
}
