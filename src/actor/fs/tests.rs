use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::batch::{COOLDOWN, ChangeBatch, QUIET_PERIOD};
use super::{FsActor, is_source_change, rescan};
use crate::config::{PreviewConfig, SourceConfig};
use crate::preview::{PreviewSession, RenderCycle};
use crate::source::scan_dir;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn config_for(temp: &TempDir) -> PreviewConfig {
    let mut config = PreviewConfig::default();
    config.root = temp.path().to_path_buf();
    config
}

fn session_for(temp: &TempDir) -> Arc<PreviewSession> {
    let config = config_for(temp);
    let sources = scan_dir(&config.source_dir(), &config.source).unwrap();
    Arc::new(PreviewSession::new(config, sources))
}

fn any_path(_: &Path) -> bool {
    true
}

#[test]
fn test_empty_batch_is_never_due() {
    let mut batch = ChangeBatch::default();
    assert_eq!(batch.due(), None);
    assert_eq!(batch.release(Instant::now()), None);
}

#[test]
fn test_every_content_event_kind_is_recorded() {
    let now = Instant::now();
    let mut batch = ChangeBatch::default();
    batch.record(&make_event(vec!["/p/a.tsx"], create_kind()), now, any_path);
    batch.record(&make_event(vec!["/p/b.tsx"], modify_kind()), now, any_path);
    batch.record(&make_event(vec!["/p/c.tsx"], remove_kind()), now, any_path);

    let paths = batch.release(now + QUIET_PERIOD).unwrap();
    assert_eq!(
        paths,
        ["/p/a.tsx", "/p/b.tsx", "/p/c.tsx"].map(PathBuf::from)
    );
}

#[test]
fn test_repeated_path_is_released_once() {
    let now = Instant::now();
    let mut batch = ChangeBatch::default();
    batch.record(&make_event(vec!["/p/a.tsx"], create_kind()), now, any_path);
    batch.record(&make_event(vec!["/p/./a.tsx"], remove_kind()), now, any_path);
    assert_eq!(batch.release(now + QUIET_PERIOD).unwrap().len(), 1);
}

#[test]
fn test_metadata_change_ignored() {
    let mut batch = ChangeBatch::default();
    let kind = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));
    batch.record(&make_event(vec!["/p/page.tsx"], kind), Instant::now(), any_path);
    assert_eq!(batch.due(), None);
}

#[test]
fn test_editor_artifacts_ignored() {
    let mut batch = ChangeBatch::default();
    batch.record(
        &make_event(vec!["/p/page.tsx~", "/p/.page.tsx.swp", "/p/page.tsx.bak"], modify_kind()),
        Instant::now(),
        any_path,
    );
    assert_eq!(batch.due(), None);
}

#[test]
fn test_irrelevant_paths_ignored() {
    let mut batch = ChangeBatch::default();
    batch.record(
        &make_event(vec!["/p/README.md"], modify_kind()),
        Instant::now(),
        |path| path.extension().is_some_and(|e| e == "tsx"),
    );
    assert_eq!(batch.due(), None);
}

#[test]
fn test_release_waits_for_quiet_period() {
    let start = Instant::now();
    let mut batch = ChangeBatch::default();
    batch.record(&make_event(vec!["/p/a.tsx"], modify_kind()), start, any_path);

    // Saving the same file again pushes the release back
    let later = start + QUIET_PERIOD / 2;
    batch.record(&make_event(vec!["/p/a.tsx"], modify_kind()), later, any_path);
    batch.record(&make_event(vec!["/p/b.tsx"], modify_kind()), later, any_path);
    assert_eq!(batch.due(), Some(later + QUIET_PERIOD));
    assert_eq!(batch.release(start + QUIET_PERIOD), None);

    assert_eq!(batch.release(later + QUIET_PERIOD).unwrap().len(), 2);
    assert_eq!(batch.due(), None);
}

#[test]
fn test_cooldown_follows_a_release() {
    let start = Instant::now();
    let mut batch = ChangeBatch::default();
    batch.record(&make_event(vec!["/p/a.tsx"], modify_kind()), start, any_path);
    let released = start + QUIET_PERIOD;
    assert!(batch.release(released).is_some());

    batch.record(&make_event(vec!["/p/a.tsx"], modify_kind()), released, any_path);
    assert_eq!(batch.due(), Some(released + COOLDOWN));
    assert_eq!(batch.release(released + QUIET_PERIOD), None);
    assert!(batch.release(released + COOLDOWN).is_some());
}

#[test]
fn test_source_change_filter() {
    let root = Path::new("/project");
    let config = SourceConfig::default();

    assert!(is_source_change(Path::new("/project/app/page.tsx"), root, &config));
    assert!(is_source_change(Path::new("/project/app/dashboard"), root, &config));
    assert!(!is_source_change(Path::new("/project/README.md"), root, &config));
    assert!(!is_source_change(
        Path::new("/project/node_modules/react/index.js"),
        root,
        &config
    ));
    assert!(!is_source_change(Path::new("/elsewhere/page.tsx"), root, &config));
}

#[tokio::test]
async fn test_rescan_starts_cycle_on_edit() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app/page.tsx", "export default function A() {}");
    let session = session_for(&temp);

    write(temp.path(), "app/page.tsx", "export default function B() {}");
    assert_eq!(rescan(&session).await, Some(RenderCycle::new(2)));
    assert!(session.snapshot().sources.get("app/page.tsx").unwrap().contains("B()"));
}

#[tokio::test]
async fn test_rescan_without_change_starts_nothing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "page.jsx", "export default () => null");
    let session = session_for(&temp);

    assert_eq!(rescan(&session).await, None);
    assert_eq!(session.current(), RenderCycle::FIRST);
}

#[tokio::test]
async fn test_events_before_run_are_buffered() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app/page.tsx", "export default function A() {}");
    let actor = FsActor::new(&config_for(&temp)).unwrap();

    // Events arriving before run are buffered, not lost
    let session = session_for(&temp);
    let mut ticks = session.controller().subscribe();
    write(temp.path(), "app/page.tsx", "export default function B() {}");
    tokio::spawn(actor.run(Arc::clone(&session)));

    tokio::time::timeout(Duration::from_secs(10), ticks.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(session.snapshot().sources.get("app/page.tsx").unwrap().contains("B()"));
}
