//! Tests for the catalog loader module.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

use diplomacy_core::StaticRoster;
use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind};
use notify::{Event, EventKind};
use tempfile::TempDir;

use super::watcher::{touches_source, watch_targets};
use super::*;
use crate::error::{DiplomacyError, ErrorKind};

const PRIMARY_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<DiplomacyData>
  <Diplomacy target="bandits">
    <ForceWarPeaceBehaviour>
      <ForcedWarSpecial flag="all" but_0="clan_b"/>
    </ForceWarPeaceBehaviour>
  </Diplomacy>
  <Diplomacy target="rebels">
    <ForceNoKingdom>true</ForceNoKingdom>
  </Diplomacy>
</DiplomacyData>
"#;

const SUBMOD_A_XML: &str = r#"<DiplomacyData>
  <Diplomacy target="pirates"/>
  <Diplomacy target="bandits"><ForceNoKingdom>true</ForceNoKingdom></Diplomacy>
  <Diplomacy target="raiders"/>
</DiplomacyData>
"#;

const SUBMOD_B_XML: &str = r#"<DiplomacyData>
  <Diplomacy target="nomads"/>
</DiplomacyData>
"#;

fn roster() -> Arc<StaticRoster> {
    Arc::new(StaticRoster::from_ids(
        ["clan_a", "clan_b", "clan_c"],
        ["kingdom_1", "kingdom_2"],
    ))
}

fn write_submod(root: &Path, name: &str, xml: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Diplomacy.xml"), xml).unwrap();
    dir
}

/// Primary document plus two sub-mods, one of which redefines `bandits`.
fn fixture() -> (TempDir, SourceSet) {
    let dir = TempDir::new().expect("create tempdir");
    let primary = dir.path().join("Diplomacy.xml");
    fs::write(&primary, PRIMARY_XML).unwrap();
    let a = write_submod(dir.path(), "mod_a", SUBMOD_A_XML);
    let b = write_submod(dir.path(), "mod_b", SUBMOD_B_XML);
    let sources = SourceSet::new(Some(primary))
        .with_secondary_dir(&a)
        .with_secondary_dir(&b);
    (dir, sources)
}

fn loader_with(sources: SourceSet) -> (Arc<CollectingReporter>, CatalogLoader) {
    let reporter = Arc::new(CollectingReporter::new());
    let loader = CatalogLoader::new(sources, roster()).with_reporter(reporter.clone());
    (reporter, loader)
}

#[test]
fn merges_primary_then_secondaries_in_order() {
    let (_dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    let summary = loader.initialize();

    let catalog = loader.catalog();
    let keys: Vec<_> = catalog.keys().collect();
    assert_eq!(keys, vec!["bandits", "rebels", "pirates", "raiders", "nomads"]);
    assert_eq!(summary.rule_count, 5);
    assert_eq!(summary.sources.len(), 3);
    assert_eq!(summary.sources[0].role, SourceRole::Primary);
}

#[test]
fn duplicate_key_keeps_first_and_reports_once() {
    let (_dir, sources) = fixture();
    let (reporter, loader) = loader_with(sources);
    let summary = loader.initialize();

    assert_eq!(reporter.count(ErrorKind::DuplicateKey), 1);
    assert_eq!(reporter.len(), 1);

    // Primary's definition wins: it has a forced war block and no kingdom flag.
    let catalog = loader.catalog();
    let bandits = catalog.get("bandits").unwrap();
    assert!(bandits.forced_war_peace.is_some());
    assert!(bandits.force_no_parent_group.is_none());

    // The rest of the conflicting document still loaded.
    assert!(catalog.contains_key("raiders"));

    let (source, failure) = summary.entry_failures().next().unwrap();
    assert!(source.path.ends_with("mod_a/Diplomacy.xml"));
    assert_eq!(failure.index, 1);
    assert_eq!(failure.target.as_deref(), Some("bandits"));
    assert_eq!(summary.error_count(), 1);

    let report = &reporter.reports()[0];
    assert!(report.context.starts_with("Diplomacy Data Parsing of "));
    assert!(report.context.contains("mod_a"));
}

#[test]
fn forced_war_expanded_against_roster() {
    let (_dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    let catalog = loader.catalog();

    let fwp = catalog.get("bandits").unwrap().forced_war_peace.as_ref().unwrap();
    let at_war: Vec<_> = fwp.at_war_entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(at_war, vec!["clan_a", "clan_c"]);
    assert!(fwp.exception_groups.is_empty());
    assert_eq!(catalog.get("rebels").unwrap().force_no_parent_group, Some(true));
}

#[test]
fn missing_secondary_is_skipped_silently() {
    let (dir, sources) = fixture();
    let sources = sources.with_secondary_dir(dir.path().join("not_installed"));
    let (reporter, loader) = loader_with(sources);
    let summary = loader.initialize();

    let last = summary.sources.last().unwrap();
    assert!(matches!(last.status, SourceStatus::Skipped { .. }));
    assert_eq!(reporter.count(ErrorKind::SourceUnreadable), 0);
    assert_eq!(loader.catalog().len(), 5);
}

#[test]
fn missing_primary_is_reported() {
    let dir = TempDir::new().unwrap();
    let b = write_submod(dir.path(), "mod_b", SUBMOD_B_XML);
    let sources = SourceSet::new(Some(dir.path().join("absent.xml"))).with_secondary_dir(&b);
    let (reporter, loader) = loader_with(sources);
    let summary = loader.initialize();

    assert_eq!(reporter.count(ErrorKind::SourceUnreadable), 1);
    assert!(matches!(summary.sources[0].status, SourceStatus::Failed { .. }));
    assert_eq!(loader.catalog().keys().collect::<Vec<_>>(), vec!["nomads"]);
}

#[test]
fn malformed_source_contributes_nothing_and_load_continues() {
    let (dir, sources) = fixture();
    let broken = write_submod(dir.path(), "broken", "<DiplomacyData><Diplomacy target=\"x\">");
    let sources = sources.with_secondary_dir(&broken);
    let (reporter, loader) = loader_with(sources);
    let summary = loader.initialize();

    assert_eq!(reporter.count(ErrorKind::SourceUnreadable), 1);
    assert!(!loader.catalog().contains_key("x"));
    assert_eq!(summary.rule_count, 5);
    assert!(!summary.is_clean());
}

#[test]
fn invalid_entry_does_not_abort_its_source() {
    let dir = TempDir::new().unwrap();
    let primary = dir.path().join("Diplomacy.xml");
    fs::write(
        &primary,
        r#"<Root>
            <Diplomacy target="first"/>
            <Diplomacy/>
            <Diplomacy target="bad"><ForceNoKingdom>maybe</ForceNoKingdom></Diplomacy>
            <Diplomacy target="last"/>
        </Root>"#,
    )
    .unwrap();
    let (reporter, loader) = loader_with(SourceSet::new(Some(primary)));
    let summary = loader.initialize();

    assert_eq!(reporter.count(ErrorKind::MissingRequiredField), 1);
    assert_eq!(reporter.count(ErrorKind::InvalidBooleanLiteral), 1);
    assert_eq!(loader.catalog().keys().collect::<Vec<_>>(), vec!["first", "last"]);

    let indices: Vec<_> = summary.entry_failures().map(|(_, f)| f.index).collect();
    assert_eq!(indices, vec![1, 2]);
}

#[test]
fn reset_then_initialize_rebuilds_identical_catalog() {
    let (_dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    loader.initialize();
    let before = loader.catalog();

    loader.reset();
    assert!(!loader.is_initialized());
    // Views handed out before the reset stay usable.
    assert_eq!(before.len(), 5);

    loader.initialize();
    let after = loader.catalog();
    assert_eq!(*before, *after);
    assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn catalog_is_built_lazily_once() {
    let (_dir, sources) = fixture();
    let (reporter, loader) = loader_with(sources);
    assert!(!loader.is_initialized());

    let first = loader.catalog();
    let second = loader.catalog();
    assert!(Arc::ptr_eq(&first, &second));
    // Only one build ran, so the duplicate was reported only once.
    assert_eq!(reporter.count(ErrorKind::DuplicateKey), 1);
}

#[test]
fn getter_does_not_rebuild_after_source_changes() {
    let (dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    loader.initialize();

    fs::write(dir.path().join("mod_b").join("Diplomacy.xml"), "<Root/>").unwrap();
    assert!(loader.catalog().contains_key("nomads"));

    loader.initialize();
    assert!(!loader.catalog().contains_key("nomads"));
}

#[test]
fn build_leaves_stored_catalog_untouched() {
    let (_dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    let (catalog, summary) = loader.build();
    assert_eq!(catalog.len(), summary.rule_count);
    assert!(!loader.is_initialized());
}

#[test]
fn empty_source_set_gives_empty_catalog() {
    let (reporter, loader) = loader_with(SourceSet::default());
    let summary = loader.initialize();
    assert!(loader.catalog().is_empty());
    assert!(summary.is_clean());
    assert!(reporter.is_empty());
}

#[test]
fn concurrent_readers_share_one_catalog() {
    let (_dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    let loader = Arc::new(loader);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let loader = Arc::clone(&loader);
            std::thread::spawn(move || loader.catalog())
        })
        .collect();
    let catalogs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for c in &catalogs[1..] {
        assert!(Arc::ptr_eq(&catalogs[0], c));
    }
}

// ── watcher ─────────────────────────────────────────────────

#[test]
fn watch_targets_skip_missing_directories() {
    let (dir, sources) = fixture();
    let sources = sources.with_secondary_dir(dir.path().join("not_installed"));
    let targets = watch_targets(&sources);
    assert_eq!(targets.len(), 3);
    assert!(targets.iter().all(|t| t.file.ends_with("Diplomacy.xml")));
}

#[test]
fn source_events_are_relevant() {
    let (_dir, sources) = fixture();
    let files: Vec<_> = watch_targets(&sources).into_iter().map(|t| t.file).collect();

    let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(files[1].clone());
    assert!(touches_source(&modify, &files));

    let create = Event::new(EventKind::Create(CreateKind::File)).add_path(files[0].clone());
    assert!(touches_source(&create, &files));
}

#[test]
fn unrelated_events_are_ignored() {
    let (dir, sources) = fixture();
    let files: Vec<_> = watch_targets(&sources).into_iter().map(|t| t.file).collect();

    let other_file = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(dir.path().join("notes.txt"));
    assert!(!touches_source(&other_file, &files));

    let metadata = Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)))
        .add_path(files[0].clone());
    assert!(!touches_source(&metadata, &files));
}

#[test]
fn watch_starts_on_existing_directories() {
    let (_dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    let watcher = loader.watch();
    assert!(watcher.is_ok());
}

#[test]
fn source_change_signals_without_swapping_catalog() {
    let (dir, sources) = fixture();
    let (_reporter, loader) = loader_with(sources);
    let before = loader.catalog();
    let watcher = loader.watch().expect("start watcher");

    fs::write(dir.path().join("mod_b").join("Diplomacy.xml"), "<Root/>").unwrap();
    let changed = watcher.recv_timeout(Duration::from_secs(5));
    assert!(changed.is_some(), "no change notification received");
    watcher.drain();

    // The stored catalog is untouched until the owner rebuilds.
    let current = loader.catalog();
    assert!(Arc::ptr_eq(&before, &current));
    assert!(current.contains_key("nomads"));

    loader.reset();
    loader.initialize();
    assert!(!loader.catalog().contains_key("nomads"));
}

// ── reporter interaction ────────────────────────────────────

/// Reporter that reads the catalog back from inside `report`.
struct ReadingReporter {
    loader: OnceLock<Weak<CatalogLoader>>,
    seen: Mutex<Vec<Option<usize>>>,
}

impl ErrorReporter for ReadingReporter {
    fn report(&self, _error: &DiplomacyError, _context: &str) {
        let len = self
            .loader
            .get()
            .and_then(Weak::upgrade)
            .map(|loader| loader.catalog().len());
        self.seen.lock().unwrap().push(len);
    }
}

#[test]
fn reporter_may_read_catalog_during_initialize() {
    let (_dir, sources) = fixture();
    let reporter = Arc::new(ReadingReporter {
        loader: OnceLock::new(),
        seen: Mutex::new(Vec::new()),
    });
    let loader = Arc::new(CatalogLoader::new(sources, roster()).with_reporter(reporter.clone()));
    reporter.loader.set(Arc::downgrade(&loader)).unwrap();

    // Would deadlock if the reporter ran under the write lock.
    loader.initialize();
    assert_eq!(*reporter.seen.lock().unwrap(), vec![Some(5)]);

    loader.reset();
    loader.catalog();
    assert_eq!(reporter.seen.lock().unwrap().len(), 2);
}

struct PanickingReporter;

impl ErrorReporter for PanickingReporter {
    fn report(&self, error: &DiplomacyError, _context: &str) {
        panic!("reporter failed on {error}");
    }
}

#[test]
fn panicking_reporter_leaves_loader_usable() {
    let (_dir, sources) = fixture();
    let loader = CatalogLoader::new(sources, roster()).with_reporter(Arc::new(PanickingReporter));

    let result = panic::catch_unwind(AssertUnwindSafe(|| loader.initialize()));
    assert!(result.is_err());

    // The lock is not poisoned and the catalog was stored before reporting.
    assert!(loader.is_initialized());
    assert_eq!(loader.catalog().len(), 5);
    loader.reset();
    assert!(!loader.is_initialized());
}

#[test]
fn doctype_primary_loads() {
    let dir = TempDir::new().unwrap();
    let primary = dir.path().join("Diplomacy.xml");
    fs::write(
        &primary,
        "<!DOCTYPE DiplomacyData><DiplomacyData><Diplomacy target=\"a\"/></DiplomacyData>",
    )
    .unwrap();
    let (reporter, loader) = loader_with(SourceSet::new(Some(primary)));
    let summary = loader.initialize();

    assert!(reporter.is_empty());
    assert!(summary.is_clean());
    assert_eq!(loader.catalog().keys().collect::<Vec<_>>(), vec!["a"]);
}
