use crate::backup::REMOVAL_MANIFEST;
use crate::codecs::{CompileContext, ScriptCompiler, StructuredRecordEditor};
use crate::error::{Error, Result};
use crate::mods::gff::{FieldEdit, FieldValue};
use crate::patcher::{PatchStage, Patcher, RunContext};
use crate::summary::FailureSeverity;
use crate::{list_backups, restore_latest, OverridePolicy, StrRefValue};
use camino::{Utf8Path, Utf8PathBuf};
use ktk_capsule::{Capsule, CapsuleFormat, ResRef, ResourceType};
use ktk_formats::{SoundEvent, SoundSet, TalkTable, TlkEntry};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

/// Appends each edit as `;path=value` so the result shows what was applied.
#[derive(Clone, Default)]
struct RecordingEditor {
    calls: Arc<Mutex<Vec<Vec<FieldEdit>>>>,
}

impl StructuredRecordEditor for RecordingEditor {
    fn apply(&self, source: &[u8], edits: &[FieldEdit]) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(edits.to_vec());
        let mut out = source.to_vec();
        for edit in edits {
            out.extend_from_slice(format!(";{}={:?}", edit.path, edit.value).as_bytes());
        }
        Ok(out)
    }
}

/// Emits `NCS:` followed by the processed source.
struct EchoCompiler;

impl ScriptCompiler for EchoCompiler {
    fn compile(&self, source: &str, context: &CompileContext) -> Result<Vec<u8>> {
        assert!(context.source_path.exists());
        Ok(format!("NCS:{}", source).into_bytes())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Fixture {
    _dir: tempfile::TempDir,
    game: Utf8PathBuf,
    mod_dir: Utf8PathBuf,
    staging: Utf8PathBuf,
}

impl Fixture {
    fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let game = root.join("KotOR");
        let mod_dir = root.join("BastilaFix");
        let staging = mod_dir.join("tslpatchdata");

        std::fs::create_dir_all(game.join("Override")).unwrap();
        std::fs::create_dir_all(game.join("modules")).unwrap();
        std::fs::create_dir_all(game.join("StreamWaves")).unwrap();
        std::fs::write(game.join("swkotor.exe"), b"MZ").unwrap();
        std::fs::create_dir_all(&staging).unwrap();

        Self {
            _dir: dir,
            game,
            mod_dir,
            staging,
        }
    }

    fn config(&self, toml: &str) {
        std::fs::write(self.staging.join("changes.toml"), toml).unwrap();
    }

    fn stage(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.staging.join(name), bytes).unwrap();
    }

    fn context(&self) -> RunContext {
        RunContext::new(self.game.clone(), self.mod_dir.clone())
    }

    fn patcher(&self, context: RunContext) -> Patcher {
        Patcher::load(context)
            .unwrap()
            .with_record_editor(RecordingEditor::default())
            .with_compiler(EchoCompiler)
    }

    fn write_module(&self, name: &str, resources: &[(&str, ResourceType, &[u8])]) -> Utf8PathBuf {
        let path = self.game.join("modules").join(name);
        let mut capsule = Capsule::new(CapsuleFormat::for_path(&path).unwrap());
        for (resref, restype, data) in resources {
            capsule.set(ResRef::new(resref).unwrap(), *restype, data.to_vec());
        }
        capsule.save(&path).unwrap();
        path
    }

    fn write_dialog(&self) {
        let mut table = TalkTable::new(0);
        table.append(TlkEntry::new("Bad Robot", None));
        table.append(TlkEntry::new("Lightsaber", None));
        std::fs::write(self.game.join("dialog.tlk"), table.to_bytes().unwrap()).unwrap();
    }
}

fn sound_set(event: SoundEvent, strref: u32) -> Vec<u8> {
    let mut set = SoundSet::default();
    set.set(event, strref);
    set.to_bytes().unwrap()
}

fn only_backup_dir(fixture: &Fixture) -> Utf8PathBuf {
    let backups = list_backups(&fixture.mod_dir.join("backup")).unwrap();
    assert_eq!(backups.len(), 1);
    backups.into_iter().next().unwrap()
}

#[test]
fn test_new_record_is_created_and_listed_for_removal() {
    let fixture = Fixture::new();
    fixture.stage("creature.utc", b"UTC V3.2");
    fixture.config(
        r#"
[[gff]]
source = "creature.utc"
edits = [{ path = "Tag", value = { type = "string", value = "n_creature" } }]
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.succeeded, 1);
    assert!(summary.failures.is_empty());
    assert!(summary.backups.is_empty());

    let written = std::fs::read(fixture.game.join("Override").join("creature.utc")).unwrap();
    assert!(written.starts_with(b"UTC V3.2;Tag="));

    let backup_dir = only_backup_dir(&fixture);
    let manifest = std::fs::read_to_string(backup_dir.join(REMOVAL_MANIFEST)).unwrap();
    assert_eq!(
        manifest.lines().collect::<Vec<_>>(),
        vec![fixture.game.join("Override").join("creature.utc").as_str()]
    );
    let entries = std::fs::read_dir(&backup_dir).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_existing_sound_set_is_backed_up_and_edited() {
    let fixture = Fixture::new();
    let original = sound_set(SoundEvent::Dead, 5);
    let target = fixture.game.join("Override").join("area.ssf");
    std::fs::write(&target, &original).unwrap();
    fixture.config(
        r#"
[[ssf]]
source = "area.ssf"
edits = [{ event = "battle_cry1", strref = 77 }]
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.backups.len(), 1);

    let backup = &summary.backups[0];
    assert_eq!(backup.original, target);
    assert_eq!(std::fs::read(&backup.backup).unwrap(), original);

    let edited = SoundSet::from_bytes(&std::fs::read(&target).unwrap()).unwrap();
    assert_eq!(edited.get(SoundEvent::BattleCry1), Some(77));
    assert_eq!(edited.get(SoundEvent::Dead), Some(5));
}

#[test]
fn test_operations_run_in_category_order() {
    let fixture = Fixture::new();
    fixture.write_dialog();
    std::fs::write(
        fixture.game.join("Override").join("n_bastila.ssf"),
        sound_set(SoundEvent::Dead, 1),
    )
    .unwrap();
    fixture.stage("n_bastila.utc", b"UTC V3.2");
    fixture.stage("k_hen_bastila.ncs", &[0u8; 16]);
    fixture.stage("k_act_bastila.nss", b"void main() { SpeakStringByStrRef(#StrRef0#); }");
    fixture.stage("portrait.tga", b"TGA");

    // Declared back to front on purpose.
    fixture.config(
        r#"
[[ssf]]
source = "n_bastila.ssf"
edits = [{ event = "battle_cry1", strref = "StrRef0" }]

[[compile]]
source = "k_act_bastila.nss"

[[hack]]
source = "k_hen_bastila.ncs"
edits = [{ offset = 4, value = { strref32 = "StrRef0" } }]

[[gff]]
source = "n_bastila.utc"
edits = [{ path = "FirstName", value = { type = "str_ref", value = "StrRef0" } }]

[[tlk]]
source = "dialog.tlk"
edits = [{ action = "append", text = "For the Republic!", token = "StrRef0" }]

[[install]]
source = "portrait.tga"
"#,
    );

    let stages = Arc::new(Mutex::new(Vec::new()));
    let editor = RecordingEditor::default();
    let calls = editor.calls.clone();
    let stages_sink = stages.clone();
    let summary = Patcher::load(fixture.context())
        .unwrap()
        .with_record_editor(editor)
        .with_compiler(EchoCompiler)
        .with_progress(move |progress| {
            if progress.stage == PatchStage::Applying {
                stages_sink.lock().unwrap().push(progress.description.unwrap_or_default());
            }
        })
        .run()
        .unwrap();

    assert!(summary.failures.is_empty(), "{:?}", summary.failures);
    assert_eq!(summary.succeeded, 6);

    let descriptions = stages.lock().unwrap().clone();
    let prefixes: Vec<_> = descriptions
        .iter()
        .map(|d| d.split_whitespace().next().unwrap().to_string())
        .collect();
    assert_eq!(
        prefixes,
        ["Copying", "Applying", "Modifying", "Hacking", "Compiling", "Setting"]
    );

    // The appended entry is index 2; every later category saw that value.
    let table = TalkTable::from_bytes(&std::fs::read(fixture.game.join("dialog.tlk")).unwrap()).unwrap();
    assert_eq!(table.get(2).unwrap().text, "For the Republic!");

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0][0].value, FieldValue::StrRef(StrRefValue::Literal(2)));

    let hacked = std::fs::read(fixture.game.join("Override").join("k_hen_bastila.ncs")).unwrap();
    assert_eq!(&hacked[4..8], &2u32.to_be_bytes());

    let compiled = std::fs::read(fixture.game.join("Override").join("k_act_bastila.ncs")).unwrap();
    assert_eq!(compiled, b"NCS:void main() { SpeakStringByStrRef(2); }");

    let sounds =
        SoundSet::from_bytes(&std::fs::read(fixture.game.join("Override").join("n_bastila.ssf")).unwrap())
            .unwrap();
    assert_eq!(sounds.get(SoundEvent::BattleCry1), Some(2));
}

fn module_conflict_fixture(policy: &str) -> (Fixture, Utf8PathBuf) {
    let fixture = Fixture::new();
    let module = fixture.write_module("danm13.mod", &[("n_bastila", ResourceType::UTC, b"UTC V3.2")]);
    std::fs::write(fixture.game.join("Override").join("n_bastila.utc"), b"loose").unwrap();
    fixture.config(&format!(
        r#"
[settings]
override_policy = "{}"

[[gff]]
source = "n_bastila.utc"
destination = "modules/danm13.mod"
edits = [{{ path = "Tag", value = {{ type = "string", value = "bastila" }} }}]
"#,
        policy
    ));
    (fixture, module)
}

fn module_entry(module: &Utf8Path) -> Vec<u8> {
    Capsule::open(module)
        .unwrap()
        .get(&ResRef::new("n_bastila").unwrap(), ResourceType::UTC)
        .unwrap()
        .to_vec()
}

#[test]
fn test_rename_policy_moves_shadowing_override() {
    let (fixture, module) = module_conflict_fixture("rename");
    let summary = fixture.patcher(fixture.context()).run().unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.warnings.len(), 1);
    assert!(!fixture.game.join("Override").join("n_bastila.utc").exists());
    assert_eq!(
        std::fs::read(fixture.game.join("Override").join("old_n_bastila.utc")).unwrap(),
        b"loose"
    );
    assert!(module_entry(&module).starts_with(b"UTC V3.2;Tag="));

    // The module itself was backed up, not the entry.
    assert_eq!(summary.backups.len(), 1);
    assert_eq!(summary.backups[0].original, module);
}

#[test]
fn test_ignore_policy_leaves_override_alone() {
    let (fixture, module) = module_conflict_fixture("ignore");
    let summary = fixture.patcher(fixture.context()).run().unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(summary.warnings.is_empty());
    assert_eq!(
        std::fs::read(fixture.game.join("Override").join("n_bastila.utc")).unwrap(),
        b"loose"
    );
    assert!(!fixture.game.join("Override").join("old_n_bastila.utc").exists());
    assert!(module_entry(&module).starts_with(b"UTC V3.2;Tag="));
}

#[test]
fn test_context_policy_overrides_settings() {
    let (fixture, _module) = module_conflict_fixture("rename");
    let context = fixture.context().with_override_policy(OverridePolicy::Warn);
    let summary = fixture.patcher(context).run().unwrap();

    assert_eq!(summary.warnings.len(), 1);
    assert!(fixture.game.join("Override").join("n_bastila.utc").exists());
}

#[test]
fn test_include_only_script_writes_nothing() {
    let fixture = Fixture::new();
    fixture.stage("k_inc_bastila.nss", b"int BastilaIsHere() { return TRUE; }");
    fixture.stage("k_act_bastila.nss", b"#include \"k_inc_bastila\"\nvoid main() {}");
    fixture.config(
        r#"
[[compile]]
source = "k_inc_bastila.nss"

[[compile]]
source = "k_act_bastila.nss"
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert!(summary.failures.is_empty());
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(!fixture.game.join("Override").join("k_inc_bastila.ncs").exists());
    assert!(fixture.game.join("Override").join("k_act_bastila.ncs").exists());

    // Scratch directory is cleaned up by default.
    assert!(!fixture.mod_dir.join("temp_nss_working_dir").exists());
}

#[test]
fn test_script_header_is_installed_and_scratch_kept() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(fixture.staging.join("scripts")).unwrap();
    std::fs::write(fixture.staging.join("scripts").join("nwscript.nss"), b"// engine").unwrap();
    fixture.stage("k_act_bastila.nss", b"void main() {}");
    fixture.config(
        r#"
[settings]
save_processed_scripts = true

[[compile]]
source = "k_act_bastila.nss"
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(
        std::fs::read(fixture.game.join("Override").join("nwscript.nss")).unwrap(),
        b"// engine"
    );
    assert!(fixture
        .mod_dir
        .join("temp_nss_working_dir")
        .join("k_act_bastila.nss")
        .exists());
}

#[test]
fn test_missing_archive_is_hard_failure_and_run_continues() {
    let fixture = Fixture::new();
    fixture.stage("n_bastila.utc", b"UTC V3.2");
    fixture.stage("area.ssf", &sound_set(SoundEvent::Dead, 1));
    fixture.config(
        r#"
[[gff]]
source = "n_bastila.utc"
destination = "modules/danm14aa.mod"

[[ssf]]
source = "area.ssf"
edits = [{ event = "select1", strref = 3 }]
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].severity, FailureSeverity::Hard);
    assert!(!fixture.game.join("modules").join("danm14aa.mod").exists());
    assert!(fixture.game.join("Override").join("area.ssf").exists());
}

#[test]
fn test_corrupt_module_header_fails_only_its_operation() {
    let fixture = Fixture::new();
    let module = fixture.write_module("danm13.mod", &[("n_bastila", ResourceType::UTC, b"UTC V3.2")]);
    let mut bytes = std::fs::read(&module).unwrap();
    bytes[16..20].copy_from_slice(&0x2000_0000u32.to_le_bytes());
    std::fs::write(&module, &bytes).unwrap();
    fixture.stage("n_bastila.utc", b"UTC V3.2");
    fixture.stage("area.ssf", &sound_set(SoundEvent::Dead, 1));
    fixture.config(
        r#"
[[gff]]
source = "n_bastila.utc"
destination = "modules/danm13.mod"

[[ssf]]
source = "area.ssf"
edits = [{ event = "select1", strref = 3 }]
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].severity, FailureSeverity::Soft);
    assert_eq!(std::fs::read(&module).unwrap(), bytes);
    assert!(fixture.game.join("Override").join("area.ssf").exists());
}

#[test]
fn test_paths_cannot_escape_their_roots() {
    let fixture = Fixture::new();
    let root = fixture.game.parent().unwrap().to_path_buf();
    std::fs::write(fixture.mod_dir.join("secret.tga"), b"TGA").unwrap();
    std::fs::write(fixture.mod_dir.join("k_act_out.nss"), b"void main() {}").unwrap();
    fixture.stage("portrait.tga", b"TGA");
    fixture.config(
        r#"
[[install]]
source = "portrait.tga"
save_as = "../../escaped.tga"

[[install]]
source = "../secret.tga"

[[compile]]
source = "../k_act_out.nss"

[[install]]
source = "portrait.tga"
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failures.len(), 3);
    assert!(!root.join("escaped.tga").exists());
    assert!(!fixture.game.join("Override").join("secret.tga").exists());
    assert!(!fixture.game.join("Override").join("k_act_out.ncs").exists());
    assert_eq!(
        std::fs::read(fixture.mod_dir.join("k_act_out.nss")).unwrap(),
        b"void main() {}"
    );
    assert!(fixture.game.join("Override").join("portrait.tga").exists());
}

#[test]
fn test_repeated_destination_is_backed_up_once() {
    let fixture = Fixture::new();
    let original = sound_set(SoundEvent::Dead, 5);
    let target = fixture.game.join("Override").join("area.ssf");
    std::fs::write(&target, &original).unwrap();
    fixture.config(
        r#"
[[ssf]]
source = "area.ssf"
edits = [{ event = "battle_cry1", strref = 77 }]

[[ssf]]
source = "area.ssf"
edits = [{ event = "select1", strref = 78 }]
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.backups.len(), 1);
    assert_eq!(std::fs::read(&summary.backups[0].backup).unwrap(), original);

    let edited = SoundSet::from_bytes(&std::fs::read(&target).unwrap()).unwrap();
    assert_eq!(edited.get(SoundEvent::BattleCry1), Some(77));
    assert_eq!(edited.get(SoundEvent::Select1), Some(78));
    assert_eq!(edited.get(SoundEvent::Dead), Some(5));
}

#[test]
fn test_soft_failures_do_not_stop_the_run() {
    let fixture = Fixture::new();
    fixture.stage("area.ssf", &sound_set(SoundEvent::Dead, 1));
    fixture.config(
        r#"
[[ssf]]
source = "missing.ssf"
edits = [{ event = "select1", strref = 3 }]

[[ssf]]
source = "area.ssf"
edits = [{ event = "select1", strref = "StrRef9" }]

[[ssf]]
source = "area.ssf"
save_as = "area2.ssf"
edits = [{ event = "select1", strref = 3 }]
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 1);
    assert!(summary
        .failures
        .iter()
        .all(|f| f.severity == FailureSeverity::Soft));
    assert!(fixture.game.join("Override").join("area2.ssf").exists());
    assert!(std::fs::read_to_string(fixture.mod_dir.join("installlog.txt"))
        .unwrap()
        .contains("1 of 3 operation(s) succeeded"));
}

#[test]
fn test_missing_record_editor_is_soft_failure() {
    let fixture = Fixture::new();
    fixture.stage("creature.utc", b"UTC V3.2");
    fixture.config("[[gff]]\nsource = \"creature.utc\"\n");

    let summary = Patcher::load(fixture.context()).unwrap().run().unwrap();
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].severity, FailureSeverity::Soft);
    assert!(!fixture.game.join("Override").join("creature.utc").exists());
}

#[test]
fn test_rerun_uses_separate_backup_and_is_idempotent() {
    let (fixture, module) = module_conflict_fixture("rename");

    let first = fixture.patcher(fixture.context()).run().unwrap();
    let after_first = std::fs::read(&module).unwrap();
    let second = fixture.patcher(fixture.context()).run().unwrap();

    assert!(first.failures.is_empty());
    assert!(second.failures.is_empty());
    assert!(second.warnings.is_empty());
    assert!(!fixture.game.join("Override").join("old_n_bastila (1).utc").exists());

    let backups = list_backups(&fixture.mod_dir.join("backup")).unwrap();
    assert_eq!(backups.len(), 2);
    assert_ne!(first.backups[0].backup, second.backups[0].backup);
    assert_eq!(std::fs::read(&second.backups[0].backup).unwrap(), after_first);
}

#[test]
fn test_install_skips_existing_unless_replace() {
    let fixture = Fixture::new();
    std::fs::write(fixture.game.join("Override").join("a.tga"), b"installed").unwrap();
    std::fs::write(fixture.game.join("Override").join("b.tga"), b"installed").unwrap();
    fixture.stage("a.tga", b"mod");
    fixture.stage("b.tga", b"mod");
    fixture.config(
        r#"
[[install]]
source = "a.tga"

[[install]]
source = "b.tga"
replace = true
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        std::fs::read(fixture.game.join("Override").join("a.tga")).unwrap(),
        b"installed"
    );
    assert_eq!(
        std::fs::read(fixture.game.join("Override").join("b.tga")).unwrap(),
        b"mod"
    );
    assert_eq!(summary.backups.len(), 1);
}

#[test]
fn test_preflight_failures_touch_nothing() {
    let fixture = Fixture::new();
    fixture.stage("a.tga", b"mod");
    fixture.config(
        r#"
[settings]
required_files = ["k_base_mod.ncs"]
required_message = "Install the base mod first"

[[install]]
source = "a.tga"
"#,
    );

    let result = fixture.patcher(fixture.context()).run();
    assert!(matches!(result, Err(Error::RequiredFileMissing { .. })));
    assert!(!fixture.mod_dir.join("backup").exists());
    assert!(!fixture.game.join("Override").join("a.tga").exists());

    std::fs::write(fixture.game.join("Override").join("K_BASE_MOD.ncs"), b"").unwrap();
    std::fs::write(fixture.game.join("swkotor2.exe"), b"MZ").unwrap();
    std::fs::create_dir_all(fixture.game.join("StreamVoice")).unwrap();
    let result = fixture.patcher(fixture.context()).run();
    assert!(matches!(result, Err(Error::AmbiguousTarget { .. })));
    assert!(!fixture.mod_dir.join("backup").exists());
}

#[test]
fn test_config_removed_after_load() {
    let fixture = Fixture::new();
    fixture.config("[[install]]\nsource = \"a.tga\"\n");
    let patcher = fixture.patcher(fixture.context());
    std::fs::remove_file(fixture.staging.join("changes.toml")).unwrap();

    assert!(matches!(patcher.run(), Err(Error::ConfigMissing(_))));
}

#[test]
fn test_cancel_before_first_operation() {
    let fixture = Fixture::new();
    fixture.stage("a.tga", b"mod");
    fixture.config("[[install]]\nsource = \"a.tga\"\n");

    let context = fixture.context();
    context.cancel.store(true, Ordering::SeqCst);
    let summary = fixture.patcher(context).run().unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.attempted, 0);
    assert!(!fixture.game.join("Override").join("a.tga").exists());
}

#[test]
fn test_uninstall_restores_previous_state() {
    let fixture = Fixture::new();
    let original = sound_set(SoundEvent::Dead, 5);
    std::fs::write(fixture.game.join("Override").join("area.ssf"), &original).unwrap();
    fixture.stage("creature.utc", b"UTC V3.2");
    fixture.config(
        r#"
[[install]]
source = "creature.utc"

[[ssf]]
source = "area.ssf"
edits = [{ event = "battle_cry1", strref = 77 }]
"#,
    );

    let summary = fixture.patcher(fixture.context()).run().unwrap();
    assert_eq!(summary.succeeded, 2);

    let restored = restore_latest(&fixture.mod_dir.join("backup"), &fixture.game).unwrap();
    assert_eq!(restored.removed.len(), 1);
    assert_eq!(restored.restored.len(), 1);
    assert!(!fixture.game.join("Override").join("creature.utc").exists());
    assert_eq!(
        std::fs::read(fixture.game.join("Override").join("area.ssf")).unwrap(),
        original
    );
    assert_eq!(only_backup_dir(&fixture), restored.backup_dir);
}
