//! End-to-end generation over real directory trees.

use kodegen_bundler_wix::wix::{
    ConfigurationBuilder, Error, Generation, Generator, UiLevel, Warning, generate,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// Parsed descriptor element.
#[derive(Debug)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Node {
    fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn all(&self) -> Vec<&Node> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.all());
        }
        out
    }

    fn named(&self, name: &str) -> Vec<&Node> {
        self.all().into_iter().filter(|n| n.name == name).collect()
    }

    /// Nesting and attributes, ignoring per-build product identity.
    fn shape(&self, depth: usize, out: &mut String) {
        out.push_str(&" ".repeat(depth));
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            if key != "ProductCode" {
                out.push_str(&format!(" {key}={value}"));
            }
        }
        out.push('\n');
        for child in &self.children {
            child.shape(depth + 1, out);
        }
    }
}

fn node(start: &BytesStart<'_>) -> Node {
    Node {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes: start
            .attributes()
            .map(|a| {
                let a = a.unwrap();
                (
                    String::from_utf8_lossy(a.key.as_ref()).into_owned(),
                    a.unescape_value().unwrap().into_owned(),
                )
            })
            .collect(),
        children: Vec::new(),
    }
}

fn parse(document: &str) -> Node {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => stack.push(node(&e)),
            Event::Empty(e) => {
                let leaf = node(&e);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(leaf),
                    None => root = Some(leaf),
                }
            }
            Event::End(_) => {
                let done = stack.pop().unwrap();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => root = Some(done),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    root.unwrap()
}

fn publish_tree(files: &[&str], dirs: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for d in dirs {
        fs::create_dir_all(dir.path().join(d)).unwrap();
    }
    for f in files {
        let path = dir.path().join(f);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"payload").unwrap();
    }
    dir
}

fn base() -> ConfigurationBuilder {
    ConfigurationBuilder::new()
        .product_name("MyApp")
        .version("1.0.0")
        .manufacturer("Acme")
}

fn run(builder: ConfigurationBuilder, root: &Path) -> (Generation, Node) {
    let generation = generate(&builder.build().unwrap(), root).unwrap();
    let doc = parse(&generation.document);
    (generation, doc)
}

fn file_id<'a>(doc: &'a Node, name: &str) -> &'a str {
    doc.named("File")
        .into_iter()
        .find(|f| f.get("Name") == Some(name))
        .and_then(|f| f.get("Id"))
        .unwrap()
}

#[test]
fn test_app_with_shortcut_and_path() {
    let root = publish_tree(&["app.exe", "app.dll"], &["logs"]);
    let builder = base()
        .ui_level(UiLevel::None)
        .desktop_shortcut(true)
        .start_menu_shortcut(false)
        .add_to_path(true);
    let (_, doc) = run(builder, root.path());

    let files = doc.named("File");
    assert_eq!(files.len(), 2);
    let file_components = doc
        .named("Component")
        .into_iter()
        .filter(|c| c.children.iter().any(|n| n.name == "File"))
        .count();
    assert_eq!(file_components, 2);

    let logs: Vec<_> = doc
        .named("Directory")
        .into_iter()
        .filter(|d| d.get("Name") == Some("logs"))
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].named("CreateFolder").len() == 1);
    assert!(logs[0].named("File").is_empty());

    let shortcuts = doc.named("Shortcut");
    assert_eq!(shortcuts.len(), 1);
    let target = format!("[#{}]", file_id(&doc, "app.exe"));
    assert_eq!(shortcuts[0].get("Target"), Some(target.as_str()));

    let env = doc.named("Environment");
    assert_eq!(env.len(), 1);
    assert_eq!(env[0].get("Name"), Some("PATH"));
    assert_eq!(env[0].get("Value"), Some("[INSTALLDIR]"));
    assert_eq!(env[0].get("Part"), Some("last"));

    assert!(doc.get("xmlns:util").is_some());
    assert!(doc.get("xmlns:ui").is_none());
    assert!(doc.named("ui:WixUI").is_empty());
}

#[test]
fn test_file_associations_open_with_main_executable() {
    let root = publish_tree(&["app.exe", "helper.dll"], &[]);
    let (_, doc) = run(base().file_associations(".abc,.xyz"), root.path());

    let prog_ids = doc.named("ProgId");
    assert_eq!(prog_ids.len(), 2);
    let main = file_id(&doc, "app.exe");
    let mut extensions = Vec::new();
    for prog_id in prog_ids {
        let verb = &prog_id.named("Verb")[0];
        assert_eq!(verb.get("TargetFile"), Some(main));
        extensions.push(prog_id.named("Extension")[0].get("Id").unwrap().to_string());
    }
    assert_eq!(extensions, ["abc", "xyz"]);
    assert!(doc.get("xmlns:util").is_some());
}

#[test]
fn test_run_after_install_without_executable() {
    let root = publish_tree(&["readme.txt", "lib/core.dll"], &[]);
    let builder = base().run_after_install(true).desktop_shortcut(false);
    let (generation, doc) = run(builder, root.path());

    assert!(generation.warnings.contains(&Warning::MissingMainExecutable {
        feature: "run after install"
    }));
    assert!(doc.named("CustomAction").is_empty());
    assert!(doc.named("InstallExecuteSequence").is_empty());
}

#[test]
fn test_run_after_install_with_ui() {
    let root = publish_tree(&["app.exe"], &[]);
    let (_, doc) = run(base().run_after_install(true), root.path());

    let action = &doc.named("CustomAction")[0];
    assert_eq!(action.get("DllEntry"), Some("WixShellExec"));
    let custom = &doc.named("Custom")[0];
    assert_eq!(custom.get("After"), Some("InstallFinalize"));
    assert_eq!(custom.get("Condition"), Some("NOT Installed AND LAUNCHAPPONEXIT=1"));
    assert!(doc
        .named("Property")
        .iter()
        .any(|p| p.get("Id") == Some("LAUNCHAPPONEXIT")));
}

#[test]
fn test_regeneration_is_isomorphic() {
    let root = publish_tree(
        &["app.exe", "app.dll", "data/a.json", "data/deep/b.json"],
        &["cache"],
    );
    let config = base().add_to_path(true).upgrade_code(Uuid::new_v4().to_string());
    let config = config.build().unwrap();

    let first = parse(&generate(&config, root.path()).unwrap().document);
    let second = parse(&generate(&config, root.path()).unwrap().document);

    let (mut a, mut b) = (String::new(), String::new());
    first.shape(0, &mut a);
    second.shape(0, &mut b);
    assert_eq!(a, b);
}

#[test]
fn test_every_component_is_in_a_feature() {
    let root = publish_tree(
        &["app.exe", "x/y/z.dat", "x/w.dat"],
        &["empty", "x/also-empty"],
    );
    let builder = base()
        .add_to_path(true)
        .start_menu_folder("Acme Tools")
        .file_associations(".abc")
        .run_after_install(true);
    let (_, doc) = run(builder, root.path());

    let referenced: HashSet<&str> = doc
        .named("ComponentRef")
        .iter()
        .filter_map(|r| r.get("Id"))
        .collect();
    let components: Vec<&str> = doc
        .named("Component")
        .iter()
        .filter_map(|c| c.get("Id"))
        .collect();
    let missing: Vec<_> = components
        .iter()
        .filter(|id| !referenced.contains(*id))
        .collect();
    assert_eq!(missing.len(), 0);
    assert_eq!(referenced.len(), components.len());
}

#[test]
fn test_supplied_upgrade_code_is_kept() {
    let root = publish_tree(&["app.exe"], &[]);
    let code = "6a1b7f8e-5d0b-4c9b-9c1e-2e3a4b5c6d7e";
    let expected = Uuid::parse_str(code).unwrap();

    for seed in [1, 2, 3] {
        let config = base().upgrade_code(code).build().unwrap();
        let generation = Generator::new()
            .with_seed(seed)
            .generate(&config, root.path())
            .unwrap();
        assert_eq!(generation.upgrade_code, expected);
        let doc = parse(&generation.document);
        let package = &doc.named("Package")[0];
        assert_eq!(
            package.get("UpgradeCode"),
            Some("{6A1B7F8E-5D0B-4C9B-9C1E-2E3A4B5C6D7E}")
        );
        assert!(!generation
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::DerivedUpgradeCode { .. })));
    }
}

#[test]
fn test_per_user_payloadless_components_use_registry() {
    let root = publish_tree(&["app.exe"], &["logs", "tmp"]);
    let (_, doc) = run(base().start_menu_folder("Acme"), root.path());

    let payloadless: Vec<_> = doc
        .named("Component")
        .into_iter()
        .filter(|c| !c.children.iter().any(|n| n.name == "File"))
        .collect();
    // logs, tmp, start menu shortcut
    assert_eq!(payloadless.len(), 3);
    for component in payloadless {
        let value = component
            .children
            .iter()
            .find(|n| n.name == "RegistryValue")
            .unwrap();
        assert_eq!(value.get("Root"), Some("HKCU"));
        assert_eq!(value.get("Key"), Some("Software\\Acme\\MyApp"));
        assert_eq!(value.get("KeyPath"), Some("yes"));
    }
    assert_eq!(doc.named("Package")[0].get("Scope"), Some("perUser"));
}

#[test]
fn test_per_machine_scope() {
    let root = publish_tree(&["app.exe"], &["logs"]);
    let (_, doc) = run(base().all_users(true).add_to_path(true), root.path());

    assert_eq!(doc.named("Package")[0].get("Scope"), Some("perMachine"));
    assert!(doc
        .named("RegistryValue")
        .iter()
        .all(|v| v.get("Root") == Some("HKLM")));
    assert_eq!(doc.named("Environment")[0].get("System"), Some("yes"));
}

#[test]
fn test_exclusions_keep_file_bijection() {
    let root = publish_tree(&["app.exe", "app.pdb", "sub/lib.dll", "sub/lib.pdb"], &[]);
    let (_, doc) = run(base().exclude("**/*.pdb"), root.path());

    let names: HashSet<&str> = doc
        .named("File")
        .iter()
        .filter_map(|f| f.get("Name"))
        .collect();
    assert_eq!(names, HashSet::from(["app.exe", "lib.dll"]));
}

#[test]
fn test_missing_publish_dir() {
    let root = tempfile::tempdir().unwrap();
    let err = generate(&base().build().unwrap(), &root.path().join("missing")).unwrap_err();
    assert!(matches!(err, Error::Scan(_)));
}

#[test]
fn test_missing_icon_degrades() {
    let root = publish_tree(&["app.exe"], &[]);
    let (generation, doc) = run(base().icon(root.path().join("nope.ico")), root.path());

    assert!(generation
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::MissingResource { kind: "icon", .. })));
    assert!(doc.named("Icon").is_empty());
    assert!(doc
        .named("Shortcut")
        .iter()
        .all(|s| s.get("Icon").is_none()));
}
