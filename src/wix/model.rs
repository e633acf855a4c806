//! In-memory installer layout.
//!
//! The mapper produces a [`Layout`] from the scanned tree; feature assemblers
//! extend it; the emitter serializes it. Nothing here touches the filesystem.

use crate::wix::ids::Identifier;
use std::path::PathBuf;

/// A file installed by a unit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileEntry {
    /// File identifier, referenced as `[#id]` by shortcuts and actions.
    pub id: Identifier,
    /// Installed file name.
    pub name: String,
    /// Source path in the publish directory.
    pub source: PathBuf,
    /// Path relative to the publish root.
    pub relative_path: PathBuf,
}

/// Integer registry value used as install-state evidence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryValue {
    /// Hive (`HKCU` or `HKLM`).
    pub root: &'static str,
    /// Key below the hive.
    pub key: String,
    /// Value name, unique per unit.
    pub name: String,
}

/// The entry the installer checks to detect a unit's presence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyPath {
    /// The unit's single file.
    File(Identifier),
    /// A registry value owned by the unit.
    Registry(RegistryValue),
}

/// A shortcut to an installed file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Shortcut {
    /// Shortcut identifier.
    pub id: Identifier,
    /// Display name.
    pub name: String,
    /// Tooltip text.
    pub description: String,
    /// Directory holding the shortcut when it differs from the unit's own.
    pub directory: Option<Identifier>,
    /// File the shortcut launches.
    pub target: Identifier,
    /// Directory the target starts in.
    pub working_directory: Identifier,
}

/// Append of a value to an environment variable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvironmentEntry {
    /// Environment entry identifier.
    pub id: Identifier,
    /// Variable name.
    pub name: String,
    /// Value appended to the variable.
    pub value: String,
    /// System environment (per-machine) vs user environment.
    pub system: bool,
}

/// Extension → program identifier → open verb.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Association {
    /// Program identifier naming the file type.
    pub prog_id: Identifier,
    /// Extension without the leading dot.
    pub extension: String,
    /// File type description.
    pub description: String,
    /// File the open verb runs.
    pub target: Identifier,
}

/// An installable component.
///
/// Holds at most one file. A unit without a file is keyed by a registry
/// value instead; [`InstallUnit::validate`] checks this.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstallUnit {
    /// Component identifier.
    pub id: Identifier,
    /// Installed files; at most one.
    pub files: Vec<FileEntry>,
    /// Install-state evidence.
    pub keypath: KeyPath,
    /// Shortcuts installed with the unit.
    pub shortcuts: Vec<Shortcut>,
    /// Environment edits installed with the unit.
    pub environment: Vec<EnvironmentEntry>,
    /// File associations installed with the unit.
    pub associations: Vec<Association>,
    /// Create the owning directory even when it holds no files.
    pub create_folder: bool,
    /// `RemoveFolder` entries removing the owning directory on uninstall.
    pub remove_folders: Vec<Identifier>,
}

impl InstallUnit {
    /// A unit installing `file`, keyed by that file.
    pub fn for_file(id: Identifier, file: FileEntry) -> Self {
        Self {
            id,
            keypath: KeyPath::File(file.id.clone()),
            files: vec![file],
            shortcuts: Vec::new(),
            environment: Vec::new(),
            associations: Vec::new(),
            create_folder: false,
            remove_folders: Vec::new(),
        }
    }

    /// A payload-less unit keyed by a registry value.
    pub fn registry_keyed(id: Identifier, value: RegistryValue) -> Self {
        Self {
            id,
            keypath: KeyPath::Registry(value),
            files: Vec::new(),
            shortcuts: Vec::new(),
            environment: Vec::new(),
            associations: Vec::new(),
            create_folder: false,
            remove_folders: Vec::new(),
        }
    }

    /// The single installed file, if any.
    pub fn file(&self) -> Option<&FileEntry> {
        self.files.first()
    }

    /// Checks the keying rules: at most one file, a file keypath names that
    /// file, and a unit without files is registry-keyed.
    pub fn validate(&self) -> Result<(), String> {
        if self.files.len() > 1 {
            return Err(format!("component {} holds {} files", self.id, self.files.len()));
        }
        match (&self.keypath, self.file()) {
            (KeyPath::File(key), Some(file)) if *key == file.id => Ok(()),
            (KeyPath::File(key), _) => Err(format!(
                "component {} is keyed by {key}, which it does not install",
                self.id
            )),
            (KeyPath::Registry(_), _) => Ok(()),
        }
    }
}

/// An output directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirectoryNode {
    /// Directory identifier.
    pub id: Identifier,
    /// On-disk name. `None` for a predefined system directory.
    pub name: Option<String>,
    /// Path relative to the publish root, for directories mirroring it.
    pub relative_path: Option<PathBuf>,
    /// Units installed into this directory.
    pub units: Vec<InstallUnit>,
    /// Nested directories.
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    /// A named directory.
    pub fn named(id: Identifier, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            relative_path: None,
            units: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A predefined system directory such as `DesktopFolder`.
    pub fn standard(id: Identifier) -> Self {
        Self {
            id,
            name: None,
            relative_path: None,
            units: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether this node is a predefined system directory.
    pub fn is_standard(&self) -> bool {
        self.name.is_none()
    }

    fn collect_units<'a>(&'a self, out: &mut Vec<&'a InstallUnit>) {
        out.extend(self.units.iter());
        for child in &self.children {
            child.collect_units(out);
        }
    }

    fn find_mut(&mut self, id: &Identifier) -> Option<&mut DirectoryNode> {
        if self.id == *id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    fn find_unit_mut(&mut self, id: &Identifier) -> Option<&mut InstallUnit> {
        if let Some(unit) = self.units.iter_mut().find(|u| u.id == *id) {
            return Some(unit);
        }
        self.children.iter_mut().find_map(|c| c.find_unit_mut(id))
    }

    /// Number of directories in this subtree, including this one.
    pub fn directory_count(&self) -> usize {
        1 + self.children.iter().map(Self::directory_count).sum::<usize>()
    }
}

/// A top-level feature grouping.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Feature {
    /// Feature identifier.
    pub id: Identifier,
    /// Title shown by the UI.
    pub title: String,
    /// Install level; 1 installs by default.
    pub level: u32,
    /// Referenced component identifiers.
    pub components: Vec<Identifier>,
}

/// The detected main executable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MainExecutable {
    /// File identifier of the executable.
    pub file_id: Identifier,
    /// Unit installing it.
    pub unit_id: Identifier,
    /// File name.
    pub name: String,
}

/// Package-level icon registration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconResource {
    /// Icon identifier referenced by shortcuts.
    pub id: Identifier,
    /// Icon file.
    pub source: PathBuf,
}

/// Post-install launch of an installed file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchAction {
    /// Custom action identifier.
    pub id: Identifier,
    /// File launched.
    pub target: Identifier,
    /// Execute-sequence condition.
    pub condition: String,
    /// Whether the UI exposes the opt-out property.
    pub ui_property: bool,
}

/// Everything the emitter needs besides package metadata.
#[derive(Clone, Debug)]
pub struct Layout {
    /// Install directory tree (`INSTALLDIR`) mirroring the publish root.
    pub install_dir: DirectoryNode,
    /// Predefined system directories used by features, in creation order.
    pub standard_dirs: Vec<DirectoryNode>,
    /// Main executable, if one was detected.
    pub main_executable: Option<MainExecutable>,
    /// Registered product icon.
    pub icon: Option<IconResource>,
    /// Post-install launch.
    pub launch: Option<LaunchAction>,
    /// Feature groupings; the first references every mapped unit.
    pub features: Vec<Feature>,
}

impl Layout {
    /// Wraps a mapped install tree, referencing all of its units from one
    /// feature titled `title`.
    pub fn new(install_dir: DirectoryNode, title: impl Into<String>) -> Self {
        let mut units = Vec::new();
        install_dir.collect_units(&mut units);
        let components = units.iter().map(|u| u.id.clone()).collect();

        Self {
            install_dir,
            standard_dirs: Vec::new(),
            main_executable: None,
            icon: None,
            launch: None,
            features: vec![Feature {
                id: Identifier::well_known("ProductFeature"),
                title: title.into(),
                level: 1,
                components,
            }],
        }
    }

    /// All units, install tree first, in document order.
    pub fn units(&self) -> Vec<&InstallUnit> {
        let mut out = Vec::new();
        self.install_dir.collect_units(&mut out);
        for dir in &self.standard_dirs {
            dir.collect_units(&mut out);
        }
        out
    }

    /// Finds a unit anywhere in the layout.
    pub fn find_unit_mut(&mut self, id: &Identifier) -> Option<&mut InstallUnit> {
        if let Some(unit) = self.install_dir.find_unit_mut(id) {
            return Some(unit);
        }
        self.standard_dirs
            .iter_mut()
            .find_map(|d| d.find_unit_mut(id))
    }

    /// The unit installing the main executable.
    pub fn main_unit_mut(&mut self) -> Option<&mut InstallUnit> {
        let id = self.main_executable.as_ref()?.unit_id.clone();
        self.find_unit_mut(&id)
    }

    /// Finds a directory anywhere in the layout.
    pub fn directory_mut(&mut self, id: &Identifier) -> Option<&mut DirectoryNode> {
        if let Some(dir) = self.install_dir.find_mut(id) {
            return Some(dir);
        }
        self.standard_dirs.iter_mut().find_map(|d| d.find_mut(id))
    }

    /// Returns the top-level system directory `id`, declaring it on first use.
    pub fn standard_dir_mut(&mut self, id: &'static str) -> &mut DirectoryNode {
        let index = match self.standard_dirs.iter().position(|d| d.id.as_str() == id) {
            Some(index) => index,
            None => {
                self.standard_dirs
                    .push(DirectoryNode::standard(Identifier::well_known(id)));
                self.standard_dirs.len() - 1
            }
        };
        &mut self.standard_dirs[index]
    }

    /// Places `unit` in `directory` and references it from the primary feature.
    ///
    /// Returns the unit back when the directory does not exist.
    pub fn add_unit(
        &mut self,
        directory: &Identifier,
        unit: InstallUnit,
    ) -> Result<(), Box<InstallUnit>> {
        let id = unit.id.clone();
        match self.directory_mut(directory) {
            Some(dir) => dir.units.push(unit),
            None => return Err(Box::new(unit)),
        }
        if let Some(feature) = self.features.first_mut() {
            feature.components.push(id);
        }
        Ok(())
    }
}
