//! Identifier allocation.
//!
//! Two kinds of names appear in a descriptor:
//!
//! - **Symbolic identifiers** (`Id` attributes of directories, components,
//!   files, shortcuts, ProgIds). They must start with a letter or underscore,
//!   contain only `[A-Za-z0-9_.]`, be at most [`MAX_IDENTIFIER_LEN`]
//!   characters and be unique within the document.
//! - **GUIDs** (product and upgrade identity). Fresh GUIDs come from the
//!   registry's random source; stable GUIDs are UUID v5 values derived from a
//!   seed so the same seed always yields the same GUID.
//!
//! The registry is scoped to one generation. Uniqueness is checked
//! case-insensitively because file names on the target platform are.

use crate::wix::error::IdentifierError;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Maximum length of a symbolic identifier.
pub const MAX_IDENTIFIER_LEN: usize = 72;

/// Namespace for stable GUIDs derived by this generator.
const STABLE_NAMESPACE: Uuid = Uuid::from_u128(0x5c0f_3a2e_8d4b_4f61_9a7e_b2d1_c4e8_f903);

/// Fixed identifiers used by the document structure itself.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    "INSTALLDIR",
    "ManufacturerFolder",
    "ProgramFiles6432Folder",
    "DesktopFolder",
    "ProgramMenuFolder",
    "ShortcutFolder",
    "ProductFeature",
    "ProductIcon",
    "LaunchApplication",
    "WIXUI_INSTALLDIR",
    "WixShellExecTarget",
    "LAUNCHAPPONEXIT",
    "ARPPRODUCTICON",
];

/// A validated symbolic identifier.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Identifier(String);

impl Identifier {
    /// Wraps one of the [`RESERVED_IDENTIFIERS`].
    pub(crate) fn well_known(id: &'static str) -> Self {
        debug_assert!(RESERVED_IDENTIFIERS.contains(&id), "{id} is not reserved");
        Self(id.to_string())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formula reference to the installed path of a file with this id.
    pub fn file_reference(&self) -> String {
        format!("[#{}]", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Formats a GUID the way the installer schema expects: braced, uppercase.
pub fn format_guid(guid: &Uuid) -> String {
    guid.braced().to_string().to_uppercase()
}

/// Allocates identifiers and GUIDs for one document.
#[derive(Debug)]
pub struct IdentifierRegistry {
    used: HashSet<String>,
    stable: HashMap<String, Uuid>,
    guids: HashSet<Uuid>,
    rng: StdRng,
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierRegistry {
    /// Creates a registry seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a registry whose fresh GUIDs are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let used = RESERVED_IDENTIFIERS
            .iter()
            .map(|id| id.to_ascii_lowercase())
            .collect();
        Self {
            used,
            stable: HashMap::new(),
            guids: HashSet::new(),
            rng,
        }
    }

    /// Allocates a unique identifier derived from `hint`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when no allowed character survives sanitization.
    pub fn allocate(&mut self, hint: &str) -> Result<Identifier, IdentifierError> {
        self.allocate_prefixed("", hint)
    }

    /// Allocates a unique identifier `prefix` + sanitized `hint`.
    ///
    /// Overlong names are truncated; collisions get a `_2`, `_3`, ... suffix,
    /// truncating further when the suffix would exceed the length bound.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when no allowed character survives sanitization.
    pub fn allocate_prefixed(
        &mut self,
        prefix: &str,
        hint: &str,
    ) -> Result<Identifier, IdentifierError> {
        let body = sanitize(hint).ok_or_else(|| IdentifierError {
            hint: hint.to_string(),
        })?;

        let mut base = format!("{prefix}{body}");
        if base.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            base.insert(0, '_');
        }
        base.truncate(MAX_IDENTIFIER_LEN);

        if self.claim(&base) {
            return Ok(Identifier(base));
        }

        let mut n = 2usize;
        loop {
            let suffix = format!("_{n}");
            let keep = base.len().min(MAX_IDENTIFIER_LEN - suffix.len());
            let candidate = format!("{}{}", &base[..keep], suffix);
            if self.claim(&candidate) {
                log::debug!("Identifier {base} taken, using {candidate}");
                return Ok(Identifier(candidate));
            }
            n += 1;
        }
    }

    /// Whether an identifier is already in use.
    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(&id.to_ascii_lowercase())
    }

    /// Returns a fresh GUID, never equal to any GUID issued by this registry.
    pub fn allocate_guid(&mut self) -> Uuid {
        loop {
            let mut bytes = [0u8; 16];
            self.rng.fill_bytes(&mut bytes);
            let guid = uuid::Builder::from_random_bytes(bytes).into_uuid();
            if self.guids.insert(guid) {
                return guid;
            }
        }
    }

    /// Marks an externally supplied GUID as taken.
    pub fn reserve_guid(&mut self, guid: Uuid) {
        self.guids.insert(guid);
    }

    /// Returns the stable GUID for `seed`; the same seed yields the same GUID.
    pub fn allocate_stable(&mut self, seed: &str) -> Uuid {
        let guid = *self
            .stable
            .entry(seed.to_string())
            .or_insert_with(|| Uuid::new_v5(&STABLE_NAMESPACE, seed.as_bytes()));
        self.guids.insert(guid);
        guid
    }

    fn claim(&mut self, id: &str) -> bool {
        self.used.insert(id.to_ascii_lowercase())
    }
}

/// Maps disallowed characters to `_`, collapses runs of `_` and trims
/// separators from both ends. `None` when nothing is left.
fn sanitize(hint: &str) -> Option<String> {
    let mut out = String::with_capacity(hint.len());
    for c in hint.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
