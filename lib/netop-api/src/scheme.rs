//! Process-wide registry of known API kinds

use kube::core::GroupVersionKind;
use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

static GLOBAL: LazyLock<Scheme> = LazyLock::new(Scheme::new);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    #[error("Conflicting registration for {group}/{version}, Kind={kind}")]
    Conflict {
        group: String,
        version: String,
        kind: String,
    },

    #[error("Kind is not registered: {0}")]
    NotRegistered(String),
}

/// Whether objects of a kind live inside a namespace
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Cluster,
    Namespaced,
}

/// Registration record for a single kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownType {
    pub gvk: GroupVersionKind,
    /// Resource plural, absent for list wrappers
    pub plural: Option<String>,
    pub scope: Scope,
    /// Item kind when this kind is a list wrapper
    pub list_of: Option<String>,
}

impl KnownType {
    pub fn is_list(&self) -> bool {
        self.list_of.is_some()
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.gvk.group.is_empty() {
            self.gvk.version.clone()
        } else {
            format!("{}/{}", self.gvk.group, self.gvk.version)
        }
    }
}

/// Implemented by every type that can be added to a [`Scheme`]
pub trait SchemeObject {
    fn known_type() -> KnownType;
}

/// Scheme maps group/version/kind triples to their registration records.
///
/// Registering the same record twice is a no-op. Registering a different
/// record under an already known kind fails with [`SchemeError::Conflict`].
#[derive(Debug, Default)]
pub struct Scheme {
    types: RwLock<HashMap<GroupVersionKind, KnownType>>,
}

impl Scheme {
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// The scheme shared by the whole process
    pub fn global() -> &'static Scheme {
        &GLOBAL
    }

    /// Register a type implementing [`SchemeObject`]
    pub fn add_known_type<T: SchemeObject>(&self) -> Result<(), SchemeError> {
        self.add(T::known_type())
    }

    /// Register a single record
    pub fn add(&self, known: KnownType) -> Result<(), SchemeError> {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = types.get(&known.gvk) {
            if *existing == known {
                debug!("Kind {} already registered", known.gvk.kind);
                return Ok(());
            }
            return Err(SchemeError::Conflict {
                group: known.gvk.group.clone(),
                version: known.gvk.version.clone(),
                kind: known.gvk.kind.clone(),
            });
        }

        debug!(
            "Registered kind {} in {}",
            known.gvk.kind,
            known.api_version()
        );
        types.insert(known.gvk.clone(), known);
        Ok(())
    }

    /// Whether the scheme knows about the given kind
    pub fn recognizes(&self, gvk: &GroupVersionKind) -> bool {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(gvk)
    }

    /// Look up the record for a kind
    pub fn lookup(&self, gvk: &GroupVersionKind) -> Result<KnownType, SchemeError> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(gvk)
            .cloned()
            .ok_or_else(|| {
                SchemeError::NotRegistered(format!(
                    "{}/{}, Kind={}",
                    gvk.group, gvk.version, gvk.kind
                ))
            })
    }

    /// Resolve an `apiVersion` / `kind` pair as found on the wire
    pub fn lookup_api_version(
        &self,
        api_version: &str,
        kind: &str,
    ) -> Result<KnownType, SchemeError> {
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };
        self.lookup(&GroupVersionKind::gvk(group, version, kind))
    }

    /// All kinds registered for a group/version, sorted by kind
    pub fn known_types(&self, group: &str, version: &str) -> Vec<KnownType> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        let mut known: Vec<KnownType> = types
            .values()
            .filter(|t| t.gvk.group == group && t.gvk.version == version)
            .cloned()
            .collect();
        known.sort_by(|a, b| a.gvk.kind.cmp(&b.gvk.kind));
        known
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
