//! Draft Registry
//!
//! Resolves draft identifiers to compiled schema documents. The registry is
//! read-only once built: either from the drafts bundled into the binary
//! (`schema/*.json`, embedded at compile time) or from any set of drafts a
//! caller constructs, e.g. synthetic schemas in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use include_dir::{include_dir, Dir};
use jsonschema::{Draft as JsonSchemaDraft, JSONSchema};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::checksum::Checksum;
use crate::error::{Error, Result};

static BUNDLED_SCHEMAS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/schema");

/// A named, compiled schema draft
pub struct Draft {
    id: String,
    schema: Value,
    compiled: JSONSchema,
    field_order: Vec<String>,
    checksum: Checksum,
}

impl Draft {
    /// Compile a draft from its JSON Schema document.
    ///
    /// The order of the schema's `properties` is the canonical field order
    /// used when serializing.
    pub fn from_json(id: impl Into<String>, schema: Value) -> Result<Self> {
        let id = id.into();

        let compiled = JSONSchema::options()
            .with_draft(JsonSchemaDraft::Draft7)
            .compile(&schema)
            .map_err(|e| Error::InvalidSchema {
                draft: id.clone(),
                reason: e.to_string(),
            })?;

        let field_order = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default();

        let checksum = Checksum::from_json(&schema);

        Ok(Self {
            id,
            schema,
            compiled,
            field_order,
            checksum,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw schema document
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub(crate) fn compiled(&self) -> &JSONSchema {
        &self.compiled
    }

    /// Known field names in canonical order
    pub fn field_order(&self) -> &[String] {
        &self.field_order
    }

    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }
}

impl fmt::Debug for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draft")
            .field("id", &self.id)
            .field("field_order", &self.field_order)
            .field("checksum", &self.checksum)
            .finish_non_exhaustive()
    }
}

/// Listing entry for a registered draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftInfo {
    pub id: String,
    pub is_default: bool,
    pub checksum: Checksum,
}

/// Read-only set of drafts with one designated default
#[derive(Debug)]
pub struct DraftRegistry {
    drafts: BTreeMap<String, Draft>,
    default: String,
}

impl DraftRegistry {
    /// Build a registry from drafts.
    ///
    /// With `default` unset, the latest draft (greatest identifier) becomes
    /// the default.
    pub fn new(drafts: impl IntoIterator<Item = Draft>, default: Option<&str>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for draft in drafts {
            if by_id.contains_key(draft.id()) {
                return Err(Error::Registry(format!("draft {} is registered twice", draft.id())));
            }
            by_id.insert(draft.id().to_string(), draft);
        }

        let default = match default {
            Some(id) if by_id.contains_key(id) => id.to_string(),
            Some(id) => {
                return Err(Error::Registry(format!("default draft {} is not registered", id)));
            }
            None => by_id
                .keys()
                .next_back()
                .cloned()
                .ok_or_else(|| Error::Registry("no drafts registered".to_string()))?,
        };

        debug!(drafts = by_id.len(), default = %default, "draft registry ready");
        Ok(Self {
            drafts: by_id,
            default,
        })
    }

    /// The drafts bundled with this crate, loaded once per process
    pub fn bundled() -> Result<&'static DraftRegistry> {
        static BUNDLED: OnceLock<std::result::Result<DraftRegistry, String>> = OnceLock::new();

        BUNDLED
            .get_or_init(|| Self::from_embedded(&BUNDLED_SCHEMAS).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|reason| Error::Registry(reason.clone()))
    }

    /// Load every `*.json` file of an embedded directory as a draft named
    /// after the file stem
    pub fn from_embedded(dir: &Dir<'_>) -> Result<Self> {
        let mut drafts = Vec::new();
        for file in dir.files() {
            let Some(id) = draft_id(file.path()) else {
                warn!(path = %file.path().display(), "skipping non-schema file");
                continue;
            };
            let schema: Value = serde_json::from_slice(file.contents())?;
            drafts.push(Draft::from_json(id, schema)?);
        }
        Self::new(drafts, None)
    }

    /// Resolve a draft by id, or the default draft when `name` is `None`
    pub fn resolve(&self, name: Option<&str>) -> Result<&Draft> {
        let name = name.unwrap_or(&self.default);
        self.drafts.get(name).ok_or_else(|| Error::UnknownDraft {
            name: name.to_string(),
            known: self.drafts.keys().cloned().collect(),
            suggestion: self.closest(name),
        })
    }

    pub fn default_draft(&self) -> &Draft {
        // `new` guarantees the default is registered
        &self.drafts[&self.default]
    }

    pub fn default_id(&self) -> &str {
        &self.default
    }

    /// All drafts sorted by id
    pub fn list_drafts(&self) -> Vec<DraftInfo> {
        self.drafts
            .values()
            .map(|draft| DraftInfo {
                id: draft.id().to_string(),
                is_default: draft.id() == self.default,
                checksum: draft.checksum().clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    fn closest(&self, query: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default();
        self.drafts
            .keys()
            .filter_map(|id| matcher.fuzzy_match(id, query).map(|score| (score, id)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, id)| id.clone())
    }
}

fn draft_id(path: &Path) -> Option<&str> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()
}
