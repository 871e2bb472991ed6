//! Serializable registry documents.
//!
//! A [`RegistryDocument`] describes a parse configuration and a list of
//! options in plain data, so that registries can live in JSON or YAML files
//! and be turned into a live [`Registry`] with fresh storage.
//!
//! ```yaml
//! config:
//!   response_files: true
//! options:
//!   - flag: "v,verbose"
//!     type: bool
//!     min: 0
//!     max: 0
//!   - name: files
//!     type: string
//!     min: 1
//!     max: unbounded
//! ```
//!
//! Opaque (`other`) options need callbacks and cannot be declared this way.

use serde::{Deserialize, Serialize};

use crate::config::ParseConfig;
use crate::registry::{OptionDescriptor, Registry};
use crate::types::{Arity, EnumTable, TypeTag};
use crate::validate::SchemaError;
use crate::value::Slot;

/// Upper parameter bound as written in a document: a count or `unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxBound {
    Count(usize),
    Named(Unbounded),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unbounded {
    Unbounded,
}

impl MaxBound {
    pub fn to_option(self) -> Option<usize> {
        match self {
            MaxBound::Count(n) => Some(n),
            MaxBound::Named(Unbounded::Unbounded) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDocument {
    pub name: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDocument {
    pub name: String,
    pub values: Vec<EnumValueDocument>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl From<&EnumDocument> for EnumTable {
    fn from(doc: &EnumDocument) -> Self {
        EnumTable {
            name: doc.name.clone(),
            entries: doc.values.iter().map(|v| (v.name.clone(), v.value)).collect(),
            case_sensitive: doc.case_sensitive,
        }
    }
}

/// One option in a [`RegistryDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub min: usize,
    pub max: MaxBound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_table: Option<EnumDocument>,
}

/// A parse configuration plus its options.
///
/// # Examples
///
/// ```
/// use argbind_core::RegistryDocument;
///
/// let doc = RegistryDocument::from_json_str(r#"{
///     "options": [
///         {"flag": "n", "type": "int", "min": 1, "max": 1, "default": "10"},
///         {"name": "rest", "type": "string", "min": 0, "max": "unbounded"}
///     ]
/// }"#).unwrap();
/// let (registry, slots) = doc.into_registry().unwrap();
/// assert_eq!(registry.len(), 2);
/// assert_eq!(slots.len(), 2);
/// assert!(registry.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub config: ParseConfig,
    #[serde(default)]
    pub options: Vec<OptionDocument>,
}

impl RegistryDocument {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed input.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Builds a registry with one fresh [`Slot`] per option, returned in
    /// registry order.
    ///
    /// The registry is not validated here.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownType`] for an unrecognized type name and
    /// [`SchemaError::InvalidArity`] when `min > max`.
    pub fn into_registry(&self) -> Result<(Registry, Vec<Slot>), SchemaError> {
        let mut registry = Registry::new();
        let mut slots = Vec::with_capacity(self.options.len());

        for doc in &self.options {
            let value_type: TypeTag = doc.value_type.parse()?;
            let slot = Slot::new();
            let mut descriptor = OptionDescriptor::new(
                doc.flag.as_deref(),
                doc.name.clone(),
                value_type,
                Arity {
                    min: doc.min,
                    max: doc.max.to_option(),
                },
                slot.clone(),
            );
            if descriptor.name.is_empty() {
                if let Some((_, long)) = descriptor.flag_pair() {
                    descriptor.name = long.to_string();
                } else if let Some(flag) = &doc.flag {
                    descriptor.name = flag.clone();
                }
            }
            descriptor.default = doc.default.clone();
            descriptor.info = doc.info.clone();
            descriptor.enum_table = doc.enum_table.as_ref().map(EnumTable::from);

            registry.push(descriptor)?;
            slots.push(slot);
        }

        Ok((registry, slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    const YAML: &str = r#"
config:
  response_files: true
  comment_regions: true
options:
  - flag: "v,verbose"
    type: bool
    min: 0
    max: 0
    info: say more
  - flag: e
    name: endian
    type: enum
    min: 1
    max: 1
    default: little
    enum:
      name: endian
      values:
        - name: little
          value: 1
        - name: big
          value: 2
  - name: files
    type: string
    min: 1
    max: unbounded
"#;

    #[test]
    fn test_yaml_document_builds_registry() {
        let doc: RegistryDocument = serde_yaml::from_str(YAML).unwrap();
        assert!(doc.config.response_files);
        assert!(doc.config.comment_regions);
        assert!(!doc.config.respect_help);

        let (registry, slots) = doc.into_registry().unwrap();
        assert_eq!(slots.len(), 3);
        assert!(registry.validate().is_ok());

        let opts = registry.options();
        assert_eq!(opts[0].name, "verbose");
        assert_eq!(opts[0].kind().unwrap(), Kind::Flag);
        assert_eq!(opts[1].enum_table.as_ref().and_then(|t| t.lookup("big")), Some(2));
        assert_eq!(opts[2].arity, Arity::at_least(1));
        assert!(opts[2].storage.as_ref().unwrap().ptr_eq(&slots[2]));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let doc = RegistryDocument::from_json_str(
            r#"{"options": [{"flag": "x", "type": "decimal", "min": 1, "max": 1}]}"#,
        )
        .unwrap();
        assert_eq!(
            doc.into_registry().unwrap_err(),
            SchemaError::UnknownType("decimal".into())
        );
    }

    #[test]
    fn test_bad_max_keyword_rejected() {
        let result = RegistryDocument::from_json_str(
            r#"{"options": [{"flag": "x", "type": "int", "min": 1, "max": "lots"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_other_type_fails_validation() {
        let doc = RegistryDocument::from_json_str(
            r#"{"options": [{"flag": "p", "type": "other", "min": 1, "max": 1}]}"#,
        )
        .unwrap();
        let (registry, _) = doc.into_registry().unwrap();
        assert!(matches!(registry.validate(), Err(SchemaError::MissingCallbacks { .. })));
    }

    #[test]
    fn test_document_serializes_unbounded() {
        let doc = RegistryDocument::from_json_str(
            r#"{"options": [{"name": "rest", "type": "string", "min": 0, "max": "unbounded"}]}"#,
        )
        .unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""max":"unbounded""#));
    }
}
