//! Business function registry
//!
//! A catalogue of small, independent, stateless business functions grouped
//! in four families (validators, calculations, transformers, generators).
//! Each entry reads named fields from a JSON object and returns a JSON
//! object; entries never share state and never mutate their input.

pub mod calculations;
pub mod error;
pub mod generators;
pub mod input;
pub mod transformers;
pub mod validators;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::domain::BusinessModule;

pub use error::RegistryError;
pub use input::Input;

/// Signature shared by every registry entry
pub type EntryFn = fn(&Input<'_>) -> Result<Value, RegistryError>;

/// Registry family, also the URL segment under `/api/registry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Validator,
    Calculation,
    Transformer,
    Generator,
}

impl EntryKind {
    pub const ALL: [EntryKind; 4] = [
        EntryKind::Validator,
        EntryKind::Calculation,
        EntryKind::Transformer,
        EntryKind::Generator,
    ];

    pub fn segment(&self) -> &'static str {
        match self {
            EntryKind::Validator => "validators",
            EntryKind::Calculation => "calculations",
            EntryKind::Transformer => "transformers",
            EntryKind::Generator => "generators",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for EntryKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKind::ALL
            .into_iter()
            .find(|kind| kind.segment() == s)
            .ok_or_else(|| RegistryError::NotFound { id: s.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Array,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

/// Public description of a registry entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryDescriptor {
    /// `"{kind}.{name}"`, e.g. `validators.iban`
    pub id: String,
    pub kind: EntryKind,
    pub name: String,
    pub module: BusinessModule,
    pub description: String,
    pub inputs: Vec<FieldSpec>,
    /// False for generators drawing random values
    pub deterministic: bool,
}

pub struct Entry {
    descriptor: EntryDescriptor,
    handler: EntryFn,
}

impl Entry {
    pub fn new(
        kind: EntryKind,
        name: &str,
        module: BusinessModule,
        description: &str,
        handler: EntryFn,
    ) -> Self {
        Self {
            descriptor: EntryDescriptor {
                id: entry_id(kind, name),
                kind,
                name: name.to_string(),
                module,
                description: description.to_string(),
                inputs: Vec::new(),
                deterministic: true,
            },
            handler,
        }
    }

    pub fn required(self, name: &str, field_type: FieldType) -> Self {
        self.input(name, field_type, true)
    }

    pub fn optional(self, name: &str, field_type: FieldType) -> Self {
        self.input(name, field_type, false)
    }

    fn input(mut self, name: &str, field_type: FieldType, required: bool) -> Self {
        self.descriptor.inputs.push(FieldSpec {
            name: name.to_string(),
            field_type,
            required,
        });
        self
    }

    pub fn nondeterministic(mut self) -> Self {
        self.descriptor.deterministic = false;
        self
    }

    pub fn descriptor(&self) -> &EntryDescriptor {
        &self.descriptor
    }
}

/// Result of one record of a batch invocation
#[derive(Debug)]
pub struct BatchOutcome {
    pub index: usize,
    pub result: Result<Value, RegistryError>,
}

pub fn entry_id(kind: EntryKind, name: &str) -> String {
    format!("{}.{}", kind.segment(), name)
}

/// The catalogue. Read-only once built; share it behind an `Arc`.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalogue with every built-in entry of the four families
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        let families = [
            validators::entries(),
            calculations::entries(),
            transformers::entries(),
            generators::entries(),
        ];
        for entry in families.into_iter().flatten() {
            registry.register(entry);
        }

        tracing::debug!("Registry built with {} entries", registry.len());
        registry
    }

    /// Add an entry, replacing any entry already registered under its id
    pub fn register(&mut self, entry: Entry) {
        let id = entry.descriptor.id.clone();
        if self.entries.insert(id.clone(), entry).is_some() {
            tracing::warn!("Registry entry {} replaced", id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, kind: EntryKind, name: &str) -> Option<&EntryDescriptor> {
        self.entries
            .get(&entry_id(kind, name))
            .map(Entry::descriptor)
    }

    /// All descriptors, ordered by id
    pub fn list(&self) -> impl Iterator<Item = &EntryDescriptor> {
        self.entries.values().map(Entry::descriptor)
    }

    pub fn list_kind(&self, kind: EntryKind) -> Vec<&EntryDescriptor> {
        self.list().filter(|d| d.kind == kind).collect()
    }

    fn entry(&self, kind: EntryKind, name: &str) -> Result<&Entry, RegistryError> {
        let id = entry_id(kind, name);
        self.entries
            .get(&id)
            .ok_or(RegistryError::NotFound { id })
    }

    pub fn invoke(
        &self,
        kind: EntryKind,
        name: &str,
        payload: &Value,
    ) -> Result<Value, RegistryError> {
        let entry = self.entry(kind, name)?;
        let input = Input::new(payload)?;
        (entry.handler)(&input)
    }

    /// Run one entry over many records. Per-record failures are reported in
    /// the outcome list; only an unknown entry fails the whole batch.
    pub fn invoke_batch(
        &self,
        kind: EntryKind,
        name: &str,
        records: &[Value],
    ) -> Result<Vec<BatchOutcome>, RegistryError> {
        let entry = self.entry(kind, name)?;

        let outcomes = records
            .iter()
            .enumerate()
            .map(|(index, record)| BatchOutcome {
                index,
                result: Input::new(record).and_then(|input| (entry.handler)(&input)),
            })
            .collect();

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_covers_every_family() {
        let registry = Registry::builtin();
        for kind in EntryKind::ALL {
            assert!(
                !registry.list_kind(kind).is_empty(),
                "no entries for {}",
                kind
            );
        }
        assert_eq!(registry.list().count(), registry.len());
    }

    #[test]
    fn test_kind_parses_from_segment() {
        assert_eq!(
            "validators".parse::<EntryKind>().unwrap(),
            EntryKind::Validator
        );
        assert_eq!(
            "generators".parse::<EntryKind>().unwrap(),
            EntryKind::Generator
        );
        assert!("validator".parse::<EntryKind>().is_err());
    }

    #[test]
    fn test_invoke_unknown_entry() {
        let registry = Registry::builtin();
        let err = registry
            .invoke(EntryKind::Validator, "isbn", &json!({"value": "x"}))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { id } if id == "validators.isbn"));
    }

    #[test]
    fn test_invoke_rejects_non_object() {
        let registry = Registry::builtin();
        let err = registry
            .invoke(EntryKind::Validator, "iban", &json!("FR76"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPayload(_)));
    }

    #[test]
    fn test_register_replaces_existing_entry() {
        fn constant(_: &Input<'_>) -> Result<Value, RegistryError> {
            Ok(json!({ "answer": 42 }))
        }

        let mut registry = Registry::builtin();
        let before = registry.len();
        registry.register(Entry::new(
            EntryKind::Calculation,
            "vat",
            BusinessModule::Accounting,
            "Override",
            constant,
        ));

        assert_eq!(registry.len(), before);
        let result = registry
            .invoke(EntryKind::Calculation, "vat", &json!({}))
            .unwrap();
        assert_eq!(result, json!({ "answer": 42 }));
    }

    #[test]
    fn test_batch_keeps_going_after_record_error() {
        let registry = Registry::builtin();
        let records = vec![
            json!({ "value": "FR7630006000011234567890189" }),
            json!({ "other": 1 }),
            json!(12),
            json!({ "value": "DE89370400440532013000" }),
        ];

        let outcomes = registry
            .invoke_batch(EntryKind::Validator, "iban", &records)
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(RegistryError::MissingField { .. })
        ));
        assert!(matches!(
            outcomes[2].result,
            Err(RegistryError::InvalidPayload(_))
        ));
        assert_eq!(outcomes[3].index, 3);
        assert_eq!(outcomes[3].result.as_ref().unwrap()["valid"], json!(true));
    }

    #[test]
    fn test_batch_unknown_entry_fails_whole_batch() {
        let registry = Registry::builtin();
        assert!(registry
            .invoke_batch(EntryKind::Generator, "nope", &[json!({})])
            .is_err());
    }
}
