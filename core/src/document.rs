//! The saved-state document — the full on-disk snapshot of all tagged
//! state across all known classes.
//!
//! `SavedDocument` is the serializable root holding three record kinds:
//! scalar property records, string-list records, and two-element tuple-list
//! records. All fields are plain data, which keeps the document trivially
//! serializable and diffable.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PropertyRecord
// ---------------------------------------------------------------------------

/// One saved scalar value, keyed by (class, property).
///
/// `property` may be a dotted path such as `Device.Name`; the load side
/// resolves each segment in turn. `value: None` records "the field held no
/// value" — distinct from an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyRecord {
    pub class: String,
    pub property: String,
    pub value: Option<String>,
}

// ---------------------------------------------------------------------------
// ListRecord
// ---------------------------------------------------------------------------

/// One saved string collection. Item order is significant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListRecord {
    pub class: String,
    pub list: String,
    pub items: Vec<String>,
}

// ---------------------------------------------------------------------------
// TupleListRecord
// ---------------------------------------------------------------------------

/// One saved collection of two-element tuples, both elements as text.
/// Pair order is significant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TupleListRecord {
    pub class: String,
    pub list: String,
    pub pairs: Vec<(String, String)>,
}

// ---------------------------------------------------------------------------
// SavedDocument
// ---------------------------------------------------------------------------

/// Complete saved-state document.
///
/// Within one save, scalar records are unique per (class, property) and
/// sorted; list and tuple-list records keep enumeration order and may
/// repeat a (class, list) key when several live instances share a class
/// name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedDocument {
    #[serde(default)]
    pub values: Vec<PropertyRecord>,
    #[serde(default)]
    pub lists: Vec<ListRecord>,
    #[serde(default)]
    pub tuple_lists: Vec<TupleListRecord>,
}

impl SavedDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        SavedDocument::default()
    }

    /// Whether the document holds no records of any kind.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.lists.is_empty() && self.tuple_lists.is_empty()
    }

    /// All scalar records for one class.
    pub fn properties_for<'a>(
        &'a self,
        class: &'a str,
    ) -> impl Iterator<Item = &'a PropertyRecord> {
        self.values.iter().filter(move |r| r.class == class)
    }

    /// Look up a single scalar record by (class, property).
    pub fn property(&self, class: &str, property: &str) -> Option<&PropertyRecord> {
        self.values
            .iter()
            .find(|r| r.class == class && r.property == property)
    }

    /// All string-list records for one class, in document order.
    pub fn lists_for<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a ListRecord> {
        self.lists.iter().filter(move |r| r.class == class)
    }

    /// All tuple-list records for one class, in document order.
    pub fn tuple_lists_for<'a>(
        &'a self,
        class: &'a str,
    ) -> impl Iterator<Item = &'a TupleListRecord> {
        self.tuple_lists.iter().filter(move |r| r.class == class)
    }

    /// Sorted, de-duplicated class names across all record kinds.
    pub fn classes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .values
            .iter()
            .map(|r| r.class.as_str())
            .chain(self.lists.iter().map(|r| r.class.as_str()))
            .chain(self.tuple_lists.iter().map(|r| r.class.as_str()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Sort scalar records lexicographically by (class, property). List
    /// records are left in enumeration order.
    pub fn sort_values(&mut self) {
        self.values
            .sort_by(|a, b| (&a.class, &a.property).cmp(&(&b.class, &b.property)));
    }

    // -------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------

    /// Serialize to pretty-printed JSON. Output is deterministic for a
    /// given document, so an unchanged document always produces identical
    /// bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn value(class: &str, property: &str, value: &str) -> PropertyRecord {
        PropertyRecord {
            class: class.into(),
            property: property.into(),
            value: Some(value.into()),
        }
    }

    fn sample() -> SavedDocument {
        SavedDocument {
            values: vec![
                value("Preferences", "Port", "8001"),
                value("Preferences", "AutoSync", "true"),
                value("MainWindow", "Width", "1280"),
            ],
            lists: vec![ListRecord {
                class: "Preferences".into(),
                list: "RecentFolders".into(),
                items: vec!["/music".into(), "/podcasts".into()],
            }],
            tuple_lists: vec![TupleListRecord {
                class: "Preferences".into(),
                list: "SyncHistory".into(),
                pairs: vec![("a".into(), "2020-01-01".into())],
            }],
        }
    }

    // --- Construction ---

    #[test]
    fn new_document_is_empty() {
        let doc = SavedDocument::new();
        assert!(doc.is_empty());
        assert!(doc.classes().is_empty());
    }

    #[test]
    fn sample_document_is_not_empty() {
        assert!(!sample().is_empty());
    }

    // --- Lookups ---

    #[test]
    fn properties_for_filters_by_class() {
        let doc = sample();
        let props: Vec<_> = doc.properties_for("Preferences").collect();
        assert_eq!(props.len(), 2);
        assert!(props.iter().all(|r| r.class == "Preferences"));
    }

    #[test]
    fn property_lookup_by_key() {
        let doc = sample();
        let rec = doc.property("Preferences", "Port").unwrap();
        assert_eq!(rec.value.as_deref(), Some("8001"));
        assert!(doc.property("Preferences", "Nope").is_none());
    }

    #[test]
    fn lists_for_filters_by_class() {
        let doc = sample();
        assert_eq!(doc.lists_for("Preferences").count(), 1);
        assert_eq!(doc.lists_for("MainWindow").count(), 0);
    }

    #[test]
    fn classes_sorted_and_deduped() {
        let doc = sample();
        assert_eq!(doc.classes(), vec!["MainWindow", "Preferences"]);
    }

    // --- Ordering ---

    #[test]
    fn sort_values_orders_by_class_then_property() {
        let mut doc = sample();
        doc.sort_values();
        let keys: Vec<(&str, &str)> = doc
            .values
            .iter()
            .map(|r| (r.class.as_str(), r.property.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("MainWindow", "Width"),
                ("Preferences", "AutoSync"),
                ("Preferences", "Port"),
            ]
        );
    }

    #[test]
    fn sort_values_leaves_list_order_alone() {
        let mut doc = sample();
        doc.sort_values();
        assert_eq!(doc.lists[0].items, vec!["/music", "/podcasts"]);
    }

    // --- Serialization ---

    #[test]
    fn json_round_trip() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        let back = SavedDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn json_preserves_absent_value() {
        let doc = SavedDocument {
            values: vec![PropertyRecord {
                class: "Preferences".into(),
                property: "Device".into(),
                value: None,
            }],
            ..SavedDocument::default()
        };
        let back = SavedDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back.values[0].value, None);
    }

    #[test]
    fn json_is_deterministic() {
        let doc = sample();
        assert_eq!(doc.to_json().unwrap(), doc.to_json().unwrap());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let doc = SavedDocument::from_json(r#"{ "values": [] }"#).unwrap();
        assert!(doc.lists.is_empty());
        assert!(doc.tuple_lists.is_empty());
    }

    #[test]
    fn from_json_error_on_invalid() {
        assert!(SavedDocument::from_json("not json").is_err());
    }
}
