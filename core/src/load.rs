//! Record application — finds a holder's records in the saved document,
//! converts text back to typed values, and assigns them.
//!
//! Almost every anomaly degrades to "leave the field at its default":
//! unknown properties, absent intermediates on a dotted path, unsupported
//! types, and absent values are all silent skips. The one failure that
//! propagates is text that exists but does not parse as the destination
//! type.
//!
//! List restoration appends onto whatever the collection already holds.
//! Applying the same document twice therefore doubles list contents; run
//! a full load once per instance, on its first ready signal.

use tracing::debug;

use crate::document::{PropertyRecord, SavedDocument};
use crate::error::PersistError;
use crate::holder::{PropertyDescriptor, StateHolder, WriteOutcome};
use crate::parsers::ParserRegistry;
use crate::value::FieldValue;

/// Apply all of a holder's records: scalars, string lists, tuple lists.
pub fn apply_document(
    doc: &SavedDocument,
    holder: &mut dyn StateHolder,
    parsers: &ParserRegistry,
) -> Result<(), PersistError> {
    let class = holder.instance_name();

    for record in doc.properties_for(&class) {
        apply_record(holder, parsers, record)?;
    }

    for record in doc.lists_for(&class) {
        // A list the holder does not declare is skipped whole.
        if holder.list_items(&record.list).is_none() {
            debug!(class = %class, list = %record.list, "unknown list, skipped");
            continue;
        }
        for item in &record.items {
            holder.append_list_item(&record.list, item.clone());
        }
    }

    for record in doc.tuple_lists_for(&class) {
        let Some((first_ty, second_ty)) = holder.tuple_item_types(&record.list) else {
            debug!(class = %class, list = %record.list, "unknown tuple list, skipped");
            continue;
        };
        let (Some(parse_first), Some(parse_second)) =
            (parsers.resolve(&first_ty), parsers.resolve(&second_ty))
        else {
            debug!(class = %class, list = %record.list, "unsupported tuple element type, skipped");
            continue;
        };
        for (first_raw, second_raw) in &record.pairs {
            let first = parse_first(first_raw).ok_or_else(|| PersistError::Conversion {
                value: first_raw.clone(),
                target: first_ty.key(),
                property: record.list.clone(),
            })?;
            let second = parse_second(second_raw).ok_or_else(|| PersistError::Conversion {
                value: second_raw.clone(),
                target: second_ty.key(),
                property: record.list.clone(),
            })?;
            holder.append_tuple_item(&record.list, first, second);
        }
    }

    Ok(())
}

/// Apply only the records matching one descriptor — used to refresh a
/// single field long after the initial load, without touching lists.
pub fn apply_single(
    doc: &SavedDocument,
    holder: &mut dyn StateHolder,
    parsers: &ParserRegistry,
    descriptor: &PropertyDescriptor,
) -> Result<(), PersistError> {
    let class = holder.instance_name();
    let name = descriptor.record_name();
    for record in doc.properties_for(&class) {
        if record.property == name {
            apply_record(holder, parsers, record)?;
        }
    }
    Ok(())
}

/// Convert and assign one scalar record.
fn apply_record(
    holder: &mut dyn StateHolder,
    parsers: &ParserRegistry,
    record: &PropertyRecord,
) -> Result<(), PersistError> {
    let path = record.property.as_str();

    // The path may not resolve on this holder (renamed field, absent
    // intermediate object): leave the field at its default.
    let Some(ty) = holder.field_type(path) else {
        debug!(property = %path, "field not resolvable, skipped");
        return Ok(());
    };

    // A record with no value leaves the field at its constructor default.
    let Some(raw) = record.value.as_deref() else {
        return Ok(());
    };

    // Text fields take the saved value verbatim, empty or not. For any
    // other type, empty text means "nothing was saved" and the default
    // stands.
    if ty.is_text() {
        write_checked(holder, path, FieldValue::Text(raw.to_string()));
        return Ok(());
    }
    if raw.is_empty() {
        return Ok(());
    }

    let Some(parse) = parsers.resolve_for(&ty, path) else {
        debug!(property = %path, target = %ty.key(), "unsupported type, skipped");
        return Ok(());
    };
    let value = parse(raw).ok_or_else(|| PersistError::Conversion {
        value: raw.to_string(),
        target: ty.key(),
        property: record.property.clone(),
    })?;
    write_checked(holder, path, value);
    Ok(())
}

fn write_checked(holder: &mut dyn StateHolder, path: &str, value: FieldValue) {
    match holder.write_field(path, value) {
        WriteOutcome::Applied => {}
        outcome => debug!(property = %path, ?outcome, "assignment skipped"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ListRecord, TupleListRecord};
    use crate::holder::{split_path, FieldAccess, FieldRead};
    use crate::value::FieldType;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Prefs {
        port: i64,
        auto_sync: bool,
        device: Option<String>,
        recent: Vec<String>,
        history: Vec<(String, NaiveDate)>,
    }

    impl FieldAccess for Prefs {
        fn field_type(&self, path: &str) -> Option<FieldType> {
            match path {
                "Port" => Some(FieldType::Integer),
                "AutoSync" => Some(FieldType::Boolean),
                "Device" => Some(FieldType::optional(FieldType::Text)),
                "Theme" => Some(FieldType::Named("Theme".into())),
                _ => None,
            }
        }

        fn read_field(&self, path: &str) -> FieldRead {
            match split_path(path) {
                ("Port", None) => FieldRead::Value(self.port.to_string()),
                _ => FieldRead::Missing,
            }
        }

        fn write_field(&mut self, path: &str, value: FieldValue) -> WriteOutcome {
            match (path, value) {
                ("Port", FieldValue::Integer(n)) => {
                    self.port = n;
                    WriteOutcome::Applied
                }
                ("AutoSync", FieldValue::Boolean(b)) => {
                    self.auto_sync = b;
                    WriteOutcome::Applied
                }
                ("Device", FieldValue::Text(s)) => {
                    self.device = Some(s);
                    WriteOutcome::Applied
                }
                (_, _) => WriteOutcome::NoSuchField,
            }
        }
    }

    impl StateHolder for Prefs {
        fn instance_name(&self) -> String {
            "Preferences".into()
        }

        fn descriptors(&self) -> Vec<PropertyDescriptor> {
            vec![
                PropertyDescriptor::scalar("Port", FieldType::Integer),
                PropertyDescriptor::scalar("AutoSync", FieldType::Boolean),
                PropertyDescriptor::scalar("Device", FieldType::optional(FieldType::Text)),
            ]
        }

        fn string_lists(&self) -> Vec<&'static str> {
            vec!["Recent"]
        }

        fn list_items(&self, list: &str) -> Option<Vec<String>> {
            (list == "Recent").then(|| self.recent.clone())
        }

        fn append_list_item(&mut self, list: &str, item: String) {
            if list == "Recent" {
                self.recent.push(item);
            }
        }

        fn tuple_lists(&self) -> Vec<&'static str> {
            vec!["History"]
        }

        fn tuple_item_types(&self, list: &str) -> Option<(FieldType, FieldType)> {
            (list == "History").then(|| (FieldType::Text, FieldType::Date))
        }

        fn append_tuple_item(&mut self, list: &str, first: FieldValue, second: FieldValue) {
            if list == "History" {
                if let (FieldValue::Text(name), FieldValue::Date(date)) = (first, second) {
                    self.history.push((name, date));
                }
            }
        }
    }

    fn record(property: &str, value: &str) -> PropertyRecord {
        PropertyRecord {
            class: "Preferences".into(),
            property: property.into(),
            value: Some(value.into()),
        }
    }

    fn doc_with(values: Vec<PropertyRecord>) -> SavedDocument {
        SavedDocument {
            values,
            ..SavedDocument::default()
        }
    }

    // --- Scalars ---

    #[test]
    fn scalar_record_assigned() {
        let doc = doc_with(vec![record("Port", "8001")]);
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.port, 8001);
    }

    #[test]
    fn capitalized_boolean_normalized() {
        let doc = doc_with(vec![record("AutoSync", "True")]);
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert!(prefs.auto_sync);
    }

    #[test]
    fn unknown_property_skipped_silently() {
        let doc = doc_with(vec![record("Gone", "1"), record("Port", "5")]);
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.port, 5);
    }

    #[test]
    fn records_for_other_classes_ignored() {
        let mut rec = record("Port", "9");
        rec.class = "Other".into();
        let doc = doc_with(vec![rec]);
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.port, 0);
    }

    #[test]
    fn conversion_failure_propagates() {
        let doc = doc_with(vec![record("Port", "not-a-number")]);
        let mut prefs = Prefs::default();
        let err = apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not-a-number"));
        assert!(msg.contains("integer"));
        assert!(msg.contains("Port"));
    }

    #[test]
    fn absent_value_leaves_default() {
        let doc = doc_with(vec![PropertyRecord {
            class: "Preferences".into(),
            property: "Port".into(),
            value: None,
        }]);
        let mut prefs = Prefs { port: 7, ..Prefs::default() };
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.port, 7);
    }

    #[test]
    fn empty_text_leaves_non_text_default() {
        let doc = doc_with(vec![record("Port", "")]);
        let mut prefs = Prefs { port: 7, ..Prefs::default() };
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.port, 7);
    }

    #[test]
    fn empty_text_assigned_to_text_field() {
        let doc = doc_with(vec![record("Device", "")]);
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.device.as_deref(), Some(""));
    }

    #[test]
    fn unsupported_named_type_skipped() {
        let doc = doc_with(vec![record("Theme", "dark"), record("Port", "3")]);
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.port, 3);
    }

    // --- Lists ---

    fn list_doc() -> SavedDocument {
        SavedDocument {
            lists: vec![ListRecord {
                class: "Preferences".into(),
                list: "Recent".into(),
                items: vec!["/music".into(), "/podcasts".into()],
            }],
            ..SavedDocument::default()
        }
    }

    #[test]
    fn list_items_appended_in_order() {
        let mut prefs = Prefs::default();
        apply_document(&list_doc(), &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.recent, vec!["/music", "/podcasts"]);
    }

    #[test]
    fn list_load_appends_not_replaces() {
        let mut prefs = Prefs {
            recent: vec!["/existing".into()],
            ..Prefs::default()
        };
        apply_document(&list_doc(), &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.recent, vec!["/existing", "/music", "/podcasts"]);
    }

    #[test]
    fn loading_twice_doubles_the_list() {
        let mut prefs = Prefs::default();
        let parsers = ParserRegistry::new();
        apply_document(&list_doc(), &mut prefs, &parsers).unwrap();
        apply_document(&list_doc(), &mut prefs, &parsers).unwrap();
        assert_eq!(prefs.recent.len(), 4);
    }

    #[test]
    fn unknown_list_skipped() {
        let mut doc = list_doc();
        doc.lists[0].list = "Unknown".into();
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert!(prefs.recent.is_empty());
    }

    // --- Tuple lists ---

    #[test]
    fn tuple_pairs_reconstructed_with_element_types() {
        let doc = SavedDocument {
            tuple_lists: vec![TupleListRecord {
                class: "Preferences".into(),
                list: "History".into(),
                pairs: vec![
                    ("a".into(), "2020-01-01".into()),
                    ("b".into(), "2021-06-15".into()),
                ],
            }],
            ..SavedDocument::default()
        };
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert_eq!(prefs.history.len(), 2);
        assert_eq!(prefs.history[0].0, "a");
        assert_eq!(
            prefs.history[1].1,
            NaiveDate::from_ymd_opt(2021, 6, 15).unwrap()
        );
    }

    #[test]
    fn tuple_conversion_failure_propagates() {
        let doc = SavedDocument {
            tuple_lists: vec![TupleListRecord {
                class: "Preferences".into(),
                list: "History".into(),
                pairs: vec![("a".into(), "not-a-date".into())],
            }],
            ..SavedDocument::default()
        };
        let mut prefs = Prefs::default();
        let err = apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn unknown_tuple_list_skipped() {
        let doc = SavedDocument {
            tuple_lists: vec![TupleListRecord {
                class: "Preferences".into(),
                list: "Unknown".into(),
                pairs: vec![("a".into(), "b".into())],
            }],
            ..SavedDocument::default()
        };
        let mut prefs = Prefs::default();
        apply_document(&doc, &mut prefs, &ParserRegistry::new()).unwrap();
        assert!(prefs.history.is_empty());
    }

    // --- Single-field reload ---

    #[test]
    fn apply_single_touches_only_named_property() {
        let doc = doc_with(vec![record("Port", "8001"), record("AutoSync", "true")]);
        let mut prefs = Prefs::default();
        let descriptor = PropertyDescriptor::scalar("Port", FieldType::Integer);
        apply_single(&doc, &mut prefs, &ParserRegistry::new(), &descriptor).unwrap();
        assert_eq!(prefs.port, 8001);
        assert!(!prefs.auto_sync);
    }

    #[test]
    fn apply_single_ignores_lists() {
        let mut doc = list_doc();
        doc.values.push(record("Port", "1"));
        let mut prefs = Prefs::default();
        let descriptor = PropertyDescriptor::scalar("Port", FieldType::Integer);
        apply_single(&doc, &mut prefs, &ParserRegistry::new(), &descriptor).unwrap();
        assert!(prefs.recent.is_empty());
    }
}
