//! Document regeneration — walks every registered holder and derives the
//! full saved-state document from current field values.
//!
//! The document is always rebuilt from scratch; nothing is merged against
//! previously saved content. Scalar values collapse to one record per
//! (class, property) with the last-registered instance winning; list and
//! tuple-list records are emitted one per (instance, property) and are
//! deliberately not collapsed the same way.

use std::collections::BTreeMap;

use tracing::debug;

use crate::document::{ListRecord, PropertyRecord, SavedDocument, TupleListRecord};
use crate::holder::{FieldRead, SharedHolder};

/// Build the complete document from the given holders, visited in order.
pub fn build_document(holders: &[SharedHolder]) -> SavedDocument {
    // BTreeMap keys give the (class, property) sort for free, and a later
    // instance of the same class overwrites the earlier one's values.
    let mut scalars: BTreeMap<String, BTreeMap<String, Option<String>>> = BTreeMap::new();
    let mut lists: Vec<ListRecord> = Vec::new();
    let mut tuple_lists: Vec<TupleListRecord> = Vec::new();

    for shared in holders {
        let holder = shared.lock().unwrap();
        let class = holder.instance_name();

        for desc in holder.descriptors() {
            let path = desc.access_path();
            let value = match holder.read_field(&path) {
                // A sub-property whose host object is currently absent
                // contributes nothing, not an empty record.
                FieldRead::Missing => {
                    debug!(class = %class, property = %path, "field unreadable, not saved");
                    continue;
                }
                FieldRead::Nil => None,
                FieldRead::Value(text) => Some(text),
            };
            scalars
                .entry(class.clone())
                .or_default()
                .insert(desc.record_name(), value);
        }

        for list in holder.string_lists() {
            let Some(items) = holder.list_items(list) else {
                continue;
            };
            if items.is_empty() {
                continue;
            }
            lists.push(ListRecord {
                class: class.clone(),
                list: list.to_string(),
                items,
            });
        }

        for list in holder.tuple_lists() {
            let Some(pairs) = holder.tuple_items(list) else {
                continue;
            };
            if pairs.is_empty() {
                continue;
            }
            tuple_lists.push(TupleListRecord {
                class: class.clone(),
                list: list.to_string(),
                pairs,
            });
        }
    }

    let values: Vec<PropertyRecord> = scalars
        .into_iter()
        .flat_map(|(class, props)| {
            props.into_iter().map(move |(property, value)| PropertyRecord {
                class: class.clone(),
                property,
                value,
            })
        })
        .collect();

    debug!(
        values = values.len(),
        lists = lists.len(),
        tuple_lists = tuple_lists.len(),
        "document rebuilt"
    );

    SavedDocument {
        values,
        lists,
        tuple_lists,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
