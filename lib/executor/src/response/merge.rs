use hive_fusion_query_planner::EntityKeyHint;

use crate::response::value::Value;

/// Merges `source` into `target`. Objects are merged key by key, keeping the order in which
/// keys first appeared, arrays element-wise. A null source never overwrites anything.
pub fn deep_merge(target: &mut Value, source: Value) {
    KeyedMerge { hints: &[] }.merge(target, source, &mut Vec::new())
}

/// Like [`deep_merge`], but lists of entities listed in `hints` are matched item by item on
/// their key fields instead of their position.
pub fn deep_merge_with_keys(target: &mut Value, source: Value, hints: &[EntityKeyHint]) {
    KeyedMerge { hints }.merge(target, source, &mut Vec::new())
}

struct KeyedMerge<'h> {
    hints: &'h [EntityKeyHint],
}

impl KeyedMerge<'_> {
    fn merge(&self, target: &mut Value, source: Value, path: &mut Vec<String>) {
        match (target, source) {
            (_, Value::Null) => {}
            (Value::Object(target_entries), Value::Object(source_entries)) => {
                for (key, source_value) in source_entries {
                    match target_entries.iter_mut().find(|(name, _)| *name == key) {
                        Some((_, target_value)) => {
                            path.push(key);
                            self.merge(target_value, source_value, path);
                            path.pop();
                        }
                        None => target_entries.push((key, source_value)),
                    }
                }
            }
            (Value::Array(target_items), Value::Array(source_items)) => {
                match self.hint_for(path) {
                    Some(hint) => self.merge_keyed_items(target_items, source_items, hint, path),
                    None => self.merge_items(target_items, source_items, path),
                }
            }
            (target_value, source_value) => {
                *target_value = source_value;
            }
        }
    }

    fn hint_for(&self, path: &[String]) -> Option<&EntityKeyHint> {
        self.hints.iter().find(|hint| hint.path == path)
    }

    fn merge_items(&self, target_items: &mut Vec<Value>, source_items: Vec<Value>, path: &mut Vec<String>) {
        for (index, source_item) in source_items.into_iter().enumerate() {
            match target_items.get_mut(index) {
                Some(target_item) => self.merge(target_item, source_item, path),
                None => target_items.push(source_item),
            }
        }
    }

    fn merge_keyed_items(
        &self,
        target_items: &mut Vec<Value>,
        source_items: Vec<Value>,
        hint: &EntityKeyHint,
        path: &mut Vec<String>,
    ) {
        for (index, source_item) in source_items.into_iter().enumerate() {
            // Only items without a key fall back to their position; a keyed item that matches
            // nothing is a different entity.
            let position = match entity_key(&source_item, &hint.key_fields) {
                Some(key) => target_items
                    .iter()
                    .position(|target_item| entity_key(target_item, &hint.key_fields).as_ref() == Some(&key)),
                None => (index < target_items.len()).then_some(index),
            };
            match position {
                Some(position) => self.merge(&mut target_items[position], source_item, path),
                None => target_items.push(source_item),
            }
        }
    }
}

/// Values of the key fields of an entity, or `None` when one of them is missing.
fn entity_key(item: &Value, key_fields: &[String]) -> Option<Vec<Value>> {
    if key_fields.is_empty() {
        return None;
    }
    key_fields
        .iter()
        .map(|field| item.get(field).filter(|value| !value.is_null()).cloned())
        .collect()
}
