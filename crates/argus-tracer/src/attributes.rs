use argus_parser::Instance;
use std::collections::BTreeMap;

/// Tag to value, keyed by the upper-cased tag
pub type AttributeMap = BTreeMap<String, String>;

/// Collect the attribute entries of one instance.
///
/// Tags are case-insensitive; a repeated tag keeps the last value.
pub fn collect_attributes(instance: &Instance) -> AttributeMap {
    let mut map = AttributeMap::new();
    for entry in &instance.attributes {
        let tag = entry.tag.trim();
        if tag.is_empty() {
            continue;
        }
        map.insert(tag.to_uppercase(), entry.value.clone());
    }
    map
}
