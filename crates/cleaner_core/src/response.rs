use crate::{normalize_label, FieldMap, FieldSchema};

/// Parse a model reply into a field map.
///
/// Each non-empty line is split on its first colon, ASCII or full-width,
/// whichever comes first. Labels are normalized and kept only when they belong
/// to `schema`; lines without a colon are skipped. A later line for the same
/// field replaces an earlier one.
pub fn parse_response(text: &str, schema: &FieldSchema) -> FieldMap {
    let mut fields = FieldMap::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((label, value)) = split_label_value(line) else {
            continue;
        };
        let label = normalize_label(label);
        if schema.contains(&label) {
            fields.insert(label, value.trim());
        }
    }
    fields
}

/// Split on the first `:` or `：`.
pub fn split_label_value(line: &str) -> Option<(&str, &str)> {
    let pos = line.find([':', '：'])?;
    let separator_len = line[pos..].chars().next().map_or(1, char::len_utf8);
    Some((&line[..pos], &line[pos + separator_len..]))
}
