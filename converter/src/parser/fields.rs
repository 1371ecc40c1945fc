//! Field splitting for one logical record.
//!
//! Commas separate fields only at bracket depth zero, so array literals such
//! as `['a', 'b']` stay in one field. Bracket counting ignores double quotes:
//! a stray `[` or `]` inside quoted free text shifts the depth for the rest
//! of the record.

/// Split a logical record into trimmed, unquoted fields.
///
/// Always returns at least one field.
pub fn split_fields(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut depth: isize = 0;

    for c in record.chars() {
        match c {
            '[' => {
                depth += 1;
                field.push(c);
            }
            ']' => {
                depth -= 1;
                field.push(c);
            }
            ',' if depth == 0 => {
                fields.push(unquote_field(field.trim()));
                field.clear();
            }
            _ => field.push(c),
        }
    }
    fields.push(unquote_field(field.trim()));

    fields
}

/// Strip one enclosing pair of double quotes and collapse `""` to `"`.
///
/// Text that is not fully enclosed is returned unchanged.
pub fn unquote_field(field: &str) -> String {
    match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}
