use crate::models::TypeCategory;

/// Map a lake type tag to a display category.
///
/// Tags may arrive bare (`int64`) or in type-value form (`<int64>`). Complex and
/// unknown types (records, arrays, maps, unions, errors, null) have no category
/// and yield `None`; callers drop such columns instead of failing the series.
pub fn classify(tag: &str) -> Option<TypeCategory> {
    let tag = tag.trim();
    let tag = tag
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(tag);

    match tag {
        "uint8" | "uint16" | "uint32" | "uint64" | "uint128" | "uint256" | "int8" | "int16"
        | "int32" | "int64" | "int128" | "int256" | "float16" | "float32" | "float64"
        | "float128" | "float256" | "decimal32" | "decimal64" | "decimal128" | "decimal256" => {
            Some(TypeCategory::Number)
        }
        "string" | "ip" | "net" | "type" | "bytes" | "duration" => Some(TypeCategory::String),
        "time" => Some(TypeCategory::Time),
        "bool" => Some(TypeCategory::Boolean),
        _ => None,
    }
}
