//! XPath expression builders
//!
//! Small pure helpers shared by the strategies. All literal values go
//! through `literal()`, which picks a quote style the value does not use,
//! or falls back to `concat()` when it uses both.

/// Quote a string as an XPath literal
pub fn literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    // Both quote kinds present: stitch with concat()
    let mut parts = Vec::new();
    for (i, piece) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !piece.is_empty() {
            parts.push(format!("'{piece}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

/// `//tag[normalize-space(text())='T']`
pub fn text_eq(tag: &str, text: &str) -> String {
    format!("//{tag}[normalize-space(text())={}]", literal(text))
}

/// `//tag[@name='value']`
pub fn attr_eq(tag: &str, name: &str, value: &str) -> String {
    format!("//{tag}[@{name}={}]", literal(value))
}

/// `//tag[contains(@class,'token')]`
pub fn class_contains(tag: &str, token: &str) -> String {
    format!("//{tag}[contains(@class,{})]", literal(token))
}

/// `//tag[contains(@class,'a') and contains(@class,'b')]`
pub fn class_pair(tag: &str, first: &str, second: &str) -> String {
    format!(
        "//{tag}[contains(@class,{}) and contains(@class,{})]",
        literal(first),
        literal(second)
    )
}

/// `(expr)[k]`, 1-based
pub fn indexed(expr: &str, k: usize) -> String {
    format!("({expr})[{k}]")
}

/// `tag[i]` positional path segment
pub fn positional_segment(tag: &str, index: usize) -> String {
    format!("{tag}[{index}]")
}

/// `//*[local-name()='name']` with optional extra predicate
pub fn local_name(name: &str, extra_pred: Option<&str>) -> String {
    match extra_pred {
        Some(pred) => format!("//*[local-name()={} and {pred}]", literal(name)),
        None => format!("//*[local-name()={}]", literal(name)),
    }
}
