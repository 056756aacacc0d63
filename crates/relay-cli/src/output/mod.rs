use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(&serde_json::to_value(value)?)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    let terminal = ui::terminal();
    table::TableOptions {
        max_width: terminal.width,
        color: terminal.color,
    }
}

/// Arrays become row tables. An object's scalar fields become one key/value
/// table, and each array field gets its own titled section below it.
fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) => render_array(items),
        Value::Object(map) => render_object(map),
        scalar => cell(scalar),
    }
}

fn render_object(map: &Map<String, Value>) -> String {
    let (sections, scalars): (Vec<_>, Vec<_>) =
        map.iter().partition(|(_, value)| value.is_array());

    let mut blocks = Vec::new();
    if !scalars.is_empty() {
        let rows = scalars
            .iter()
            .flat_map(|(key, value)| flatten_pairs(key, value))
            .collect::<Vec<_>>();
        blocks.push(table::render_rows(&["key", "value"], &rows, options()));
    }
    for (key, value) in sections {
        let body = value.as_array().map_or_else(String::new, |items| render_array(items));
        blocks.push(format!("{key}:\n{body}"));
    }
    blocks.join("\n\n")
}

/// Nested objects (e.g. config sections) expand to dotted keys.
fn flatten_pairs(key: &str, value: &Value) -> Vec<Vec<String>> {
    match value {
        Value::Object(inner) => inner
            .iter()
            .flat_map(|(child, value)| flatten_pairs(&format!("{key}.{child}"), value))
            .collect(),
        other => vec![vec![key.to_string(), cell(other)]],
    }
}

fn render_array(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }
    if !items.iter().all(Value::is_object) {
        let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
        return table::render_rows(&["value"], &rows, options());
    }

    let mut headers = Vec::<&str>::new();
    for key in items.iter().filter_map(Value::as_object).flat_map(Map::keys) {
        if !headers.contains(&key.as_str()) {
            headers.push(key.as_str());
        }
    }
    // `id` leftmost, the rest in first-appearance order.
    headers.sort_by_key(|header| *header != "id");
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(*header).map_or_else(|| String::from("-"), cell))
                .collect::<Vec<String>>()
        })
        .collect::<Vec<_>>();
    table::render_rows(&headers, &rows, options())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::{render, render_table};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Example {
        id: &'static str,
        events: u32,
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&Example { id: "x", events: 7 }, OutputFormat::Json)
            .expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], "x");
        assert_eq!(parsed["events"], 7);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&Example { id: "x", events: 7 }, OutputFormat::Raw)
            .expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn object_with_arrays_renders_sections() {
        let out = render_table(&json!({
            "events": 3,
            "messages": [{"id": "m1", "agent": "planner"}],
            "links": []
        }));
        assert!(out.contains("events"));
        assert!(out.contains("messages:\nid"));
        assert!(out.contains("links:\n(no rows)"));
    }

    #[test]
    fn nested_objects_use_dotted_keys() {
        let out = render_table(&json!({"router": {"max_replans": 3}}));
        assert!(out.contains("router.max_replans"));
    }

    #[test]
    fn column_order_follows_first_appearance() {
        let out = render_table(&json!([{"id": "a", "role": "user"}, {"id": "b", "agent": "coder"}]));
        let header = out.lines().next().unwrap_or_default();
        assert_eq!(header.split_whitespace().collect::<Vec<_>>(), ["id", "role", "agent"]);
    }
}
