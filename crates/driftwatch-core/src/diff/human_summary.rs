//! Human-readable renderings of a [`Diff`].

use crate::diff::model::{Diff, OpKind};
use serde_json::Value;

/// One line per top-level operation: `"<Operation> resource: <key>"`.
///
/// Lines are grouped Update, Delete, Insert with keys sorted inside each
/// group. Nested changes are summarized by their top-level key only; the
/// structured diff in the finding carries the detail.
pub fn summary_lines(diff: &Diff) -> Vec<String> {
    let groups: [(OpKind, Vec<&String>); 3] = [
        (OpKind::Update, diff.updates.keys().collect()),
        (OpKind::Delete, diff.deletes.keys().collect()),
        (OpKind::Insert, diff.inserts.keys().collect()),
    ];

    groups
        .iter()
        .flat_map(|(kind, keys)| {
            keys.iter()
                .map(move |key| format!("{} resource: {}", kind.label(), key))
        })
        .collect()
}

/// Render a path-qualified, multi-line summary for terminal review.
///
/// ```text
/// ~ raw_data.id: "1" -> "2"
/// - raw_data.description
/// + labels: {"env":"prod"}
/// ```
pub fn render_human_summary(diff: &Diff) -> String {
    if diff.is_empty() {
        return "No differences.\n".to_string();
    }

    let mut out = String::new();
    for op in diff.operations() {
        let path = op.path.join(".");
        let line = match op.kind {
            OpKind::Update => format!(
                "~ {}: {} -> {}\n",
                path,
                compact(op.old),
                compact(op.new)
            ),
            OpKind::Delete => format!("- {}\n", path),
            OpKind::Insert => format!("+ {}: {}\n", path, compact(op.new)),
        };
        out.push_str(&line);
    }
    out.push_str(&format!("{} change(s)\n", diff.change_count()));
    out
}

fn compact(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::engine::diff_reports;
    use serde_json::json;

    #[test]
    fn test_summary_lines_order_and_format() {
        let current = json!({"b": 2, "new": 1, "a": {"x": 1}});
        let previous = json!({"b": 1, "old": 1, "a": {"x": 0}});

        let lines = summary_lines(&diff_reports(&current, &previous));
        assert_eq!(
            lines,
            vec![
                "Update resource: a",
                "Update resource: b",
                "Delete resource: old",
                "Insert resource: new",
            ]
        );
    }

    #[test]
    fn test_summary_lines_empty_for_identical() {
        let tree = json!({"a": 1});
        assert!(summary_lines(&diff_reports(&tree, &tree)).is_empty());
    }

    #[test]
    fn test_render_human_summary_paths() {
        let current = json!({"raw_data": {"id": "2"}, "labels": {"env": "prod"}});
        let previous = json!({"raw_data": {"id": "1", "description": "d"}});

        let rendered = render_human_summary(&diff_reports(&current, &previous));
        assert!(rendered.contains("~ raw_data.id: \"1\" -> \"2\""));
        assert!(rendered.contains("- raw_data.description"));
        assert!(rendered.contains("+ labels: {\"env\":\"prod\"}"));
        assert!(rendered.ends_with("3 change(s)\n"));
    }

    #[test]
    fn test_render_human_summary_identical() {
        let tree = json!({"a": 1});
        assert_eq!(
            render_human_summary(&diff_reports(&tree, &tree)),
            "No differences.\n"
        );
    }
}
