use crate::RowSnapshot;

/// Header placed between the rule template and the row data.
pub const ROW_DATA_HEADER: &str = "当前数据：";
/// Closing instruction appended after the row data.
pub const OUTPUT_INSTRUCTION: &str = "请严格按照要求输出结果：";

/// Render a row as `column: value` lines in original-column order.
pub fn render_row(row: &RowSnapshot) -> String {
    row.cells()
        .iter()
        .map(|(column, value)| format!("{column}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full prompt for one row: rule template, row data, fixed instruction.
pub fn build_prompt(template: &str, row: &RowSnapshot) -> String {
    format!(
        "{}\n{ROW_DATA_HEADER}\n{}\n{OUTPUT_INSTRUCTION}",
        template.trim_end(),
        render_row(row)
    )
}
