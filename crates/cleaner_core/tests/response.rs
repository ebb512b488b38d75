use cleaner_core::{build_prompt, parse_response, FieldSchema, RowSnapshot, OUTPUT_INSTRUCTION};
use pretty_assertions::assert_eq;

fn schema() -> FieldSchema {
    FieldSchema::from_names(["规格", "功效"])
}

#[test]
fn reply_lines_fill_schema_fields() {
    let fields = parse_response("规格:30ml\n功效:保湿抗皱", &schema());
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get("规格"), Some("30ml"));
    assert_eq!(fields.get("功效"), Some("保湿抗皱"));
}

#[test]
fn full_width_colons_labels_with_decoration_and_padding_are_accepted() {
    let fields = parse_response("  - 【规格】： 30ml  \n\n功效 :保湿\n", &schema());
    assert_eq!(fields.get("规格"), Some("30ml"));
    assert_eq!(fields.get("功效"), Some("保湿"));
}

#[test]
fn unknown_labels_and_colonless_lines_are_skipped() {
    let fields = parse_response("品牌:兰蔻\n这是一段说明\n规格:50ml", &schema());
    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("规格"), Some("50ml"));
    assert_eq!(fields.get("品牌"), None);
}

#[test]
fn reply_without_colons_yields_empty_map() {
    let fields = parse_response("抱歉，我无法提取信息\n请提供更多数据", &schema());
    assert!(fields.is_empty());
}

#[test]
fn value_keeps_later_colons() {
    let fields = parse_response("规格: 30ml：小瓶: 试用", &schema());
    assert_eq!(fields.get("规格"), Some("30ml：小瓶: 试用"));
}

#[test]
fn prompt_lists_row_columns_in_order_after_template() {
    let row = RowSnapshot::new(
        0,
        vec![
            ("宝贝名".to_string(), "兰蔻小黑瓶精华液 30ml 保湿抗皱".to_string()),
            ("价格".to_string(), "760".to_string()),
        ],
    );
    let prompt = build_prompt("- 规格: 容量\n\n", &row);
    assert_eq!(
        prompt,
        format!(
            "- 规格: 容量\n当前数据：\n宝贝名: 兰蔻小黑瓶精华液 30ml 保湿抗皱\n价格: 760\n{OUTPUT_INSTRUCTION}"
        )
    );
}
