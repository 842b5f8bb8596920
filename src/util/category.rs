//! Category simplification: maps the technical category text produced by label
//! extraction onto a small set of everyday canonical categories.
//!
//! Lookup is table driven. Adding a category means adding rows to
//! [`CATEGORY_TABLE`] or [`FALLBACK_RULES`], never touching the scoring code.

use std::collections::BTreeSet;

pub const CATEGORY_OTHER: &str = "其他";

// order matters for the substring pass
const CATEGORY_TABLE: &[(&str, &str)] = &[
    ("烘烤类糕点", "饼干"),
    ("糕点/饼干", "饼干"),
    ("烘焙食品", "饼干"),
    ("糕点", "饼干"),
    ("饼干", "饼干"),
    ("热风干燥方便食品", "方便面"),
    ("方便面", "方便面"),
    ("油炸型方便面", "方便面"),
    ("非油炸方便面", "方便面"),
    ("冷面", "方便面"),
    ("速冻水饺", "速冻饺子"),
    ("速冻包子", "速冻饺子"),
    ("速冻馄饨", "速冻饺子"),
    ("速冻食品", "速冻饺子"),
    ("冷冻食品", "速冻饺子"),
    ("高盐稀态发酵酱油", "酱油"),
    ("生抽", "酱油"),
    ("老抽", "酱油"),
    ("酱油", "酱油"),
    ("食醋", "醋"),
    ("陈醋", "醋"),
    ("白醋", "醋"),
    ("米醋", "醋"),
    ("醋", "醋"),
    ("调味品", "调味品"),
    ("调料", "调味品"),
    ("膨化食品", "膨化食品"),
    ("薯片", "膨化食品"),
    ("爆米花", "膨化食品"),
    ("虾条", "膨化食品"),
    ("饮料", "饮料"),
    ("碳酸饮料", "饮料"),
    ("果汁饮料", "饮料"),
    ("茶饮料", "饮料"),
    ("咖啡饮料", "饮料"),
    ("功能饮料", "饮料"),
    ("运动饮料", "饮料"),
    ("(Ⅱ类·其他型)速溶豆粉", "豆制品"),
    ("豆浆粉", "豆制品"),
    ("豆腐", "豆制品"),
    ("豆干", "豆制品"),
    ("豆制品", "豆制品"),
    ("牛奶", "奶制品"),
    ("酸奶", "奶制品"),
    ("奶粉", "奶制品"),
    ("乳制品", "奶制品"),
    ("奶制品", "奶制品"),
    ("火腿肠", "肉制品"),
    ("香肠", "肉制品"),
    ("培根", "肉制品"),
    ("肉类制品", "肉制品"),
    ("肉制品", "肉制品"),
    ("坚果", "坚果"),
    ("花生", "坚果"),
    ("瓜子", "坚果"),
    ("核桃", "坚果"),
    ("杏仁", "坚果"),
    ("糖果", "糖果"),
    ("巧克力", "糖果"),
    ("口香糖", "糖果"),
    ("软糖", "糖果"),
    ("硬糖", "糖果"),
    ("罐头", "罐头"),
    ("水果罐头", "罐头"),
    ("肉类罐头", "罐头"),
    ("蔬菜罐头", "罐头"),
    ("未知类型", CATEGORY_OTHER),
    (CATEGORY_OTHER, CATEGORY_OTHER),
];

const FALLBACK_RULES: &[(&[&str], &str)] = &[
    (&["饼干", "糕点", "烘焙"], "饼干"),
    (&["方便面", "面条", "拉面"], "方便面"),
    (&["饮料", "汽水", "果汁"], "饮料"),
    (&["酱油"], "酱油"),
    (&["醋"], "醋"),
    (&["调料"], "调味品"),
];

pub fn normalize_category(raw: &str) -> &'static str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CATEGORY_OTHER;
    }

    if let Some((_, canonical)) = CATEGORY_TABLE.iter().find(|(key, _)| *key == trimmed) {
        return *canonical;
    }

    if let Some((key, canonical)) = CATEGORY_TABLE
        .iter()
        .find(|(key, _)| trimmed.contains(key) || key.contains(trimmed))
    {
        tracing::debug!(raw = trimmed, key, canonical, "category matched by substring");
        return *canonical;
    }

    let lower = trimmed.to_lowercase();
    if let Some((_, canonical)) = FALLBACK_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lower.contains(kw)))
    {
        return *canonical;
    }

    tracing::warn!(raw = trimmed, "unmatched category, using catch-all");
    CATEGORY_OTHER
}

pub fn canonical_categories() -> Vec<&'static str> {
    CATEGORY_TABLE
        .iter()
        .map(|(_, canonical)| *canonical)
        .chain(FALLBACK_RULES.iter().map(|(_, canonical)| *canonical))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_lookup() {
        assert_eq!(normalize_category("薯片"), "膨化食品");
        assert_eq!(normalize_category(" 热风干燥方便食品 "), "方便面");
        assert_eq!(normalize_category("(Ⅱ类·其他型)速溶豆粉"), "豆制品");
        assert_eq!(normalize_category("未知类型"), CATEGORY_OTHER);
    }

    #[test]
    fn substring_lookup() {
        assert_eq!(normalize_category("原味薯片零食"), "膨化食品");
        assert_eq!(normalize_category("进口巧克力制品"), "糖果");
    }

    #[test]
    fn unknown_and_blank_fall_back_to_other() {
        assert_eq!(normalize_category(""), CATEGORY_OTHER);
        assert_eq!(normalize_category("   "), CATEGORY_OTHER);
        assert_eq!(normalize_category("洗发水"), CATEGORY_OTHER);
    }

    #[test]
    fn canonical_list_is_unique() {
        let categories = canonical_categories();
        assert!(categories.contains(&"饼干"));
        assert!(categories.contains(&CATEGORY_OTHER));
        let unique: BTreeSet<_> = categories.iter().collect();
        assert_eq!(unique.len(), categories.len());
    }
}
