use std::sync::LazyLock;

use regex::Regex;

use super::similarity::similarity;

pub const DEFAULT_TOP_INGREDIENTS: usize = 3;

const INGREDIENT_MATCH_THRESHOLD: f64 = 0.8;

const DELIMITERS: &[char] = &[',', '，', ';', '；', '、', '·', '|'];

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[%％]?$").expect("valid numeric pattern"));
static COMPARISON_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[<>≤≥]+").expect("valid comparison pattern"));
static PRODUCTION_METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"生产日期|保质期|净含量|规格|生产许可证|许可证编号").expect("valid metadata pattern")
});
static BRACKETS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[()（）\[\]【】]+$").expect("valid bracket pattern"));
static BRACKETED_QUALIFIERS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"\([^)]*\)").expect("valid paren pattern"),
        Regex::new(r"（[^）]*）").expect("valid full-width paren pattern"),
        Regex::new(r"\[[^\]]*\]").expect("valid bracket pattern"),
        Regex::new(r"【[^】]*】").expect("valid lenticular pattern"),
    ]
});
static TRAILING_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<>≤≥]+\d+.*$").expect("valid limit pattern"));

/// First `top_n` ingredient names of a raw ingredient list, in label order.
pub fn extract_main_ingredients(raw: Option<&str>, top_n: usize) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(|ch: char| DELIMITERS.contains(&ch) || ch.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty() && !is_non_ingredient(token))
        .map(strip_qualifiers)
        .filter(|token| !token.is_empty())
        .take(top_n)
        .collect()
}

fn is_non_ingredient(token: &str) -> bool {
    NUMERIC_TOKEN.is_match(token)
        || COMPARISON_PREFIX.is_match(token)
        || PRODUCTION_METADATA.is_match(token)
        || BRACKETS_ONLY.is_match(token)
}

fn strip_qualifiers(token: &str) -> String {
    let mut cleaned = token.to_string();
    for pattern in BRACKETED_QUALIFIERS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    TRAILING_LIMIT.replace(&cleaned, "").trim().to_string()
}

/// Share of dominant ingredients the two lists have in common, in `[0, 1]`.
pub fn ingredients_similarity(left: Option<&str>, right: Option<&str>, top_n: usize) -> f64 {
    let left = left.filter(|s| !s.is_empty());
    let right = right.filter(|s| !s.is_empty());
    match (left, right) {
        (None, None) => return 1.0,
        (None, _) | (_, None) => return 0.0,
        _ => {}
    }

    let main_left = extract_main_ingredients(left, top_n);
    let main_right = extract_main_ingredients(right, top_n);
    if main_left.is_empty() && main_right.is_empty() {
        return 1.0;
    }
    if main_left.is_empty() || main_right.is_empty() {
        return 0.0;
    }

    // right-hand ingredients may back several left-hand ones
    let matched = main_left
        .iter()
        .filter(|ingredient| {
            main_right
                .iter()
                .any(|other| similarity(ingredient, other) > INGREDIENT_MATCH_THRESHOLD)
        })
        .count();

    matched as f64 / main_left.len().max(main_right.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str) -> Vec<String> {
        extract_main_ingredients(Some(raw), DEFAULT_TOP_INGREDIENTS)
    }

    #[test]
    fn takes_leading_ingredients() {
        assert_eq!(
            extract("马铃薯、植物油、食盐、味精、香辛料"),
            vec!["马铃薯", "植物油", "食盐"]
        );
        assert_eq!(
            extract("面粉(含谷蛋白),棕榈油,食盐,蛋白粉,酵母提取物"),
            vec!["面粉", "棕榈油", "食盐"]
        );
    }

    #[test]
    fn drops_quantities_and_metadata() {
        let main = extract("大豆(非转基因)≥36%,白砂糖,食盐");
        assert_eq!(main, vec!["大豆", "白砂糖", "食盐"]);

        let main = extract("净含量500g 45% 【】 ≥3 保质期12个月 小麦粉【国产】 水");
        assert_eq!(main, vec!["小麦粉", "水"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extract("").is_empty());
        assert!(extract_main_ingredients(None, 3).is_empty());
        assert!(extract(" ，、; ").is_empty());
    }

    #[test]
    fn respects_top_n() {
        let all = extract_main_ingredients(Some("a b c d e"), 10);
        assert_eq!(all.len(), 5);
        assert!(extract_main_ingredients(Some("a b c"), 0).is_empty());
    }

    #[test]
    fn same_list_different_delimiters() {
        let sim = ingredients_similarity(Some("马铃薯、植物油、食盐"), Some("马铃薯,植物油,食盐"), 3);
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn partial_overlap() {
        let sim = ingredients_similarity(
            Some("马铃薯、植物油、食盐、味精"),
            Some("马铃薯、椰子油、食盐、香辛料"),
            3,
        );
        assert!(sim > 0.5 && sim < 0.9, "got {sim}");
    }

    #[test]
    fn disjoint_lists() {
        let sim = ingredients_similarity(Some("面粉、酵母、糖"), Some("牛奶、巧克力、坚果"), 3);
        assert!(sim < 0.3);
    }

    #[test]
    fn empty_sides() {
        assert_eq!(ingredients_similarity(None, None, 3), 1.0);
        assert_eq!(ingredients_similarity(Some(""), None, 3), 1.0);
        assert_eq!(ingredients_similarity(Some("面粉"), None, 3), 0.0);
        assert_eq!(ingredients_similarity(None, Some("面粉"), 3), 0.0);
    }

    #[test]
    fn repeated_ingredient_matches_each_time() {
        let sim = ingredients_similarity(Some("食盐、食盐、食盐"), Some("食盐、白砂糖、面粉"), 3);
        assert_eq!(sim, 1.0);

        let sim = ingredients_similarity(Some("食盐、白砂糖、面粉"), Some("食盐、食盐、食盐"), 3);
        assert!((sim - 1.0 / 3.0).abs() < 1e-9);
    }
}
