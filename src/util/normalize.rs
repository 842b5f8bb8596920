const STRIPPED_CHARS: &[char] = &[
    '-', '_', '.', '/', '(', ')', '[', ']', '·', '【', '】', '（', '）', '［', '］', '－',
    '＿', '．', '／', '・',
];

// longer terms first so that "经典款" is not reduced to "款"
const FILLER_TERMS: &[&str] = &[
    "升级版", "经典款", "限量版", "特惠装", "家庭装", "便携装", "迷你装", "大包装", "小包装",
    "新装", "原味", "经典", "新品", "热卖", "推荐", "精选", "优质", "健康", "天然", "有机",
    "绿色", "营养", "美味", "香浓",
];

const UNIT_REWRITES: &[(&str, &str)] = &[
    ("毫升", "ml"),
    ("千克", "kg"),
    ("升", "l"),
    ("克", "g"),
    ("斤", "kg"),
    ("两", "g"),
];

/// Canonicalize free text for comparison. Total and idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace() && !STRIPPED_CHARS.contains(ch))
        .collect();

    rewrite_units(remove_filler(stripped))
}

// Removing one term can splice together another, so repeat until stable.
fn remove_filler(mut text: String) -> String {
    loop {
        let before = text.len();
        for term in FILLER_TERMS {
            if text.contains(term) {
                text = text.replace(term, "");
            }
        }
        if text.len() == before {
            return text;
        }
    }
}

fn rewrite_units(mut text: String) -> String {
    for (unit, short) in UNIT_REWRITES {
        if text.contains(unit) {
            text = text.replace(unit, short);
        }
    }
    text
}
