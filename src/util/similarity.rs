use serde::Serialize;

use super::normalize::normalize;

/// Edit distance counted over chars rather than bytes.
pub fn distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

pub fn similarity(a: &str, b: &str) -> f64 {
    // emptiness is judged on the raw inputs
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let left = normalize(a);
    let right = normalize(b);
    if left == right {
        return 1.0;
    }

    let max_len = left.chars().count().max(right.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let dist = distance(&left, &right) as f64;
    (1.0 - dist / max_len as f64).max(0.0)
}

pub fn containment(a: &str, b: &str) -> bool {
    let left: Vec<char> = normalize(a).chars().collect();
    let right: Vec<char> = normalize(b).chars().collect();
    if left.len() < 2 || right.len() < 2 {
        return false;
    }

    let left_str: String = left.iter().collect();
    let right_str: String = right.iter().collect();
    if left_str.contains(&right_str) || right_str.contains(&left_str) {
        return true;
    }

    let shorter = left.len().min(right.len());
    let window = std::cmp::max(2, shorter * 6 / 10);
    if window > left.len() {
        return false;
    }

    left.windows(window).any(|run| {
        let needle: String = run.iter().collect();
        right_str.contains(&needle)
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarityDetails {
    pub left: String,
    pub right: String,
    pub normalized_left: String,
    pub normalized_right: String,
    pub similarity: f64,
    pub containment: bool,
    pub edit_distance: usize,
}

pub fn similarity_details(a: &str, b: &str) -> SimilarityDetails {
    let normalized_left = normalize(a);
    let normalized_right = normalize(b);
    let details = SimilarityDetails {
        left: a.to_string(),
        right: b.to_string(),
        similarity: similarity(a, b),
        containment: containment(a, b),
        edit_distance: distance(&normalized_left, &normalized_right),
        normalized_left,
        normalized_right,
    };

    tracing::debug!(
        left = a,
        right = b,
        similarity = details.similarity,
        "similarity details computed"
    );

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_counts_chars() {
        assert_eq!(distance("hello", "hello"), 0);
        assert_eq!(distance("乐事薯片", "乐事薯片"), 0);
        assert_eq!(distance("abc", "def"), 3);
        assert_eq!(distance("乐事", "百事"), 1);
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("", ""), 0);
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("乐事原味薯片", "乐事烧烤薯片"), 2);
    }

    #[test]
    fn distance_triangle_inequality() {
        let words = ["乐事薯片", "乐事烧烤薯片", "品客薯片", "康师傅", "", "abc"];
        for a in words {
            for b in words {
                for c in words {
                    assert!(distance(a, c) <= distance(a, b) + distance(b, c));
                }
            }
        }
    }

    #[test]
    fn distance_zero_iff_normalized_equal() {
        let pairs = [("乐事 原味 薯片", "乐事薯片"), ("百事可乐", "可口可乐")];
        for (a, b) in pairs {
            let (na, nb) = (normalize(a), normalize(b));
            assert_eq!(distance(&na, &nb) == 0, na == nb);
        }
    }

    #[test]
    fn identical_and_empty_inputs() {
        for s in ["乐事薯片", "康师傅红烧牛肉面", "原味", "x"] {
            assert_eq!(similarity(s, s), 1.0);
            assert_eq!(similarity(s, ""), 0.0);
            assert_eq!(similarity("", s), 0.0);
        }
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn graded_similarity() {
        assert!(similarity("乐事原味薯片", "乐事薯片") > 0.8);
        assert!(similarity("康师傅红烧牛肉面", "康师傅红烧牛肉方便面") > 0.7);
        assert!(similarity("乐事薯片", "百事可乐") < 0.5);
        assert!(similarity("康师傅方便面", "统一冰红茶") < 0.3);
    }

    #[test]
    fn similarity_is_symmetric() {
        let words = ["乐事", "品客", "原味薯片", "经典原味薯片", "Lay's", ""];
        for a in words {
            for b in words {
                assert_eq!(similarity(a, b), similarity(b, a));
            }
        }
    }

    #[test]
    fn containment_checks() {
        assert!(containment("乐事原味薯片", "乐事薯片"));
        assert!(containment("康师傅红烧牛肉面", "康师傅方便面"));
        assert!(!containment("百事可乐", "雪碧"));
        assert!(containment("薯片", "乐事薯片"));
        assert!(containment("方便面", "康师傅方便面"));
        assert!(!containment("a", "a"));
    }

    #[test]
    fn details_report_normalized_forms() {
        let details = similarity_details("乐事 原味 薯片", "乐事薯片");
        assert_eq!(details.normalized_left, "乐事薯片");
        assert_eq!(details.edit_distance, 0);
        assert_eq!(details.similarity, 1.0);
        assert!(details.containment);
    }
}
