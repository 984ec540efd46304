//! 位号过滤表达式。
//!
//! 表达式由若干 `(+|-)token` 组成，例如 `+J+MH-M1`：token 可以是类型码（`J`、`MH`）
//! 也可以是完整位号（`D1`）。同一 token 后出现的符号覆盖先出现的符号，
//! 因此 `+M-M` 等价于 `-M`。首字符为 `+` 时为追加模式，否则为排除模式。

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::EngineError;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-])([A-Za-z0-9]+)").expect("reference token pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceFilter {
    additive: bool,
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl ReferenceFilter {
    /// 编译过滤表达式。token 之间允许空白；任何其它无法识别的字符都会报 `InvalidPattern`。
    pub fn compile(pattern: &str) -> Result<Self, EngineError> {
        let mut signs: BTreeMap<&str, bool> = BTreeMap::new();
        let mut position = 0;

        while position < pattern.len() {
            let rest = &pattern[position..];
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                break;
            }
            position += rest.len() - trimmed.len();

            let Some(captures) = TOKEN.captures(trimmed) else {
                return Err(EngineError::InvalidPattern {
                    pattern: pattern.to_string(),
                    position,
                    reason: describe_failure(trimmed),
                });
            };
            let whole = captures.get(0).map_or(0, |m| m.len());
            let additive = &captures[1] == "+";
            let token = captures.get(2).map_or("", |m| m.as_str());
            signs.insert(token, additive);
            position += whole;
        }

        let mut filter = ReferenceFilter {
            additive: pattern.trim_start().starts_with('+'),
            ..Self::default()
        };
        for (token, additive) in signs {
            if additive {
                filter.include.insert(token.to_string());
            } else {
                filter.exclude.insert(token.to_string());
            }
        }
        Ok(filter)
    }

    #[inline]
    pub fn is_additive(&self) -> bool {
        self.additive
    }

    pub fn include(&self) -> impl Iterator<Item = &str> {
        self.include.iter().map(String::as_str)
    }

    pub fn exclude(&self) -> impl Iterator<Item = &str> {
        self.exclude.iter().map(String::as_str)
    }

    /// 精确位号的包含项总是优先，即使其类型码被排除。
    pub fn matches(&self, reference: &str) -> bool {
        if self.include.contains(reference) {
            return true;
        }
        let code = type_code(reference);
        if self.additive {
            self.include.contains(code) && !self.exclude.contains(reference)
        } else {
            !self.exclude.contains(code) && !self.exclude.contains(reference)
        }
    }
}

/// 未配置过滤器时视为通配。
pub fn matches_optional(filter: Option<&ReferenceFilter>, reference: &str) -> bool {
    filter.is_none_or(|filter| filter.matches(reference))
}

/// 去掉位号末尾的数字、`?` 与 `*`，得到类型码：`D1` → `D`，`JP12` → `JP`，`U?` → `U`。
pub fn type_code(reference: &str) -> &str {
    reference.trim_end_matches(|c: char| c.is_ascii_digit() || c == '?' || c == '*')
}

fn describe_failure(rest: &str) -> String {
    match rest.chars().next() {
        Some(sign @ ('+' | '-')) => format!("`{sign}` must be followed by a letter or digit"),
        Some(other) => format!("expected `+` or `-`, found `{other}`"),
        None => "unexpected end of pattern".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(pattern: &str) -> ReferenceFilter {
        ReferenceFilter::compile(pattern).expect("合法表达式")
    }

    #[test]
    fn additive_type_code_matches_whole_code_only() {
        let f = filter("+J");
        assert!(f.is_additive());
        assert!(f.matches("J1"));
        assert!(f.matches("J12"));
        assert!(!f.matches("JP1"));
        assert!(!f.matches("R1"));
    }

    #[test]
    fn subtractive_type_code_excludes_only_that_code() {
        let f = filter("-J");
        assert!(!f.is_additive());
        assert!(!f.matches("J1"));
        assert!(f.matches("JP1"));
        assert!(f.matches("R7"));
    }

    #[test]
    fn exact_designator_exceptions() {
        let f = filter("+J-J1");
        assert!(f.matches("J2"));
        assert!(!f.matches("J1"));

        let f = filter("-J+J1");
        assert!(f.matches("J1"));
        assert!(!f.matches("J2"));
        assert!(f.matches("R1"));
    }

    #[test]
    fn later_sign_overrides_earlier_one() {
        let f = filter("+M-M");
        assert_eq!(f.include().count(), 0);
        assert_eq!(f.exclude().collect::<Vec<_>>(), vec!["M"]);
        // 首字符仍为 `+`，保持追加模式
        assert!(f.is_additive());
        assert!(!f.matches("M1"));
    }

    #[test]
    fn multiple_type_codes_and_whitespace() {
        let f = filter("+J +MH\t+SW");
        assert!(f.matches("MH3"));
        assert!(f.matches("SW1"));
        assert!(!f.matches("M3"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let f = filter("");
        assert!(f.matches("R1"));
        assert!(f.matches("J1"));
        assert!(matches_optional(None, "anything"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        for pattern in ["J", "+", "+J-", "+J?", "+J,-R"] {
            let err = ReferenceFilter::compile(pattern).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidPattern { .. }),
                "{pattern} 应当被拒绝"
            );
        }
        let err = ReferenceFilter::compile("+J,-R").unwrap_err();
        match err {
            EngineError::InvalidPattern { position, .. } => assert_eq!(position, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn type_code_strips_trailing_index_and_wildcards() {
        assert_eq!(type_code("D1"), "D");
        assert_eq!(type_code("JP12"), "JP");
        assert_eq!(type_code("U?"), "U");
        assert_eq!(type_code("R*"), "R");
        assert_eq!(type_code("MH"), "MH");
    }
}
