use std::sync::LazyLock;

use regex::Regex;

// A numbered level-3 heading line followed by a bullet with only
// whitespace in between. `.` stops at the newline, so the heading capture
// never swallows the following line.
static HEADING_THEN_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(### \d+\..+?)(\s+\*)").unwrap());

/// Inserts a blank line between a numbered `###` heading and the bullet
/// that immediately follows it, so markdown renderers treat them as
/// separate blocks. Idempotent: an already-separated pair matches again
/// and is rewritten to itself.
pub fn normalize(raw: &str) -> String {
    HEADING_THEN_BULLET
        .replace_all(raw, "${1}\n\n*")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_blank_line_before_bullet() {
        assert_eq!(
            normalize("### 1. 기업 개요\n* 내용"),
            "### 1. 기업 개요\n\n* 내용"
        );
    }

    #[test]
    fn test_bullet_on_same_line_moves_to_own_block() {
        assert_eq!(normalize("### 2. CEO * 이름"), "### 2. CEO\n\n* 이름");
    }

    #[test]
    fn test_already_separated_is_unchanged() {
        let text = "### 1. 기업 개요\n\n* 내용";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "### 1. 기업 개요\n* 내용",
            "### 10. 밸류에이션\n* 항목 1\n* 항목 2",
            "no headings at all\njust text",
            "### 3. 주주 구성 * 국민연금",
            "### 1. A\n* x\n### 2. B\n* y",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_never_reduces_heading_markers() {
        let inputs = [
            "### 1. 기업 개요\n* 내용",
            "## not level three\n* bullet",
            "#### 1. deeper\n* bullet",
            "### 없는 번호\n* bullet",
        ];
        for input in inputs {
            let before = input.matches('#').count();
            let after = normalize(input).matches('#').count();
            assert!(after >= before, "lost heading markers for {input:?}");
        }
    }

    #[test]
    fn test_only_numbered_level_three_headings_match() {
        // No digits after "### " means no rewrite.
        let text = "### 기업 개요\n* 내용";
        assert_eq!(normalize(text), text);

        // Level-2 headings are left alone.
        let text = "## 1. 기업 개요\n* 내용";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_multiple_sections_all_normalized() {
        let raw = "### 1. 기업 개요\n* 하나\n\n### 2. CEO\n* 둘";
        let expected = "### 1. 기업 개요\n\n* 하나\n\n### 2. CEO\n\n* 둘";
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn test_body_between_heading_and_later_bullet_untouched() {
        let text = "### 1. 기업 개요\n설명 문단\n* 내용";
        assert_eq!(normalize(text), text);
    }
}
