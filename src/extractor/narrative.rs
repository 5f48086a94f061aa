use std::sync::LazyLock;

use regex::Regex;

static ILI_SOUTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"南方省份哨点医院报告的ILI%为\s*(\d+\.\d+)%").unwrap());
static ILI_NORTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"北方省份哨点医院报告的ILI%为\s*(\d+\.\d+)%").unwrap());

/// Pull the south and north ILI percentages out of the weekly summary text.
///
/// Whitespace runs (including line breaks the PDF introduces mid-sentence)
/// are collapsed to single spaces before matching. Either value may be
/// absent; that never fails the file.
pub fn parse(page_text: &str) -> (Option<String>, Option<String>) {
    let text = page_text.split_whitespace().collect::<Vec<_>>().join(" ");
    let grab = |re: &Regex| re.captures(&text).map(|c| c[1].to_string());
    (grab(&ILI_SOUTH_RE), grab(&ILI_NORTH_RE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_rates_present() {
        let text = "本周，南方省份哨点医院报告的ILI%为 6.1%，高于前一周水平；\
                    北方省份哨点医院报告的ILI%为 5.0%。";
        let (south, north) = parse(text);
        assert_eq!(south.as_deref(), Some("6.1"));
        assert_eq!(north.as_deref(), Some("5.0"));
    }

    #[test]
    fn sentence_broken_across_lines() {
        let text = "南方省份哨点医院报告的ILI%为\n4.2%，北方省份哨点医院报告的ILI%为\n  3.9%。";
        let (south, north) = parse(text);
        assert_eq!(south.as_deref(), Some("4.2"));
        assert_eq!(north.as_deref(), Some("3.9"));
    }

    #[test]
    fn missing_sentence_degrades_to_none() {
        let (south, north) = parse("南方省份哨点医院报告的ILI%为 7.3%，本周无北方数据。");
        assert_eq!(south.as_deref(), Some("7.3"));
        assert!(north.is_none());

        let (south, north) = parse("本页无相关内容。");
        assert!(south.is_none());
        assert!(north.is_none());
    }

    #[test]
    fn integer_rate_without_decimal_is_not_matched() {
        let (south, _) = parse("南方省份哨点医院报告的ILI%为 6%。");
        assert!(south.is_none());
    }
}
