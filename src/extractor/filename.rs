use std::sync::LazyLock;

use regex::Regex;

// Bulletin names embed year, week and series: 2024年第3周第10期
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})年第(\d{1,2})周第(\d+)期").unwrap());

/// Bulletin identity parsed from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletinId {
    pub year: String,
    pub week: String,
    pub series: String,
}

/// Extract `(year, week, series)` from a bulletin file name. All three must
/// match or the name is rejected outright; there is no partial extraction.
pub fn parse(file_name: &str) -> Option<BulletinId> {
    let caps = NAME_RE.captures(file_name)?;
    Some(BulletinId {
        year: caps[1].to_string(),
        week: caps[2].to_string(),
        series: caps[3].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_bulletin_name() {
        let id = parse("2024年第3周第10期.pdf").unwrap();
        assert_eq!(id.year, "2024");
        assert_eq!(id.week, "3");
        assert_eq!(id.series, "10");
    }

    #[test]
    fn surrounding_text_is_ignored() {
        let id = parse("流感监测周报（2023年第45周第780期）.pdf").unwrap();
        assert_eq!(id.year, "2023");
        assert_eq!(id.week, "45");
        assert_eq!(id.series, "780");
    }

    #[test]
    fn two_digit_week() {
        let id = parse("2023年第52周第787期.pdf").unwrap();
        assert_eq!(id.week, "52");
    }

    #[test]
    fn non_matching_names_are_rejected() {
        assert!(parse("report_2024.pdf").is_none());
        assert!(parse("2024年第3周.pdf").is_none());
        assert!(parse("第3周第10期.pdf").is_none());
        assert!(parse("").is_none());
    }
}
