use std::sync::LazyLock;

use regex::Regex;

// Parenthetical annotations carried inside cells, e.g. "505(10.7)".
static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Structural assumptions about the indicator table. Every value is
/// overridable from the command line so a reshaped bulletin fails loudly
/// instead of being misread.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Leading rows of the recovered table that are column headers.
    pub header_rows: usize,
    /// Column index holding southern-province values.
    pub south_col: usize,
    /// Column index holding northern-province values.
    pub north_col: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            header_rows: 2,
            south_col: 1,
            north_col: 2,
        }
    }
}

/// One recovered table row; absent cells are `None`.
pub type Row = Vec<Option<String>>;

/// Recover the indicator table from a page of extracted text.
///
/// The table block starts at the header line naming both region columns and
/// runs through the contiguous lines whose cells after the label token all
/// look numeric; the first trailing line that no longer does (notes,
/// footers) ends it. Returns an empty Vec when no such block exists.
pub fn recover(page_text: &str) -> Vec<Row> {
    let lines: Vec<&str> = page_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let Some(start) = lines
        .iter()
        .position(|l| l.contains("南方") && l.contains("北方"))
    else {
        return Vec::new();
    };

    let mut rows: Vec<Row> = Vec::new();
    let mut seen_data = false;
    for line in &lines[start..] {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let is_data = tokens.len() >= 2 && tokens[1..].iter().all(|t| is_cell(t));
        if is_data {
            seen_data = true;
        } else if seen_data {
            break;
        }
        rows.push(tokens.into_iter().map(|t| Some(t.to_string())).collect());
    }
    rows
}

/// Values for one region: the region's column from every data row, with
/// parenthetical annotations stripped. Rows whose cell is absent in that
/// column are dropped entirely, so the two region lists can differ in
/// length and a list index need not refer to the same source row in both
/// regions — a limitation inherited from the source table format.
pub fn region_values(rows: &[Row], col: usize, header_rows: usize) -> Vec<String> {
    rows.iter()
        .skip(header_rows)
        .filter_map(|row| row.get(col).and_then(|cell| cell.as_deref()))
        .map(|cell| PAREN_RE.replace_all(cell, "").to_string())
        .collect()
}

// A cell is numeric-shaped: digits plus separators, an optional
// parenthetical, or a bare placeholder dash.
fn is_cell(token: &str) -> bool {
    if token == "-" || token == "—" {
        return true;
    }
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| {
            c.is_ascii_digit() || matches!(c, '.' | ',' | '%' | '(' | ')' | '-' | '/' | '*')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> &'static str {
        "流感监测周报\n\
         表1 南方、北方省份流感病原学监测结果\n\
         项目 南方省份 北方省份\n\
         本周 本周\n\
         检测数 4708 3224\n\
         阳性数(%) 505(10.7) 268(8.3)\n\
         A型 339 180\n\
         A(H1N1)pdm09 47 25\n\
         A(H3N2) 292 155\n\
         注：数据来源于全国流感监测信息系统。\n"
    }

    #[test]
    fn header_anchored_block_with_two_header_rows() {
        let rows = recover(page());
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0][1].as_deref(), Some("南方省份"));
        assert_eq!(rows[2][0].as_deref(), Some("检测数"));
        assert_eq!(rows[6][0].as_deref(), Some("A(H3N2)"));
    }

    #[test]
    fn trailing_notes_end_the_block() {
        let rows = recover(page());
        assert!(rows
            .iter()
            .all(|r| !r[0].as_deref().unwrap_or("").starts_with("注")));
    }

    #[test]
    fn page_without_table_yields_nothing() {
        assert!(recover("本页只有正文，没有表格。").is_empty());
        assert!(recover("").is_empty());
    }

    #[test]
    fn parenthetical_spans_are_stripped_exactly() {
        let rows: Vec<Row> = vec![
            vec![Some("h".into()), Some("h".into()), Some("h".into())],
            vec![Some("h".into()), Some("h".into()), Some("h".into())],
            vec![Some("x".into()), Some("85.3(x)".into()), Some("20.1".into())],
            vec![Some("y".into()), Some("50(y)".into()), Some("10".into())],
        ];
        assert_eq!(region_values(&rows, 1, 2), vec!["85.3", "50"]);
        assert_eq!(region_values(&rows, 2, 2), vec!["20.1", "10"]);
    }

    #[test]
    fn absent_cells_drop_the_row_for_that_region_only() {
        let rows: Vec<Row> = vec![
            vec![Some("h".into()), Some("h".into()), Some("h".into())],
            vec![Some("h".into()), Some("h".into()), Some("h".into())],
            vec![Some("a".into()), Some("1".into()), Some("2".into())],
            vec![Some("b".into()), Some("3".into())],
            vec![Some("c".into()), Some("4".into()), Some("5".into())],
        ];
        assert_eq!(region_values(&rows, 1, 2), vec!["1", "3", "4"]);
        // North skips row "b" entirely, so its indices shift.
        assert_eq!(region_values(&rows, 2, 2), vec!["2", "5"]);
    }

    #[test]
    fn short_row_from_text_recovery() {
        let text = "南方省份 北方省份\n合计 合计\nB未分系 12\n";
        let rows = recover(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].len(), 2);
        assert_eq!(region_values(&rows, 1, 2), vec!["12"]);
        assert!(region_values(&rows, 2, 2).is_empty());
    }

    #[test]
    fn placeholder_dashes_count_as_cells() {
        let text = "南方省份 北方省份\n周 周\nB/Yamagata - 0\n";
        let rows = recover(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(region_values(&rows, 1, 2), vec!["-"]);
    }
}
