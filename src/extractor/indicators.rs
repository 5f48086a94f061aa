use crate::extractor::filename::BulletinId;

/// Output column names for the ten positional indicator fields, in the
/// order the table rows carry them. The mapping is this one array; a
/// reordered table shows up as a schema mismatch, not a silent swap.
pub const INDICATOR_FIELDS: [&str; 10] = [
    "检测数",
    "阳性数(%)",
    "A型",
    "A(H1N1)pdm09",
    "A(H3N2)",
    "A(unsubtyped)",
    "B型",
    "B未分系",
    "Victoria",
    "Yamagata",
];

pub const REGION_SOUTH: &str = "南方省份";
pub const REGION_NORTH: &str = "北方省份";

/// One output row: a region's weekly indicators for one bulletin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorRecord {
    pub year: String,
    pub week: String,
    pub series: String,
    pub region: String,
    pub ili_rate: Option<String>,
    pub indicators: [Option<String>; 10],
    pub publish_date: String,
}

/// Build one region's record from its ordered value list. Positions past
/// the end of the list stay `None`; values past the tenth are ignored.
pub fn build_record(
    id: &BulletinId,
    region: &str,
    ili_rate: Option<String>,
    values: Vec<String>,
    publish_date: &str,
) -> IndicatorRecord {
    let mut indicators: [Option<String>; 10] = Default::default();
    for (slot, value) in indicators.iter_mut().zip(values) {
        *slot = Some(value);
    }
    IndicatorRecord {
        year: id.year.clone(),
        week: id.week.clone(),
        series: id.series.clone(),
        region: region.to_string(),
        ili_rate,
        indicators,
        publish_date: publish_date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> BulletinId {
        BulletinId {
            year: "2024".into(),
            week: "3".into(),
            series: "10".into(),
        }
    }

    #[test]
    fn short_value_list_null_fills_the_tail() {
        let values = vec!["4708".to_string(), "505".to_string(), "339".to_string()];
        let rec = build_record(&id(), REGION_SOUTH, Some("6.1".into()), values, "2024-01-18");
        assert_eq!(rec.indicators[0].as_deref(), Some("4708"));
        assert_eq!(rec.indicators[2].as_deref(), Some("339"));
        assert!(rec.indicators[3..].iter().all(Option::is_none));
    }

    #[test]
    fn values_past_the_tenth_are_ignored() {
        let values: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        let rec = build_record(&id(), REGION_NORTH, None, values, "2024-01-18");
        assert_eq!(rec.indicators[9].as_deref(), Some("9"));
        assert_eq!(rec.indicators.len(), 10);
    }

    #[test]
    fn identity_fields_are_copied() {
        let rec = build_record(&id(), REGION_NORTH, None, Vec::new(), "2024-01-18");
        assert_eq!(rec.year, "2024");
        assert_eq!(rec.week, "3");
        assert_eq!(rec.series, "10");
        assert_eq!(rec.region, REGION_NORTH);
        assert_eq!(rec.publish_date, "2024-01-18");
        assert!(rec.indicators.iter().all(Option::is_none));
    }
}
