//! JSON report: the summary followed by every row

use crate::analyzer::{OpinionSummary, PostRecord};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct Report<'a> {
    /// Absent for an empty table
    summary: Option<OpinionSummary>,
    posts: &'a [PostRecord],
}

pub fn write<W: Write>(writer: W, records: &[PostRecord]) -> io::Result<()> {
    let report = Report {
        summary: OpinionSummary::from_records(records).ok(),
        posts: records,
    };
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample;
    use serde_json::Value;

    fn render(records: &[PostRecord]) -> Value {
        let mut buf = Vec::new();
        write(&mut buf, records).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_summary_and_posts() {
        let json = render(&sample());

        assert_eq!(json["summary"]["positive_count"], 1);
        assert_eq!(json["summary"]["negative_count"], 1);
        assert_eq!(json["summary"]["average_star_rating"], 3.0);
        assert_eq!(json["posts"].as_array().unwrap().len(), 3);
        assert_eq!(json["posts"][2]["sentiment"], "negative");
        assert_eq!(json["posts"][0]["created_at"], "2020-06-02T15:30:00+00:00");
    }

    #[test]
    fn test_rows_read_back() {
        let mut buf = Vec::new();
        write(&mut buf, &sample()).unwrap();

        let value: Value = serde_json::from_slice(&buf).unwrap();
        let posts: Vec<PostRecord> = serde_json::from_value(value["posts"].clone()).unwrap();
        assert_eq!(posts, sample());
    }

    #[test]
    fn test_empty_table_has_null_summary() {
        let json = render(&[]);
        assert!(json["summary"].is_null());
        assert_eq!(json["posts"].as_array().unwrap().len(), 0);
    }
}
