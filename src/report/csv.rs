//! CSV table writer
//!
//! One row per post in table order. `index` is the row's position and
//! `sentiment` is the class code (1, 0 or -1). Text containing commas,
//! quotes or line breaks is quoted per RFC 4180.

use crate::analyzer::PostRecord;
use std::io::{self, Write};

pub const HEADER: [&str; 9] = [
    "index", "text", "id", "len", "date", "source", "likes", "retweets", "sentiment",
];

pub fn write<W: Write>(writer: W, records: &[PostRecord]) -> io::Result<()> {
    let mut out = ::csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;

    for (index, r) in records.iter().enumerate() {
        out.write_record([
            index.to_string(),
            r.text.clone(),
            r.id.to_string(),
            r.text_length.to_string(),
            r.created_at.to_rfc3339(),
            r.source.clone(),
            r.like_count.to_string(),
            r.retweet_count.to_string(),
            r.sentiment.code().to_string(),
        ])?;
    }

    out.flush()
}
