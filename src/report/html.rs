//! Static HTML report: summary cards, bar chart and the post table

use super::chart;
use crate::analyzer::{OpinionSummary, PostRecord, SentimentClass};
use std::io::{self, Write};

const STYLE: &str = r#"
        :root {
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --positive: #3fb950;
            --neutral: #7d8590;
            --negative: #f85149;
            --accent: #58a6ff;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }

        .header {
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }
        .logo {
            font-size: 2.5rem;
            font-weight: 800;
            background: linear-gradient(135deg, var(--accent), #a371f7);
            -webkit-background-clip: text;
            -webkit-text-fill-color: transparent;
        }
        .subtitle { color: var(--dim); font-size: 1rem; }

        .stats {
            display: grid;
            grid-template-columns: repeat(5, 1fr);
            gap: 1rem;
            margin-bottom: 2rem;
        }
        .stat {
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            text-align: center;
        }
        .stat-value { font-size: 2.5rem; font-weight: 700; line-height: 1; }
        .stat-label { color: var(--dim); font-size: 0.875rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }
        .stat.positive .stat-value { color: var(--positive); }
        .stat.neutral .stat-value { color: var(--neutral); }
        .stat.negative .stat-value { color: var(--negative); }

        .chart-card {
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            margin-bottom: 2rem;
            display: flex;
            justify-content: center;
        }

        .table-container {
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            overflow: hidden;
        }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 0.875rem 1rem; text-align: left; vertical-align: top; }
        th {
            background: rgba(255,255,255,0.03);
            font-weight: 600;
            font-size: 0.75rem;
            text-transform: uppercase;
            letter-spacing: 0.05em;
            color: var(--dim);
            border-bottom: 1px solid var(--border);
        }
        td { border-bottom: 1px solid var(--border); }
        tr:last-child td { border-bottom: none; }
        .num { text-align: right; font-family: 'SF Mono', monospace; font-size: 0.85rem; }
        .dim { color: var(--dim); }

        .sentiment {
            display: inline-block;
            padding: 0.25rem 0.75rem;
            border-radius: 20px;
            font-size: 0.75rem;
            font-weight: 600;
            text-transform: uppercase;
        }
        .sentiment.positive { background: rgba(63,185,80,0.15); color: var(--positive); }
        .sentiment.neutral { background: rgba(110,118,129,0.15); color: var(--neutral); }
        .sentiment.negative { background: rgba(248,81,73,0.15); color: var(--negative); }

        .empty { color: var(--dim); text-align: center; padding: 3rem; }
"#;

fn head<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">Postmood</div>
            <div class="subtitle">{title}</div>
        </div>
"#,
        title = escape(title),
        style = STYLE,
    )
}

fn tail<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "    </div>\n</body>\n</html>")
}

fn css_class(class: SentimentClass) -> &'static str {
    match class {
        SentimentClass::Positive => "positive",
        SentimentClass::Neutral => "neutral",
        SentimentClass::Negative => "negative",
    }
}

fn stats<W: Write>(writer: &mut W, summary: &OpinionSummary) -> io::Result<()> {
    writeln!(writer, r#"        <div class="stats">"#)?;
    for (class, count) in summary.bars() {
        writeln!(
            writer,
            r#"            <div class="stat {css}"><div class="stat-value">{count}</div><div class="stat-label">{label} ({pct:.0}%)</div></div>"#,
            css = css_class(class),
            label = class.label(),
            pct = summary.percent(class),
        )?;
    }
    writeln!(
        writer,
        r#"            <div class="stat"><div class="stat-value">{:.0}</div><div class="stat-label">Weighted opinion</div></div>
            <div class="stat"><div class="stat-value">{:.2}</div><div class="stat-label">Average stars</div></div>
        </div>"#,
        summary.weighted_opinion_score, summary.average_star_rating,
    )
}

/// Full report page for a finished table.
pub fn write<W: Write>(writer: &mut W, records: &[PostRecord]) -> io::Result<()> {
    head(writer, "Post Sentiment Report")?;

    match OpinionSummary::from_records(records) {
        Ok(summary) => {
            stats(writer, &summary)?;
            writeln!(writer, r#"        <div class="chart-card">{}</div>"#, chart::render(&summary))?;
        }
        Err(_) => {
            writeln!(writer, r#"        <div class="empty">No posts were analyzed.</div>"#)?;
        }
    }

    writeln!(
        writer,
        r#"        <div class="table-container">
            <table>
                <thead>
                    <tr><th>#</th><th>Sentiment</th><th>Post</th><th>Date</th><th>Source</th><th class="num">Likes</th><th class="num">Retweets</th><th class="num">Length</th></tr>
                </thead>
                <tbody>"#
    )?;

    for (index, r) in records.iter().enumerate() {
        writeln!(
            writer,
            r#"                    <tr><td class="dim">{index}</td><td><span class="sentiment {css}">{label}</span></td><td>{text}</td><td class="dim">{date}</td><td class="dim">{source}</td><td class="num">{likes}</td><td class="num">{retweets}</td><td class="num">{len}</td></tr>"#,
            css = css_class(r.sentiment),
            label = r.sentiment.label(),
            text = escape(&r.text),
            date = r.created_at.format("%Y-%m-%d %H:%M"),
            source = escape(&r.source),
            likes = r.like_count,
            retweets = r.retweet_count,
            len = r.text_length,
        )?;
    }

    writeln!(
        writer,
        r#"                </tbody>
            </table>
        </div>"#
    )?;
    tail(writer)
}

/// Page holding only the summary cards and the bar chart.
pub fn write_chart<W: Write>(writer: &mut W, summary: &OpinionSummary) -> io::Result<()> {
    head(writer, "General Opinion")?;
    stats(writer, summary)?;
    writeln!(writer, r#"        <div class="chart-card">{}</div>"#, chart::render(summary))?;
    tail(writer)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{record, sample};

    fn render(records: &[PostRecord]) -> String {
        let mut buf = Vec::new();
        write(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_page_has_cards_chart_and_rows() {
        let html = render(&sample());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("Average stars"));
        assert_eq!(html.matches("<tr><td class=\"dim\">").count(), 3);
        assert!(html.contains(r#"<span class="sentiment negative">Negative</span>"#));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_post_text_is_escaped() {
        let records = vec![record(1, "<script>alert('x')</script> & more", SentimentClass::Neutral)];
        let html = render(&records);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
    }

    #[test]
    fn test_empty_table_page() {
        let html = render(&[]);
        assert!(html.contains("No posts were analyzed."));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_chart_page() {
        let summary = OpinionSummary::from_records(&sample()).unwrap();
        let mut buf = Vec::new();
        write_chart(&mut buf, &summary).unwrap();
        let html = String::from_utf8(buf).unwrap();

        assert!(html.contains("General Opinion"));
        assert!(html.contains("class=\"bar positive\""));
        assert!(!html.contains("<table>"));
    }
}
