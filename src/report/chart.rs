//! Static SVG bar chart of the three sentiment classes

use crate::analyzer::{OpinionSummary, SentimentClass};
use std::io::{self, Write};

const WIDTH: f64 = 480.0;
const HEIGHT: f64 = 320.0;
const PLOT_TOP: f64 = 72.0;
const PLOT_BOTTOM: f64 = 272.0;
const BAR_WIDTH: f64 = 96.0;

pub fn color(class: SentimentClass) -> &'static str {
    match class {
        SentimentClass::Positive => "#3fb950",
        SentimentClass::Neutral => "#7d8590",
        SentimentClass::Negative => "#f85149",
    }
}

/// Bar height in pixels; the largest class fills the plot.
fn bar_height(count: usize, max: usize) -> f64 {
    if max == 0 {
        0.0
    } else {
        count as f64 / max as f64 * (PLOT_BOTTOM - PLOT_TOP)
    }
}

pub fn render(summary: &OpinionSummary) -> String {
    let bars = summary.bars();
    let max = bars.iter().map(|&(_, n)| n).max().unwrap_or(0);
    let slot = WIDTH / bars.len() as f64;

    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="-apple-system, 'Segoe UI', Helvetica, Arial, sans-serif">
  <rect width="{w}" height="{h}" fill="#0d1117"/>
  <text x="{cx}" y="30" text-anchor="middle" font-size="18" font-weight="600" fill="#e6edf3">General opinion</text>
  <text x="{cx}" y="52" text-anchor="middle" font-size="12" fill="#7d8590">{total} posts, {stars:.2} stars on average</text>
"##,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        total = summary.total(),
        stars = summary.average_star_rating,
    );

    for (i, (class, count)) in bars.iter().enumerate() {
        let height = bar_height(*count, max);
        let x = slot * i as f64 + (slot - BAR_WIDTH) / 2.0;
        let y = PLOT_BOTTOM - height;
        let center = x + BAR_WIDTH / 2.0;

        svg.push_str(&format!(
            r##"  <rect class="bar {name}" x="{x:.1}" y="{y:.1}" width="{bw}" height="{height:.1}" rx="4" fill="{fill}"/>
  <text x="{center:.1}" y="{label_y:.1}" text-anchor="middle" font-size="14" fill="#e6edf3">{count}</text>
  <text x="{center:.1}" y="{axis_y}" text-anchor="middle" font-size="13" fill="#7d8590">{label}</text>
"##,
            name = class.label().to_lowercase(),
            bw = BAR_WIDTH,
            fill = color(*class),
            label_y = y - 8.0,
            axis_y = PLOT_BOTTOM + 22.0,
            label = class.label(),
        ));
    }

    svg.push_str(&format!(
        "  <line x1=\"16\" y1=\"{b}\" x2=\"{x2}\" y2=\"{b}\" stroke=\"#30363d\"/>\n</svg>\n",
        b = PLOT_BOTTOM,
        x2 = WIDTH - 16.0,
    ));
    svg
}

pub fn write<W: Write>(writer: &mut W, summary: &OpinionSummary) -> io::Result<()> {
    writer.write_all(render(summary).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(positive: usize, neutral: usize, negative: usize) -> OpinionSummary {
        OpinionSummary {
            positive_count: positive,
            neutral_count: neutral,
            negative_count: negative,
            weighted_opinion_score: 0.0,
            average_star_rating: 3.0,
        }
    }

    /// `height` attribute of the bar for `class`.
    fn height_of(svg: &str, class: &str) -> f64 {
        let tag = format!("class=\"bar {}\"", class);
        let start = svg.find(&tag).unwrap();
        let rest = &svg[start..];
        let h = rest.find("height=\"").unwrap() + "height=\"".len();
        let end = rest[h..].find('"').unwrap();
        rest[h..h + end].parse().unwrap()
    }

    #[test]
    fn test_three_bars_in_order() {
        let svg = render(&summary(4, 2, 1));

        let pos = svg.find("bar positive").unwrap();
        let neu = svg.find("bar neutral").unwrap();
        let neg = svg.find("bar negative").unwrap();
        assert!(pos < neu && neu < neg);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_bar_heights_proportional() {
        let svg = render(&summary(4, 2, 0));

        assert_eq!(height_of(&svg, "positive"), PLOT_BOTTOM - PLOT_TOP);
        assert_eq!(height_of(&svg, "neutral"), (PLOT_BOTTOM - PLOT_TOP) / 2.0);
        assert_eq!(height_of(&svg, "negative"), 0.0);
    }

    #[test]
    fn test_counts_and_labels_shown() {
        let svg = render(&summary(12, 5, 3));
        assert!(svg.contains(">12</text>"));
        assert!(svg.contains(">Positive</text>"));
        assert!(svg.contains(">Negative</text>"));
        assert!(svg.contains("20 posts, 3.00 stars on average"));
    }

    #[test]
    fn test_all_zero_counts_do_not_divide_by_zero() {
        let svg = render(&summary(0, 0, 0));
        assert_eq!(height_of(&svg, "positive"), 0.0);
    }
}
