use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::models::PricePoint;
use crate::utils::PipelineError;

/// CSS selector for one bar of the apexcharts price chart
pub const BAR_SELECTOR: &str = "path.apexcharts-bar-area";

const SLOT_ATTR: &str = "j";
const VALUE_ATTR: &str = "val";

/// Read an attribute; `""` counts as absent, whitespace does not
fn non_empty_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}

/// Extract the price series from rendered chart markup
///
/// Bars missing the slot or value attribute, or carrying it empty, are
/// skipped. A present value that is not a finite decimal aborts the whole
/// extraction. The result keeps document order and is not truncated here.
pub fn extract_price_points(html: &str) -> Result<Vec<PricePoint>, PipelineError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(BAR_SELECTOR)
        .map_err(|e| PipelineError::Scrape(format!("Invalid bar selector: {}", e)))?;

    let mut points = Vec::new();

    for (index, bar) in document.select(&selector).enumerate() {
        let (slot, raw_value) = match (
            non_empty_attr(&bar, SLOT_ATTR),
            non_empty_attr(&bar, VALUE_ATTR),
        ) {
            (Some(slot), Some(value)) => (slot, value),
            _ => {
                warn!("Skipping chart bar {}: missing '{}' or '{}' attribute", index, SLOT_ATTR, VALUE_ATTR);
                continue;
            }
        };

        let price = raw_value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| PipelineError::MalformedSample {
                index,
                value: raw_value.to_string(),
            })?;

        points.push(PricePoint::new(slot.trim(), price));
    }

    debug!("Extracted {} price points from chart markup", points.len());

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_page(bars: &str) -> String {
        format!(
            r#"<html><body><div id="chart"><svg width="800" height="400">
            <g class="apexcharts-bar-series">{}</g>
            </svg></div></body></html>"#,
            bars
        )
    }

    #[test]
    fn test_extracts_bars_in_document_order() {
        let html = chart_page(
            r#"<path class="apexcharts-bar-area" j="0" val="0.2514" d="M 0 0"></path>
               <path class="apexcharts-bar-area" j="1" val="0.2381" d="M 1 0"></path>
               <path class="apexcharts-bar-area" j="2" val="0.3102" d="M 2 0"></path>"#,
        );

        let points = extract_price_points(&html).expect("extraction failed");

        assert_eq!(points.len(), 3);
        assert_eq!(points[0], PricePoint::new("0", 0.2514));
        assert_eq!(points[1].slot_label, "Slot 1");
        assert_eq!(points[2].price, 0.3102);
    }

    #[test]
    fn test_does_not_truncate_or_dedup() {
        let bars: String = (0..30)
            .map(|i| format!(r#"<path class="apexcharts-bar-area" j="{}" val="0.25"></path>"#, i % 24))
            .collect();

        let points = extract_price_points(&chart_page(&bars)).expect("extraction failed");

        assert_eq!(points.len(), 30);
        assert_eq!(points[24].slot_label, "Slot 0");
    }

    #[test]
    fn test_skips_bars_missing_attributes() {
        let html = chart_page(
            r#"<path class="apexcharts-bar-area" j="0" val="0.20"></path>
               <path class="apexcharts-bar-area" val="0.21"></path>
               <path class="apexcharts-bar-area" j="2"></path>
               <path class="apexcharts-bar-area" j="3" val=""></path>
               <path class="apexcharts-bar-area" j="4" val="0.24"></path>"#,
        );

        let points = extract_price_points(&html).expect("extraction failed");

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].slot_label, "Slot 0");
        assert_eq!(points[1].slot_label, "Slot 4");
    }

    #[test]
    fn test_ignores_other_chart_elements() {
        let html = chart_page(
            r#"<path class="apexcharts-grid-line" j="0" val="9.99"></path>
               <rect class="apexcharts-bar-area" j="0" val="9.99"></rect>
               <path class="apexcharts-bar-area" j="5" val="-0.0123"></path>"#,
        );

        let points = extract_price_points(&html).expect("extraction failed");

        assert_eq!(points, vec![PricePoint::new("5", -0.0123)]);
    }

    #[test]
    fn test_no_bars_yields_empty() {
        let html = chart_page(r#"<text>Geen gegevens</text>"#);
        let points = extract_price_points(&html).expect("extraction failed");
        assert!(points.is_empty());

        assert!(extract_price_points("").expect("extraction failed").is_empty());
    }

    #[test]
    fn test_malformed_value_fails_whole_extraction() {
        let html = chart_page(
            r#"<path class="apexcharts-bar-area" j="0" val="0.20"></path>
               <path class="apexcharts-bar-area" j="1" val="n/a"></path>
               <path class="apexcharts-bar-area" j="2" val="0.22"></path>"#,
        );

        match extract_price_points(&html) {
            Err(PipelineError::MalformedSample { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, "n/a");
            }
            other => panic!("expected MalformedSample, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_value_is_malformed() {
        let html = chart_page(r#"<path class="apexcharts-bar-area" j="0" val="NaN"></path>"#);
        assert!(matches!(
            extract_price_points(&html),
            Err(PipelineError::MalformedSample { .. })
        ));
    }

    #[test]
    fn test_value_whitespace_is_trimmed() {
        let html = chart_page(r#"<path class="apexcharts-bar-area" j=" 7 " val=" 0.1875 "></path>"#);
        let points = extract_price_points(&html).expect("extraction failed");
        assert_eq!(points, vec![PricePoint::new("7", 0.1875)]);
    }

    #[test]
    fn test_blank_value_is_malformed_not_skipped() {
        let html = chart_page(
            r#"<path class="apexcharts-bar-area" j="0" val="0.20"></path>
               <path class="apexcharts-bar-area" j="1" val="   "></path>"#,
        );

        match extract_price_points(&html) {
            Err(PipelineError::MalformedSample { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, "   ");
            }
            other => panic!("expected MalformedSample, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_slot_is_kept() {
        let html = chart_page(r#"<path class="apexcharts-bar-area" j=" " val="0.31"></path>"#);
        let points = extract_price_points(&html).expect("extraction failed");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 0.31);
    }
}
