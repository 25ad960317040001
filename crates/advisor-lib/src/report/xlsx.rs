//! Spreadsheet rendering of cluster reports

use super::{ClusterReport, DetailRow, RecommendationRow, ReportArtifact, ReportSink};
use crate::cluster::ClusterScore;
use crate::error::Result;
use crate::observability::{AdvisorMetrics, StructuredLogger};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::PathBuf;

/// Header fill
const BRAND_BLUE: u32 = 0x0F62FE;
/// Fill for metric headers and the totals row
const LIGHT_GREY: u32 = 0xE0E0E0;

/// Writes `.xlsx` workbooks into a directory
#[derive(Debug, Clone)]
pub struct XlsxReportSink {
    output_dir: PathBuf,
    metrics: AdvisorMetrics,
    logger: StructuredLogger,
}

impl XlsxReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            metrics: AdvisorMetrics::new(),
            logger: StructuredLogger::new("report-sink"),
        }
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }
}

impl ReportSink for XlsxReportSink {
    fn write(&self, report: &ClusterReport) -> Result<ReportArtifact> {
        std::fs::create_dir_all(&self.output_dir)?;

        let filename = report.file_name();
        let path = self.output_dir.join(&filename);

        let mut workbook = Workbook::new();
        write_summary(workbook.add_worksheet(), report)?;
        write_details(workbook.add_worksheet(), report)?;
        write_recommendations(workbook.add_worksheet(), report)?;
        workbook.save(&path)?;

        self.metrics.inc_reports_generated();
        self.logger
            .log_report_generated(&path.display().to_string(), report.details.len());

        Ok(ReportArtifact {
            url: format!("/downloads/{}", filename),
            filename,
            path,
        })
    }
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(BRAND_BLUE))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

fn cell_format() -> Format {
    Format::new().set_border(FormatBorder::Thin)
}

/// Bold fill in the score colour; dark text on amber, white elsewhere
fn score_format(score: ClusterScore) -> Format {
    let format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(score.color()))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    match score {
        ClusterScore::Amber => format,
        _ => format.set_font_color(Color::White),
    }
}

fn write_headers(sheet: &mut Worksheet, headers: &[(&str, f64)]) -> Result<()> {
    let format = header_format();
    for (col, (title, width)) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &format)?;
        sheet.set_column_width(col, *width)?;
    }
    sheet.set_row_height(0, 20)?;
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, report: &ClusterReport) -> Result<()> {
    sheet.set_name("Summary")?;

    let title = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(BRAND_BLUE))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    sheet.merge_range(0, 0, 0, 3, &report.title, &title)?;
    sheet.set_row_height(0, 30)?;

    let generated = Format::new().set_italic().set_align(FormatAlign::Center);
    sheet.merge_range(
        1,
        0,
        1,
        3,
        &format!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        &generated,
    )?;
    sheet.set_freeze_panes(1, 0)?;

    let section = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(LIGHT_GREY));
    sheet.write_string_with_format(3, 0, "Metric", &section)?;
    sheet.write_string_with_format(3, 1, "Value", &section)?;

    let label = Format::new().set_bold();
    let value = Format::new().set_bold().set_font_color(Color::RGB(BRAND_BLUE));
    let mut row = 4;
    for entry in &report.summary {
        sheet.write_string_with_format(row, 0, &entry.metric, &label)?;
        sheet.write_string_with_format(row, 1, &entry.value, &value)?;
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "Cost Score Distribution", &label)?;
    row += 1;
    for bucket in &report.score_distribution {
        sheet.write_string(row, 0, &bucket.label)?;
        sheet.write_number(row, 1, bucket.count as f64)?;
        row += 1;
    }

    sheet.set_column_width(0, 30)?;
    sheet.set_column_width(1, 20)?;
    Ok(())
}

fn write_details(sheet: &mut Worksheet, report: &ClusterReport) -> Result<()> {
    sheet.set_name("Cluster Details")?;
    write_headers(sheet, &DetailRow::HEADERS)?;

    let plain = cell_format();
    let mut row = 1;
    for detail in &report.details {
        write_detail_row(sheet, row, detail, &plain)?;
        row += 1;
    }

    // Blank spacer row before the totals
    row += 1;
    let totals = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(LIGHT_GREY))
        .set_border(FormatBorder::Thin);
    write_detail_row(sheet, row, &report.totals, &totals)?;
    Ok(())
}

fn write_detail_row(sheet: &mut Worksheet, row: u32, detail: &DetailRow, format: &Format) -> Result<()> {
    for (col, value) in detail.cells().iter().enumerate() {
        let col_idx = col as u16;
        match detail.score {
            Some(score) if col == DetailRow::SCORE_COLUMN => {
                sheet.write_string_with_format(row, col_idx, value, &score_format(score))?;
            }
            _ => {
                sheet.write_string_with_format(row, col_idx, value, format)?;
            }
        }
    }
    Ok(())
}

fn write_recommendations(sheet: &mut Worksheet, report: &ClusterReport) -> Result<()> {
    sheet.set_name("Recommendations")?;
    write_headers(sheet, &RecommendationRow::HEADERS)?;

    let plain = cell_format();
    let wrapped = Format::new()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_border(FormatBorder::Thin);

    for (idx, rec) in report.recommendations.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string_with_format(row, 0, &rec.name, &plain)?;
        sheet.write_string_with_format(row, 1, rec.score.as_str(), &score_format(rec.score))?;
        sheet.write_string_with_format(row, 2, &rec.monthly, &plain)?;
        sheet.write_string_with_format(row, 3, &rec.recommendations, &wrapped)?;
        sheet.set_row_height(row, rec.row_height)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_aggregate;
    use tempfile::TempDir;

    #[test]
    fn test_writes_workbook_into_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let sink = XlsxReportSink::new(temp_dir.path().join("downloads"));
        let report = ClusterReport::from_aggregate(&sample_aggregate());

        let artifact = sink.write(&report).unwrap();

        assert_eq!(artifact.filename, report.file_name());
        assert_eq!(artifact.url, format!("/downloads/{}", report.file_name()));
        let bytes = std::fs::read(&artifact.path).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }
}
