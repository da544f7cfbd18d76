//! Spreadsheet export of the stored itinerary.
//!
//! The workbook has an overview sheet with one `[date, theme]` row per day,
//! in the order the days are stored, and an expense sheet built from the
//! budget ledger. Rendering needs the `xlsx` cargo feature.

use crate::{
    error::{ItineraryError, Result},
    model::Itinerary,
    store::ItineraryStore,
};

pub const REPORT_FILENAME: &str = "Trip_Itinerary.xlsx";
pub const REPORT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const OVERVIEW_SHEET: &str = "行程總覽";
pub const OVERVIEW_HEADER: [&str; 2] = ["日期", "行程重點"];
pub const EXPENSE_SHEET: &str = "消費明細";

/// A rendered workbook ready to be downloaded.
#[derive(Debug, Clone)]
pub struct Report {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Whether this build can render workbooks.
pub const fn is_available() -> bool {
    cfg!(feature = "xlsx")
}

/// Rows of the overview sheet, header first.
pub fn overview_rows(doc: &Itinerary) -> Vec<[String; 2]> {
    let header = OVERVIEW_HEADER.map(str::to_string);
    std::iter::once(header)
        .chain(
            doc.days
                .iter()
                .map(|day| [day.date.clone(), day.theme.clone()]),
        )
        .collect()
}

/// Render the document currently in `store`.
///
/// Unlike [`ItineraryStore::load`], nothing is masked here: a missing file is
/// [`ItineraryError::NotFound`] and a corrupt one is reported as is.
pub fn export(store: &ItineraryStore) -> Result<Report> {
    if !is_available() {
        return Err(ItineraryError::CapabilityUnavailable("spreadsheet export"));
    }

    let doc = store.read()?;
    let bytes = render(&doc)?;
    tracing::info!(days = doc.days.len(), size = bytes.len(), "rendered itinerary workbook");

    Ok(Report {
        filename: REPORT_FILENAME,
        content_type: REPORT_CONTENT_TYPE,
        bytes,
    })
}

#[cfg(not(feature = "xlsx"))]
pub fn render(_doc: &Itinerary) -> Result<Vec<u8>> {
    Err(ItineraryError::CapabilityUnavailable("spreadsheet export"))
}

#[cfg(feature = "xlsx")]
pub use xlsx::render;

#[cfg(feature = "xlsx")]
mod xlsx {
    use rust_xlsxwriter::{Color, DocProperties, Format, FormatAlign, Workbook, Worksheet};

    use super::{EXPENSE_SHEET, OVERVIEW_SHEET, overview_rows};
    use crate::{budget, error::Result, model::Itinerary};

    const FONT_NAME: &str = "微軟正黑體";
    const BRAND_COLOR: u32 = 0x1F4E78;

    fn header_format() -> Format {
        Format::new()
            .set_font_name(FONT_NAME)
            .set_font_size(12)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(BRAND_COLOR))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
    }

    fn title_format() -> Format {
        Format::new()
            .set_font_name(FONT_NAME)
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::RGB(BRAND_COLOR))
    }

    fn body_format() -> Format {
        Format::new().set_font_name(FONT_NAME)
    }

    fn centered_format() -> Format {
        body_format()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
    }

    /// Build the workbook in memory and return its bytes.
    pub fn render(doc: &Itinerary) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        workbook.set_properties(&DocProperties::new().set_title(&doc.trip_meta.title));

        write_overview(workbook.add_worksheet(), doc)?;
        write_expenses(workbook.add_worksheet(), doc)?;

        Ok(workbook.save_to_buffer()?)
    }

    fn write_overview(sheet: &mut Worksheet, doc: &Itinerary) -> Result<()> {
        let header = header_format();
        let centered = centered_format();
        let body = body_format();

        sheet.set_name(OVERVIEW_SHEET)?;
        sheet.set_column_width(0, 22)?;
        sheet.set_column_width(1, 48)?;
        sheet.set_freeze_panes(1, 0)?;

        for (row, [date, theme]) in overview_rows(doc).iter().enumerate() {
            let row = row as u32;
            if row == 0 {
                sheet.write_string_with_format(row, 0, date, &header)?;
                sheet.write_string_with_format(row, 1, theme, &header)?;
            } else {
                sheet.write_string_with_format(row, 0, date, &centered)?;
                sheet.write_string_with_format(row, 1, theme, &body)?;
            }
        }
        Ok(())
    }

    fn write_expenses(sheet: &mut Worksheet, doc: &Itinerary) -> Result<()> {
        let meta = &doc.trip_meta;
        let header = header_format();
        let centered = centered_format();
        let body = body_format();

        sheet.set_name(EXPENSE_SHEET)?;
        for (col, width) in [22, 36, 10, 14, 10, 16].into_iter().enumerate() {
            sheet.set_column_width(col as u16, width)?;
        }

        let converted = format!("折合 {}", meta.home_currency);
        let titles = ["日期", "項目", "類別", "金額", "幣別", converted.as_str()];
        for (col, title) in titles.into_iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, title, &header)?;
        }

        let items = budget::expenses(doc);
        for (i, item) in items.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string_with_format(row, 0, &item.date, &centered)?;
            sheet.write_string_with_format(row, 1, &item.name, &body)?;
            sheet.write_string_with_format(row, 2, item.category.label(), &centered)?;
            sheet.write_number_with_format(row, 3, item.cost as f64, &body)?;
            sheet.write_string_with_format(row, 4, &item.currency, &centered)?;
            let home = meta.to_home(item.cost, &item.currency);
            sheet.write_number_with_format(row, 5, home as f64, &body)?;
        }

        let summary = budget::summary(doc);
        let total_row = items.len() as u32 + 1;
        sheet.write_string_with_format(total_row, 1, "總計", &title_format())?;
        sheet.write_number_with_format(total_row, 5, summary.total_home as f64, &body)?;

        Ok(())
    }
}
