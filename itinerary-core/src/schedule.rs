use chrono::{Datelike, Days, NaiveDate};

use crate::{
    error::{ItineraryError, Result},
    model::{Day, Itinerary},
};

/// Theme given to days added by [`reschedule`].
pub const NEW_DAY_THEME: &str = "自由探索";

const WEEKDAYS: [&str; 7] = [
    "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日",
];

/// Day label in the form `2026-04-15 (星期三)`.
pub fn date_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
    format!("{} ({weekday})", date.format("%Y-%m-%d"))
}

/// Move the trip to the inclusive range `start..=end`.
///
/// Days past the new length are dropped, every remaining day is relabelled
/// with its new date, and missing days are appended empty. Stops and themes
/// of kept days are untouched.
pub fn reschedule(doc: &mut Itinerary, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(ItineraryError::invalid(
            "trip_meta.start_date",
            format!("trip ends ({end}) before it starts ({start})"),
        ));
    }

    let days_count = u32::try_from((end - start).num_days() + 1).map_err(|_| {
        ItineraryError::invalid("trip_meta.days_count", "date range is too long")
    })?;

    let meta = &mut doc.trip_meta;
    meta.start_date = start.format("%Y-%m-%d").to_string();
    meta.days_count = days_count;

    doc.days.truncate(days_count as usize);
    for (offset, day) in doc.days.iter_mut().enumerate() {
        day.date = date_label(nth_day(start, offset as u64)?);
    }

    for offset in doc.days.len()..days_count as usize {
        doc.days.push(Day::new(
            offset as u32 + 1,
            date_label(nth_day(start, offset as u64)?),
            NEW_DAY_THEME,
            doc.trip_meta.destination_currency.clone(),
        ));
    }

    Ok(())
}

fn nth_day(start: NaiveDate, offset: u64) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| ItineraryError::invalid("trip_meta.start_date", "date out of range"))
}
