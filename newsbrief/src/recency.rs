use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use crate::normalize::Headline;

/// Trailing recency window applied to feed headlines, in whole days.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Parse a feed publication date. RSS feeds carry RFC 2822 dates, Atom feeds
/// RFC 3339. Anything else classifies as unparsable and returns None.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// Keep only headlines published within `[start_of_day(now - window_days), now]`
/// and sort them descending by publication instant.
///
/// `now` is an explicit parameter so tests are deterministic across
/// timezones; the window floor is computed in `now`'s calendar. Headlines
/// with a missing or unparsable date are excluded, never errors. The sort is
/// stable: equal timestamps keep their source order.
pub fn filter_recent<Tz: TimeZone>(
    headlines: Vec<Headline>,
    now: DateTime<Tz>,
    window_days: i64,
) -> Vec<Headline> {
    let now_utc = now.with_timezone(&Utc);
    let floor_utc = window_floor(&now, window_days);

    let mut dated: Vec<(DateTime<Utc>, Headline)> = headlines
        .into_iter()
        .filter_map(|h| {
            let at = h
                .pub_date
                .as_deref()
                .and_then(parse_pub_date)?
                .with_timezone(&Utc);
            (at >= floor_utc && at <= now_utc).then_some((at, h))
        })
        .collect();

    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.into_iter().map(|(_, h)| h).collect()
}

/// Start of the calendar day `window_days` days before `now`, in `now`'s
/// zone. If midnight does not exist there (DST gap), fall back to the exact
/// instant `now - window_days`.
fn window_floor<Tz: TimeZone>(now: &DateTime<Tz>, window_days: i64) -> DateTime<Utc> {
    let boundary = now.clone() - Duration::days(window_days);
    let start_of_day = boundary.date_naive().and_time(chrono::NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&start_of_day)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| boundary.with_timezone(&Utc))
}
