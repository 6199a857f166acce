use std::{str::FromStr, time::Duration};

use chrono::{DateTime, Local, Utc};
use cron::Schedule;

/// When a job fires.
///
/// Accepted syntax:
/// - standard five-field cron (`min hour dom month dow`, Sunday is `0` or `7`); when both day
///   fields are restricted a day matching either of them fires;
/// - six/seven-field cron with a leading seconds field (and optional year), evaluated as-is
///   (day of week `1-7`, Sunday is `1`; names like `MON-FRI` work in every form);
/// - macros `@yearly @annually @monthly @weekly @daily @midnight @hourly`;
/// - `@every <duration>`, e.g. `@every 90s` or `@every 1h 30m`.
///
/// Cron expressions are evaluated in the local time zone.
#[derive(Debug, Clone)]
pub enum Trigger {
    Cron(Box<Schedule>),
    /// Fires whenever any of the schedules fires.
    AnyOf(Vec<Schedule>),
    Every(Duration),
}

impl Trigger {
    pub fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        if let Some(every) = expr.strip_prefix("@every") {
            let interval = humantime::parse_duration(every.trim()).map_err(|e| e.to_string())?;
            if interval.is_zero() {
                return Err("interval must be positive".into());
            }
            return Ok(Trigger::Every(interval));
        }

        let mut schedules = normalize(expr)?
            .iter()
            .map(|e| Schedule::from_str(e).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        match schedules.len() {
            1 => Ok(Trigger::Cron(Box::new(schedules.remove(0)))),
            _ => Ok(Trigger::AnyOf(schedules)),
        }
    }

    /// First fire time strictly after `now`; `None` when the schedule never fires again.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Trigger::Cron(schedule) => schedule
                .after(&now.with_timezone(&Local))
                .next()
                .map(|at| at.with_timezone(&Utc)),
            Trigger::AnyOf(schedules) => {
                let local = now.with_timezone(&Local);
                schedules
                    .iter()
                    .filter_map(|s| s.after(&local).next())
                    .min()
                    .map(|at| at.with_timezone(&Utc))
            }
            Trigger::Every(interval) => chrono::Duration::from_std(*interval)
                .ok()
                .and_then(|d| now.checked_add_signed(d)),
        }
    }
}

/// Expand to one or more expressions in the six-field dialect.
fn normalize(expr: &str) -> Result<Vec<String>, String> {
    let expanded = match expr {
        "@yearly" | "@annually" => "0 0 0 1 1 *",
        "@monthly" => "0 0 0 1 * *",
        "@weekly" => "0 0 0 * * SUN",
        "@daily" | "@midnight" => "0 0 0 * * *",
        "@hourly" => "0 0 * * * *",
        other if other.starts_with('@') => return Err(format!("unknown macro {other}")),
        _ => "",
    };
    if !expanded.is_empty() {
        return Ok(vec![expanded.to_string()]);
    }

    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => {
            let (min, hour, dom, month) = (fields[0], fields[1], fields[2], fields[3]);
            let dow = standard_weekday(fields[4])?;
            // both day fields restricted: a day matching either one fires
            if is_restricted(dom) && is_restricted(&dow) {
                Ok(vec![
                    format!("0 {min} {hour} {dom} {month} *"),
                    format!("0 {min} {hour} * {month} {dow}"),
                ])
            } else {
                Ok(vec![format!("0 {min} {hour} {dom} {month} {dow}")])
            }
        }
        6 | 7 => Ok(vec![fields.join(" ")]),
        n => Err(format!("expected 5 to 7 fields, found {n}")),
    }
}

fn is_restricted(field: &str) -> bool {
    !matches!(field, "*" | "?")
}

/// Translate a standard day-of-week field (`0-7`, Sunday `0`/`7`) to the `1-7` numbering with
/// Sunday as `1`. Names, `*` and `?` pass through.
fn standard_weekday(field: &str) -> Result<String, String> {
    field
        .split(',')
        .map(weekday_item)
        .collect::<Result<Vec<_>, _>>()
        .map(|items| items.join(","))
}

fn weekday_item(item: &str) -> Result<String, String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    let mapped = match range.split_once('-') {
        Some((from, to)) => match (from.parse::<u8>(), to.parse::<u8>()) {
            (Ok(0), Ok(7)) => "1-7".to_string(),
            (Ok(from), Ok(7)) => {
                if step.is_some() {
                    return Err(format!("day of week range {range} with step is not supported"));
                }
                return Ok(format!("{}-7,1", shift_weekday(from)?));
            }
            (Ok(from), Ok(to)) => format!("{}-{}", shift_weekday(from)?, shift_weekday(to)?),
            _ => range.to_string(),
        },
        None => match range.parse::<u8>() {
            Ok(day) => shift_weekday(day)?.to_string(),
            Err(_) => range.to_string(),
        },
    };

    Ok(match step {
        Some(step) => format!("{mapped}/{step}"),
        None => mapped,
    })
}

fn shift_weekday(day: u8) -> Result<u8, String> {
    match day {
        0..=6 => Ok(day + 1),
        7 => Ok(1),
        _ => Err(format!("day of week {day} is out of range 0-7")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike, Weekday};

    use super::*;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("unambiguous local time")
            .with_timezone(&Utc)
    }

    fn next_local(expr: &str, from: DateTime<Utc>) -> DateTime<Local> {
        Trigger::parse(expr)
            .unwrap()
            .next_after(from)
            .unwrap()
            .with_timezone(&Local)
    }

    #[test]
    fn five_fields_get_seconds() {
        assert_eq!(normalize("*/5 * * * *").unwrap(), vec!["0 */5 * * * *"]);
        let at = next_local("*/5 * * * *", local(2024, 3, 4, 10, 1));
        assert_eq!((at.hour(), at.minute(), at.second()), (10, 5, 0));
    }

    #[test]
    fn six_fields_pass_through() {
        assert_eq!(normalize("30 0 12 * * *").unwrap(), vec!["30 0 12 * * *"]);
        assert!(Trigger::parse("30 0 12 * * *").is_ok());
    }

    #[test]
    fn macros_expand() {
        let at = next_local("@daily", local(2024, 3, 4, 10, 1));
        assert_eq!((at.day(), at.hour(), at.minute()), (5, 0, 0));

        let at = next_local("@hourly", local(2024, 3, 4, 10, 1));
        assert_eq!((at.hour(), at.minute()), (11, 0));

        let at = next_local("@weekly", local(2024, 3, 4, 10, 1));
        assert_eq!(at.weekday(), Weekday::Sun);

        assert!(Trigger::parse("@midnight").is_ok());
        assert!(Trigger::parse("@annually").is_ok());
        assert!(Trigger::parse("@fortnightly").is_err());
    }

    #[test]
    fn standard_sunday_numbering() {
        assert_eq!(standard_weekday("0").unwrap(), "1");
        assert_eq!(standard_weekday("7").unwrap(), "1");
        assert_eq!(standard_weekday("1-5").unwrap(), "2-6");
        assert_eq!(standard_weekday("5-7").unwrap(), "6-7,1");
        assert_eq!(standard_weekday("0-7").unwrap(), "1-7");
        assert_eq!(standard_weekday("1-5/2").unwrap(), "2-6/2");
        assert_eq!(standard_weekday("MON-FRI").unwrap(), "MON-FRI");
        assert_eq!(standard_weekday("*").unwrap(), "*");
        assert!(standard_weekday("8").is_err());

        // 2024-03-04 is a Monday
        let at = next_local("0 9 * * 0", local(2024, 3, 4, 10, 0));
        assert_eq!(at.weekday(), Weekday::Sun);
        let at = next_local("0 9 * * 1-5", local(2024, 3, 9, 10, 0));
        assert_eq!(at.weekday(), Weekday::Mon);
    }

    #[test]
    fn restricted_day_fields_match_either() {
        assert_eq!(
            normalize("0 0 13 * 5").unwrap(),
            vec!["0 0 0 13 * *", "0 0 0 * * 6"]
        );
        assert!(matches!(Trigger::parse("0 0 13 * 5").unwrap(), Trigger::AnyOf(_)));

        // 2024-03-08 is the first Friday after Monday 2024-03-04
        let at = next_local("0 0 13 * 5", local(2024, 3, 4, 10, 0));
        assert_eq!((at.month(), at.day(), at.hour()), (3, 8, 0));
        // the 13th fires although it is a Wednesday
        let at = next_local("0 0 13 * 5", local(2024, 3, 9, 10, 0));
        assert_eq!((at.month(), at.day()), (3, 13));

        // a single restricted day field keeps the plain meaning
        assert!(matches!(Trigger::parse("0 0 13 * *").unwrap(), Trigger::Cron(_)));
        assert!(matches!(Trigger::parse("0 0 * * 5").unwrap(), Trigger::Cron(_)));
    }

    #[test]
    fn every_interval() {
        let t = Trigger::parse("@every 90s").unwrap();
        assert!(matches!(t, Trigger::Every(d) if d == Duration::from_secs(90)));
        let now = Utc::now();
        assert_eq!(t.next_after(now).unwrap() - now, chrono::Duration::seconds(90));

        assert!(Trigger::parse("@every 0s").is_err());
        assert!(Trigger::parse("@every soon").is_err());
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(Trigger::parse("").is_err());
        assert!(Trigger::parse("* * *").is_err());
        assert!(Trigger::parse("61 * * * *").is_err());
        assert!(Trigger::parse("not a schedule at all").is_err());
    }
}
