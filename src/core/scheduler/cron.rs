//! Minimal 5-field cron parser (`minute hour day-of-month month
//! day-of-week`), used by `PollingEngine::start_scheduled` for the
//! `--cron` flag. No external scheduler crate is pulled in for this — see
//! `DESIGN.md` and `SPEC_FULL.md` §4.3.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct CronSpec {
    minute: Field,
    hour: Field,
    day_of_month: Field,
    month: Field,
    day_of_week: Field,
}

#[derive(Debug, Clone)]
struct Field {
    values: Vec<u32>,
}

impl Field {
    fn matches(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    fn parse(raw: &str, min: u32, max: u32) -> Result<Self> {
        if raw == "*" {
            return Ok(Field {
                values: (min..=max).collect(),
            });
        }

        let mut values = Vec::new();
        for part in raw.split(',') {
            let n: u32 = part
                .trim()
                .parse()
                .map_err(|_| Error::Parse(format!("invalid cron field value: {part}")))?;
            if n < min || n > max {
                return Err(Error::Parse(format!(
                    "cron field value {n} out of range [{min}, {max}]"
                )));
            }
            values.push(n);
        }
        values.sort_unstable();
        Ok(Field { values })
    }
}

impl CronSpec {
    /// Parse a standard 5-field cron expression. Only literal numbers,
    /// comma lists, and `*` are supported — no step (`*/5`) or range
    /// (`1-5`) syntax. On parse failure the caller falls back to
    /// `--interval` with a warning, per `spec.md` §4.3.
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(Error::Parse(format!(
                "cron expression must have 5 fields, got {}",
                fields.len()
            )));
        }

        Ok(CronSpec {
            minute: Field::parse(fields[0], 0, 59)?,
            hour: Field::parse(fields[1], 0, 23)?,
            day_of_month: Field::parse(fields[2], 1, 31)?,
            month: Field::parse(fields[3], 1, 12)?,
            day_of_week: Field::parse(fields[4], 0, 6)?,
        })
    }

    /// The next matching minute strictly after `after`, scanning forward up
    /// to two years before giving up.
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let mut candidate = after
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(after)
            + Duration::minutes(1);

        let limit = after + Duration::days(366 * 2);
        while candidate < limit {
            if self.month.matches(candidate.month())
                && self.day_of_month.matches(candidate.day())
                && self.day_of_week.matches(candidate.weekday().num_days_from_sunday())
                && self.hour.matches(candidate.hour())
                && self.minute.matches(candidate.minute())
            {
                return Ok(candidate);
            }
            candidate += Duration::minutes(1);
        }

        Err(Error::Parse(format!(
            "no matching time found for cron expression within two years of {after}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn every_minute() {
        let spec = CronSpec::parse("* * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 10, 30, 15).unwrap();
        let next = spec.next_after(now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 10, 31, 0).unwrap());
    }

    #[test]
    fn specific_hour_and_minute() {
        let spec = CronSpec::parse("0 9 * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let next = spec.next_after(now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(CronSpec::parse("* * *").is_err());
    }

    #[test]
    fn rejects_out_of_range_value() {
        assert!(CronSpec::parse("60 * * * *").is_err());
    }
}
