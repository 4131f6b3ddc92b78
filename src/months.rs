use chrono::{Datelike, NaiveDate};

/// First day of the month `offset` months after the month of `date`.
pub fn month_start(date: NaiveDate, offset: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + offset;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.map(|d| month_start(d, 1));
    match (first, next) {
        (Some(a), Some(b)) => (b - a).num_days() as u32,
        _ => 30,
    }
}

/// `day` of the month containing `month`, clamped to the month's last day
/// (a due day of 31 lands on Feb 28/29).
pub fn clamp_day(month: NaiveDate, day: u32) -> NaiveDate {
    let last = days_in_month(month.year(), month.month());
    let day = day.clamp(1, last);
    NaiveDate::from_ymd_opt(month.year(), month.month(), day).unwrap_or(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_start_rolls_years() {
        assert_eq!(month_start(d(2024, 12, 15), 1), d(2025, 1, 1));
        assert_eq!(month_start(d(2024, 1, 31), -1), d(2023, 12, 1));
        assert_eq!(month_start(d(2024, 3, 10), 0), d(2024, 3, 1));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_clamp_day() {
        assert_eq!(clamp_day(d(2023, 2, 1), 31), d(2023, 2, 28));
        assert_eq!(clamp_day(d(2024, 4, 1), 31), d(2024, 4, 30));
        assert_eq!(clamp_day(d(2024, 5, 20), 10), d(2024, 5, 10));
    }
}
