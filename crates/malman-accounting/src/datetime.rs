use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// Get the current local date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Align a date to the first day of its month.
pub trait AlignStart {
    fn align_start(&self) -> Self;
}

impl AlignStart for NaiveDate {
    fn align_start(&self) -> Self {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1).unwrap_or(*self)
    }
}

/// Align a date to the last day of its month. None when
/// the month is out of the representable range.
pub trait AlignEnd: Sized {
    fn align_end(&self) -> Option<Self>;
}

impl AlignEnd for NaiveDate {
    fn align_end(&self) -> Option<Self> {
        self.align_start()
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_align_start() {
        assert_eq!(date(2023, 5, 17).align_start(), date(2023, 5, 1));
        assert_eq!(date(2023, 5, 1).align_start(), date(2023, 5, 1));
    }

    #[test]
    fn test_align_end() {
        assert_eq!(date(2024, 2, 10).align_end(), Some(date(2024, 2, 29)));
        assert_eq!(date(2023, 2, 10).align_end(), Some(date(2023, 2, 28)));
        assert_eq!(date(2023, 12, 31).align_end(), Some(date(2023, 12, 31)));
    }
}
