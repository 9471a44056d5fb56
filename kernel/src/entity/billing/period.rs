use std::fmt::Display;

use error_stack::Report;
use time::{Date, Month};

use crate::KernelError;

/// Calendar month over which usage is aggregated, parsed from `YYYY-MM`.
/// Activity selection uses the half-open range
/// `[first_day, next_first_day)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BillingPeriod {
    first_day: Date,
    next_first_day: Date,
}

impl BillingPeriod {
    const INVALID_FORMAT: &'static str = "invalid billing month format";

    pub fn parse(value: &str) -> error_stack::Result<Self, KernelError> {
        let invalid = || Report::new(KernelError::Validation(Self::INVALID_FORMAT));

        let (year, month) = value.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u8>().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Self::compose(year, month).ok_or_else(invalid)
    }

    /// Period the given date falls in.
    pub fn from_date(date: Date) -> error_stack::Result<Self, KernelError> {
        Self::compose(date.year(), date.month())
            .ok_or_else(|| Report::new(KernelError::Internal))
    }

    fn compose(year: i32, month: Month) -> Option<Self> {
        let first_day = Date::from_calendar_date(year, month, 1).ok()?;
        let (next_year, next_month) = match month {
            Month::December => (year + 1, Month::January),
            _ => (year, month.next()),
        };
        let next_first_day = Date::from_calendar_date(next_year, next_month, 1).ok()?;
        Some(Self {
            first_day,
            next_first_day,
        })
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> Month {
        self.first_day.month()
    }

    pub fn first_day(&self) -> Date {
        self.first_day
    }

    pub fn next_first_day(&self) -> Date {
        self.next_first_day
    }

    /// `YYYYMM` form embedded in invoice numbers.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}", self.year(), u8::from(self.month()))
    }
}

impl Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), u8::from(self.month()))
    }
}

#[cfg(test)]
mod test {
    use time::Month;

    use super::BillingPeriod;
    use crate::KernelError;

    #[test]
    fn parses_valid_month() {
        let period = BillingPeriod::parse("2024-01").unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), Month::January);
        assert_eq!(period.compact(), "202401");
        assert_eq!(period.to_string(), "2024-01");
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let period = BillingPeriod::parse("2023-12").unwrap();
        assert_eq!(period.next_first_day().year(), 2024);
        assert_eq!(period.next_first_day().month(), Month::January);
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["invalid-date", "2024-13", "2024-00", "202401", "24-01", "2024-+1", ""] {
            let report = BillingPeriod::parse(input).unwrap_err();
            assert!(
                matches!(report.current_context(), KernelError::Validation(_)),
                "{input} should be rejected as validation error"
            );
        }
    }

    #[test]
    fn range_is_half_open_over_the_calendar_month() {
        let period = BillingPeriod::parse("2024-02").unwrap();
        assert_eq!(period.first_day().day(), 1);
        assert_eq!(period.next_first_day().month(), Month::March);
    }
}
