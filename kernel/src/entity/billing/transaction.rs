use error_stack::Report;
use time::{Date, Month};
use vodca::{AsRefln, Fromln};

use crate::KernelError;

/// Identifier returned by the bank transfer service for an executed
/// withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct WithdrawalDate(Date);

impl WithdrawalDate {
    const INVALID_FORMAT: &'static str = "invalid withdrawal date format";

    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }

    /// Parses `YYYY-MM-DD`.
    pub fn parse(value: &str) -> error_stack::Result<Self, KernelError> {
        let invalid = || Report::new(KernelError::Validation(Self::INVALID_FORMAT));

        let mut parts = value.split('-');
        let (year, month, day) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(year), Some(month), Some(day), None) => (year, month, day),
            _ => return Err(invalid()),
        };
        if year.len() != 4
            || month.len() != 2
            || day.len() != 2
            || ![year, month, day]
                .iter()
                .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u8>().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;
        let day = day.parse::<u8>().map_err(|_| invalid())?;
        let date = Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;
        Ok(Self(date))
    }
}

#[cfg(test)]
mod test {
    use super::WithdrawalDate;
    use crate::KernelError;

    #[test]
    fn parses_calendar_date() {
        let date = WithdrawalDate::parse("2024-02-29").unwrap();
        assert_eq!(date.as_ref().day(), 29);
    }

    #[test]
    fn rejects_malformed_date() {
        for input in ["2024-02-30", "2024-2-9", "tomorrow", "2024-02", ""] {
            let report = WithdrawalDate::parse(input).unwrap_err();
            assert!(matches!(
                report.current_context(),
                KernelError::Validation(_)
            ));
        }
    }
}
