use chrono::{DateTime, Datelike, Months, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::{PositionBucket, RateTable};
use crate::decimal::Money;
use crate::errors::Result;
use crate::types::InstallmentStatus;

/// one monthly obligation
///
/// Exactly one installment exists per month index in `[1, term]`. Payment
/// fields stay empty until the installment is reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub month: u32,
    pub amount: Money,
    pub status: InstallmentStatus,
    pub due_date: DateTime<Utc>,
    pub category: char,
    pub paid_at: Option<DateTime<Utc>>,
    pub transaction_ref: Option<String>,
}

/// generate the full installment schedule for a new account
///
/// Validates the (principal, term) combination against the rate table and the
/// registration position against the bucket table before producing anything,
/// so a caller error never results in a partial write.
///
/// The base due date is "today" with the day-of-month forced to the bucket's
/// due-day; installment `i` is due `i` calendar months after the base.
pub fn generate_schedule(
    table: &RateTable,
    principal: Money,
    term_months: u32,
    position: u32,
    time: &SafeTimeProvider,
) -> Result<Vec<Installment>> {
    let tier = table.validate(principal, term_months)?;
    let bucket = PositionBucket::for_position(position)?;

    let base = force_due_day(time.now(), bucket.due_day);

    let mut installments = Vec::with_capacity(term_months as usize);
    for i in 0..term_months {
        installments.push(Installment {
            month: i + 1,
            amount: tier.monthly_emi,
            status: if i == 0 {
                InstallmentStatus::Pending
            } else {
                InstallmentStatus::Upcoming
            },
            due_date: add_months_clamped(base, i),
            category: bucket.category,
            paid_at: None,
            transaction_ref: None,
        });
    }

    Ok(installments)
}

/// force the day-of-month, clamping to the month's length
fn force_due_day(date: DateTime<Utc>, day: u32) -> DateTime<Utc> {
    let clamped = day.min(days_in_month(date.year(), date.month()));
    // clamped day always exists in the month
    date.with_day(clamped).unwrap_or(date)
}

/// add calendar months with day-of-month clamping
///
/// Uses the chrono `Months` rule: Jan 31 + 1 month = Feb 28 (29 in leap
/// years). Always added from the same base date, so a clamp in a short month
/// does not drift later due dates.
pub fn add_months_clamped(base: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    base.checked_add_months(Months::new(months)).unwrap_or(base)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn time_at(year: i32, month: u32, day: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_schedule_for_all_tiers() {
        let table = RateTable::standard();
        let time = time_at(2025, 3, 20);

        for tier in table.tiers() {
            let term = tier.allowed_terms[0];
            let schedule =
                generate_schedule(&table, tier.principal, term, 5, &time).unwrap();

            assert_eq!(schedule.len(), term as usize);
            assert_eq!(schedule[0].status, InstallmentStatus::Pending);
            for installment in &schedule {
                assert_eq!(installment.amount, tier.monthly_emi);
            }
            for installment in &schedule[1..] {
                assert_eq!(installment.status, InstallmentStatus::Upcoming);
            }
        }
    }

    #[test]
    fn test_due_dates_follow_bucket_day() {
        let table = RateTable::standard();
        let time = time_at(2025, 3, 20);

        // position 5 is bucket A, due-day 2
        let schedule =
            generate_schedule(&table, Money::from_major(10_000), 12, 5, &time).unwrap();

        for (i, installment) in schedule.iter().enumerate() {
            assert_eq!(installment.month, i as u32 + 1);
            assert_eq!(installment.due_date.day(), 2);
            assert_eq!(installment.category, 'A');
        }
        assert_eq!(schedule[0].due_date.month(), 3);
        assert_eq!(schedule[1].due_date.month(), 4);
        assert_eq!(schedule[11].due_date.month(), 2);
        assert_eq!(schedule[11].due_date.year(), 2026);
    }

    #[test]
    fn test_validation_happens_before_generation() {
        let table = RateTable::standard();
        let time = time_at(2025, 3, 20);

        assert!(generate_schedule(&table, Money::from_major(10_000), 24, 5, &time).is_err());
        assert!(generate_schedule(&table, Money::from_major(99_999), 12, 5, &time).is_err());
        assert!(generate_schedule(&table, Money::from_major(10_000), 12, 0, &time).is_err());
    }

    #[test]
    fn test_overflow_position_schedules() {
        let table = RateTable::standard();
        let time = time_at(2025, 3, 20);

        let schedule =
            generate_schedule(&table, Money::from_major(20_000), 12, 250, &time).unwrap();
        assert_eq!(schedule[0].category, 'X');
        assert_eq!(schedule[0].due_date.day(), 15);
    }

    #[test]
    fn test_month_addition_clamps_short_months() {
        let base = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            add_months_clamped(base, 1),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
        // added from the base, so march gets its 31st back
        assert_eq!(
            add_months_clamped(base, 2),
            Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_force_due_day_clamps() {
        let feb = Utc.with_ymd_and_hms(2025, 2, 20, 8, 0, 0).unwrap();
        assert_eq!(force_due_day(feb, 31).day(), 28);
        assert_eq!(force_due_day(feb, 10).day(), 10);
    }
}
