/// time control - deterministic schedules with controlled time
use chrono::{NaiveDate, TimeZone, Utc};
use emi_servicing_rs::portal::{LoanPortal, RegistrationRequest};
use emi_servicing_rs::store::{MemoryBlobStore, MemoryIdentity, MemoryStore};
use emi_servicing_rs::{Money, PortalConfig, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // fix "today" so the schedule is reproducible
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap(),
    ));
    println!("registration date: {}", time.now().format("%Y-%m-%d"));

    let mut portal = LoanPortal::new(
        PortalConfig::standard(),
        MemoryStore::new(),
        MemoryBlobStore::new(),
        MemoryIdentity::new(),
    );

    let outcome = portal.register(
        RegistrationRequest {
            email: "asha@example.com".to_string(),
            password: "secret".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Nair".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1992, 1, 30).unwrap(),
            mobile: "9000000001".to_string(),
            gender: None,
            photo: None,
            principal: Money::from_major(50_000),
            term_months: 24,
            documents: Vec::new(),
        },
        &time,
    )?;

    // first registration lands in bucket A: every due date on the 2nd
    for installment in portal.installments(outcome.uid)? {
        println!(
            "month {:>2}  due {}  EMI {}",
            installment.month,
            installment.due_date.format("%Y-%m-%d"),
            installment.amount,
        );
    }

    Ok(())
}
