/// quick start - minimal example to get started
use chrono::NaiveDate;
use emi_servicing_rs::portal::{LoanPortal, RegistrationRequest};
use emi_servicing_rs::store::{MemoryBlobStore, MemoryIdentity, MemoryStore};
use emi_servicing_rs::{Money, PortalConfig, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);

    let mut portal = LoanPortal::new(
        PortalConfig::standard(),
        MemoryStore::new(),
        MemoryBlobStore::new(),
        MemoryIdentity::new(),
    );

    // register a Rs 10,000 loan over 12 months
    let outcome = portal.register(
        RegistrationRequest {
            email: "ravi@example.com".to_string(),
            password: "secret".to_string(),
            first_name: "Ravi".to_string(),
            last_name: "Kumar".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
            mobile: "9876543210".to_string(),
            gender: None,
            photo: None,
            principal: Money::from_major(10_000),
            term_months: 12,
            documents: Vec::new(),
        },
        &time,
    )?;
    println!("registered customer {}", outcome.customer_id);

    // reconcile the first EMI
    let receipt = portal.pay_installment(
        outcome.uid,
        1,
        Money::from_major(1_135),
        "TXN-0001",
        &time,
    )?;
    println!("month {} paid, next due {:?}", receipt.month, receipt.next_due_date);

    // print current state
    println!("{}", portal.account_view(outcome.uid)?.to_json_pretty()?);

    Ok(())
}
