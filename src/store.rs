use std::collections::HashMap;
use std::sync::RwLock;

use crate::account::AccountRecord;
use crate::errors::{PortalError, Result};
use crate::types::AccountId;

/// a stored value plus its commit version
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// structured remote store boundary
///
/// One versioned document per account. `commit` is a compare-and-swap on the
/// version loaded alongside the record; the store never merges, so every
/// read-modify-write either applies wholly or fails with a conflict.
pub trait PortalStore {
    /// create the account record, failing if one already exists
    fn create(&self, uid: AccountId, record: AccountRecord) -> Result<()>;

    /// load the record with its current version
    fn load(&self, uid: AccountId) -> Result<Versioned<AccountRecord>>;

    /// conditional write: applies only if the version still matches
    fn commit(&self, uid: AccountId, expected_version: u64, record: AccountRecord) -> Result<u64>;

    /// number of registered accounts, used for position assignment
    fn count(&self) -> Result<usize>;

    /// whether any account already carries this customer id
    fn customer_id_taken(&self, customer_id: &str) -> Result<bool>;

    fn find_by_email(&self, email: &str) -> Result<Option<AccountId>>;

    fn find_by_customer_id(&self, customer_id: &str) -> Result<Option<AccountId>>;
}

/// document/blob store boundary: upload a named byte stream, get a URL back
pub trait BlobStore {
    fn put(&self, path: &str, bytes: &[u8]) -> Result<String>;
}

/// identity/authentication provider boundary
pub trait IdentityProvider {
    /// register credentials for a new account
    fn create_credentials(&self, email: &str, password: &str) -> Result<()>;

    /// verify credentials, failing with `InvalidCredentials`
    fn authenticate(&self, email: &str, password: &str) -> Result<()>;

    fn update_password(&self, email: &str, new_password: &str) -> Result<()>;

    /// invalidate any provider-side session state
    fn invalidate_session(&self, email: &str) -> Result<()>;
}

/// in-memory versioned store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<AccountId, Versioned<AccountRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortalStore for MemoryStore {
    fn create(&self, uid: AccountId, record: AccountRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PortalError::storage("account store lock poisoned"))?;
        if records.contains_key(&uid) {
            return Err(PortalError::AccountAlreadyExists { uid });
        }
        records.insert(uid, Versioned { version: 1, value: record });
        Ok(())
    }

    fn load(&self, uid: AccountId) -> Result<Versioned<AccountRecord>> {
        self.records
            .read()
            .map_err(|_| PortalError::storage("account store lock poisoned"))?
            .get(&uid)
            .cloned()
            .ok_or(PortalError::AccountNotFound { uid })
    }

    fn commit(&self, uid: AccountId, expected_version: u64, record: AccountRecord) -> Result<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PortalError::storage("account store lock poisoned"))?;
        let current = records
            .get_mut(&uid)
            .ok_or(PortalError::AccountNotFound { uid })?;

        if current.version != expected_version {
            return Err(PortalError::VersionConflict {
                expected: expected_version,
                found: current.version,
            });
        }

        current.version += 1;
        current.value = record;
        Ok(current.version)
    }

    fn count(&self) -> Result<usize> {
        Ok(self
            .records
            .read()
            .map_err(|_| PortalError::storage("account store lock poisoned"))?
            .len())
    }

    fn customer_id_taken(&self, customer_id: &str) -> Result<bool> {
        Ok(self
            .records
            .read()
            .map_err(|_| PortalError::storage("account store lock poisoned"))?
            .values()
            .any(|v| v.value.account.customer_id == customer_id))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<AccountId>> {
        Ok(self
            .records
            .read()
            .map_err(|_| PortalError::storage("account store lock poisoned"))?
            .values()
            .find(|v| v.value.account.email == email)
            .map(|v| v.value.account.uid))
    }

    fn find_by_customer_id(&self, customer_id: &str) -> Result<Option<AccountId>> {
        Ok(self
            .records
            .read()
            .map_err(|_| PortalError::storage("account store lock poisoned"))?
            .values()
            .find(|v| v.value.account.customer_id == customer_id)
            .map(|v| v.value.account.uid))
    }
}

/// in-memory blob store returning `memory://` urls
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, path: &str, bytes: &[u8]) -> Result<String> {
        self.blobs
            .write()
            .map_err(|_| PortalError::upload("blob store lock poisoned"))?
            .insert(path.to_string(), bytes.to_vec());
        Ok(format!("memory://{}", path))
    }
}

/// in-memory identity provider for tests
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    credentials: RwLock<HashMap<String, String>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityProvider for MemoryIdentity {
    fn create_credentials(&self, email: &str, password: &str) -> Result<()> {
        let mut credentials = self
            .credentials
            .write()
            .map_err(|_| PortalError::storage("identity lock poisoned"))?;
        if credentials.contains_key(email) {
            return Err(PortalError::CredentialsAlreadyExist {
                email: email.to_string(),
            });
        }
        credentials.insert(email.to_string(), password.to_string());
        Ok(())
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<()> {
        let credentials = self
            .credentials
            .read()
            .map_err(|_| PortalError::storage("identity lock poisoned"))?;
        match credentials.get(email) {
            Some(stored) if stored == password => Ok(()),
            _ => Err(PortalError::InvalidCredentials),
        }
    }

    fn update_password(&self, email: &str, new_password: &str) -> Result<()> {
        let mut credentials = self
            .credentials
            .write()
            .map_err(|_| PortalError::storage("identity lock poisoned"))?;
        match credentials.get_mut(email) {
            Some(stored) => {
                *stored = new_password.to_string();
                Ok(())
            }
            None => Err(PortalError::InvalidCredentials),
        }
    }

    fn invalidate_session(&self, _email: &str) -> Result<()> {
        // the in-memory provider keeps no session state
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::decimal::Money;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn record(uid: AccountId, customer_id: &str, email: &str) -> AccountRecord {
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap();
        AccountRecord::new(
            Account {
                uid,
                customer_id: customer_id.to_string(),
                first_name: "Ravi".to_string(),
                last_name: "Kumar".to_string(),
                email: email.to_string(),
                mobile: "9876543210".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
                gender: None,
                photo_url: None,
                loan_type: 'E',
                principal: Money::from_major(10_000),
                term_months: 12,
                position: 1,
                total_months_paid: 0,
                total_amount_paid: Money::ZERO,
                paid_months: Vec::new(),
                next_due_date: None,
                customer_document_uploaded: false,
                guarantor_document_uploaded: false,
                logged_in: false,
                created_at: now,
                updated_at: now,
            },
            Vec::new(),
        )
    }

    #[test]
    fn test_create_is_exclusive() {
        let store = MemoryStore::new();
        let uid = Uuid::new_v4();

        store.create(uid, record(uid, "E1225RKA", "a@x.com")).unwrap();
        let err = store.create(uid, record(uid, "E1225RKA", "a@x.com")).unwrap_err();
        assert!(matches!(err, PortalError::AccountAlreadyExists { .. }));
    }

    #[test]
    fn test_commit_requires_matching_version() {
        let store = MemoryStore::new();
        let uid = Uuid::new_v4();
        store.create(uid, record(uid, "E1225RKA", "a@x.com")).unwrap();

        let loaded = store.load(uid).unwrap();
        assert_eq!(loaded.version, 1);

        let next = store.commit(uid, loaded.version, loaded.value.clone()).unwrap();
        assert_eq!(next, 2);

        // stale version loses the race
        let err = store.commit(uid, loaded.version, loaded.value).unwrap_err();
        assert!(matches!(
            err,
            PortalError::VersionConflict { expected: 1, found: 2 }
        ));
    }

    #[test]
    fn test_lookups() {
        let store = MemoryStore::new();
        let uid = Uuid::new_v4();
        store.create(uid, record(uid, "E1225RKA", "a@x.com")).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert!(store.customer_id_taken("E1225RKA").unwrap());
        assert!(!store.customer_id_taken("Y2426ABJ").unwrap());
        assert_eq!(store.find_by_email("a@x.com").unwrap(), Some(uid));
        assert_eq!(store.find_by_customer_id("E1225RKA").unwrap(), Some(uid));
        assert_eq!(store.find_by_email("b@x.com").unwrap(), None);
    }

    #[test]
    fn test_blob_store_returns_url() {
        let blobs = MemoryBlobStore::new();
        let url = blobs.put("documents/u1/customer/aadhaar.pdf", b"pdf").unwrap();
        assert_eq!(url, "memory://documents/u1/customer/aadhaar.pdf");
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn test_identity_roundtrip() {
        let identity = MemoryIdentity::new();
        identity.create_credentials("a@x.com", "secret").unwrap();

        // a second registration for the same email is a conflict
        let err = identity.create_credentials("a@x.com", "other").unwrap_err();
        assert!(matches!(err, PortalError::CredentialsAlreadyExist { .. }));
        assert!(err.is_conflict());

        identity.authenticate("a@x.com", "secret").unwrap();
        assert!(identity.authenticate("a@x.com", "wrong").is_err());

        identity.update_password("a@x.com", "newer").unwrap();
        identity.authenticate("a@x.com", "newer").unwrap();
        assert!(identity.authenticate("a@x.com", "secret").is_err());
    }
}
