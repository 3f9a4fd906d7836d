use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use tillbook_core::{CustomerId, DomainError, Record, RecordId};
use tillbook_parties::{CUSTOMER_PHONE_FIELD, Customer, CustomerDetails, find_customer_correlation_key};

use crate::error::ServiceError;
use crate::store::codec::{self, fields};
use crate::store::{Collection, RecordStore};

/// Customer register: create, edit, delete-with-guard, lookup.
pub struct CustomerService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn register(
        &self,
        name: &str,
        phone: &str,
        address: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CustomerId, ServiceError> {
        let details = CustomerDetails::normalize(name, phone, address)?;
        self.ensure_phone_free(&details.phone, None)?;

        let customer = Customer::register(details, now);
        let id: CustomerId = codec::insert_doc(&self.store, &customer)?;
        info!(customer_id = %id, phone = %customer.phone, "customer registered");
        Ok(id)
    }

    /// Replace name, phone and address. Other fields are left as stored.
    pub fn update(
        &self,
        id: &CustomerId,
        name: &str,
        phone: &str,
        address: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Customer, ServiceError> {
        let details = CustomerDetails::normalize(name, phone, address)?;
        let mut customer = self.load(id)?;
        self.ensure_phone_free(&details.phone, Some(id))?;

        customer.apply_details(details, now);
        self.store.update_partial(
            Collection::Customers,
            &RecordId::from(id),
            fields([
                ("name", json!(customer.name)),
                ("phone", json!(customer.phone)),
                ("address", json!(customer.address)),
                ("updatedAt", codec::encode_value(Collection::Customers, &customer.updated_at)?),
            ]),
        )?;
        info!(customer_id = %id, "customer updated");
        Ok(customer)
    }

    /// Delete a customer that no memo refers to.
    pub fn delete(&self, id: &CustomerId) -> Result<(), ServiceError> {
        let customer = self.load(id)?;
        let memos = self.store.query_by_equality(
            Collection::Memos,
            CUSTOMER_PHONE_FIELD,
            &json!(customer.correlation_key().as_str()),
        )?;
        if !memos.is_empty() {
            warn!(customer_id = %id, memos = memos.len(), "refusing to delete customer with memos");
            return Err(DomainError::conflict(format!(
                "customer {} has {} memo(s) and cannot be deleted",
                customer.phone,
                memos.len()
            ))
            .into());
        }

        self.store.remove(Collection::Customers, &RecordId::from(id))?;
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    /// Look up a customer for form prefill. No match is `Ok(None)`.
    pub fn find_by_phone(&self, phone: &str) -> Result<Option<Record<CustomerId, Customer>>, ServiceError> {
        let Some(key) = find_customer_correlation_key(phone) else {
            return Ok(None);
        };
        let mut hits: Vec<Record<CustomerId, Customer>> =
            codec::query_docs(&self.store, "phone", &json!(key.as_str()))?;
        Ok(if hits.is_empty() { None } else { Some(hits.remove(0)) })
    }

    /// All customers, newest first.
    pub fn list(&self) -> Result<Vec<Record<CustomerId, Customer>>, ServiceError> {
        let mut customers: Vec<Record<CustomerId, Customer>> = codec::load_all(&self.store)?;
        customers.sort_by(|a, b| {
            b.data
                .created_at
                .cmp(&a.data.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(customers)
    }

    fn load(&self, id: &CustomerId) -> Result<Customer, ServiceError> {
        codec::load_doc(&self.store, id)?
            .ok_or_else(|| DomainError::not_found("customer", id.to_string()).into())
    }

    fn ensure_phone_free(&self, phone: &str, except: Option<&CustomerId>) -> Result<(), ServiceError> {
        let taken = self
            .store
            .query_by_equality(Collection::Customers, "phone", &json!(phone))?
            .into_keys()
            .any(|key| except.is_none_or(|own| RecordId::from(own) != key));
        if taken {
            return Err(DomainError::conflict(format!("phone {phone} is already registered")).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use tillbook_core::{DateKey, ProductId};
    use tillbook_products::Product;
    use tillbook_sales::{SaleInput, SaleLine};

    use crate::services::SaleService;
    use crate::store::InMemoryRecordStore;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryRecordStore>, CustomerService<Arc<InMemoryRecordStore>>) {
        let store = Arc::new(InMemoryRecordStore::new());
        let service = CustomerService::new(store.clone());
        (store, service)
    }

    #[test]
    fn register_normalizes_and_stores() {
        let (_, service) = setup();
        let id = service
            .register(" Rahim Uddin ", "+8801711000000", Some("Dhaka"), test_time())
            .unwrap();

        let found = service.find_by_phone("+8801711000000").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.data.name, "rahim uddin");
        assert_eq!(found.data.address, "Dhaka");
    }

    #[test]
    fn register_rejects_bad_phone_and_duplicates() {
        let (_, service) = setup();
        let err = service.register("karim", "017-11", None, test_time()).unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        service.register("karim", "8801711000000", None, test_time()).unwrap();
        let err = service
            .register("someone else", "8801711000000", None, test_time())
            .unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn find_by_phone_absent_is_none_not_error() {
        let (_, service) = setup();
        assert!(service.find_by_phone("8801711999999").unwrap().is_none());
        assert!(service.find_by_phone("   ").unwrap().is_none());
    }

    #[test]
    fn update_touches_editable_fields_and_updated_at() {
        let (store, service) = setup();
        let id = service.register("karim", "8801711000000", None, test_time()).unwrap();
        let later = test_time() + Duration::hours(3);

        let updated = service
            .update(&id, "Karim Mia", "8801711000000", Some("Khulna"), later)
            .unwrap();
        assert_eq!(updated.name, "karim mia");
        assert_eq!(updated.updated_at, later);

        let stored: Customer = codec::load_doc(&store, &id).unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.created_at, test_time());
    }

    #[test]
    fn update_may_keep_own_phone_but_not_take_another() {
        let (_, service) = setup();
        let a = service.register("a", "8801711000001", None, test_time()).unwrap();
        service.register("b", "8801711000002", None, test_time()).unwrap();

        assert!(service.update(&a, "a", "8801711000001", None, test_time()).is_ok());
        let err = service
            .update(&a, "a", "8801711000002", None, test_time())
            .unwrap_err();
        assert_eq!(err.kind(), "conflict");

        let ghost: CustomerId = "ghost".parse().unwrap();
        let err = service.update(&ghost, "x", "8801711000009", None, test_time()).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn delete_is_refused_while_memos_reference_the_phone() {
        let (store, service) = setup();
        let id = service.register("karim", "8801711000000", None, test_time()).unwrap();
        let product: ProductId =
            codec::insert_doc(&store, &Product::create("Rice", dec!(10), 5, test_time()).unwrap()).unwrap();
        SaleService::new(store.clone())
            .create_memo(
                SaleInput {
                    memo_number: "M-1".into(),
                    date: DateKey::from_datetime(test_time()),
                    customer_name: "karim".into(),
                    customer_phone: "8801711000000".into(),
                    customer_address: String::new(),
                    lines: vec![SaleLine {
                        product_id: product,
                        quantity: 1,
                        unit_price: None,
                    }],
                    payment_amount: dec!(0),
                },
                test_time(),
            )
            .unwrap();

        let err = service.delete(&id).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert!(service.find_by_phone("8801711000000").unwrap().is_some());
    }

    #[test]
    fn delete_without_memos_removes_customer() {
        let (_, service) = setup();
        let id = service.register("karim", "8801711000000", None, test_time()).unwrap();
        service.delete(&id).unwrap();
        assert!(service.list().unwrap().is_empty());
        assert_eq!(service.delete(&id).unwrap_err().kind(), "not_found");
    }

    #[test]
    fn list_is_newest_first() {
        let (_, service) = setup();
        service.register("old", "8801711000001", None, test_time()).unwrap();
        service
            .register("new", "8801711000002", None, test_time() + Duration::days(1))
            .unwrap();
        let names: Vec<String> = service.list().unwrap().into_iter().map(|r| r.data.name).collect();
        assert_eq!(names, ["new", "old"]);
    }
}
