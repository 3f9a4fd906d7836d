//! Customers (parties) module.
//!
//! Pure domain logic only: validation, normalization and the phone-based correlation
//! key that links memos, payments and cash entries back to a customer.

pub mod customer;

pub use customer::{
    Customer, CustomerDetails, CustomerKey, CUSTOMER_PHONE_FIELD, find_customer_correlation_key,
    is_valid_phone,
};
