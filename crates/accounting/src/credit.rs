//! Per-customer credit.
//!
//! Money reaches a customer's account two ways: the payment given at sale time
//! (`paymentAmount` on each memo) and later [`CustomerPayment`]s. Both reduce what the
//! customer owes and neither may be counted twice.

use rust_decimal::Decimal;

use tillbook_sales::Memo;

use crate::payment::CustomerPayment;

/// `total_purchases - (total_payments + total_given)`.
///
/// Negative when the customer has paid more than they bought.
pub fn outstanding_credit(
    total_purchases: Decimal,
    total_payments: Decimal,
    total_given: Decimal,
) -> Decimal {
    total_purchases - (total_payments + total_given)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerAggregates {
    /// Sum of memo bills.
    pub total_purchases: Decimal,
    /// Sum of money given at sale time.
    pub total_given_money: Decimal,
    /// Sum of separate customer payments.
    pub total_payments: Decimal,
    pub outstanding_credit: Decimal,
    /// Everything received from the customer: given money plus separate payments.
    pub total_received: Decimal,
    pub memo_count: usize,
    /// Mean bill per memo, zero without memos.
    pub average_purchase: Decimal,
}

/// Fold one customer's memos and payments into their aggregates.
///
/// Callers select the records with the customer's correlation key first; this
/// function does not filter.
pub fn customer_aggregates<'m, 'p, M, P>(memos: M, payments: P) -> CustomerAggregates
where
    M: IntoIterator<Item = &'m Memo>,
    P: IntoIterator<Item = &'p CustomerPayment>,
{
    let mut agg = CustomerAggregates::default();
    for memo in memos {
        agg.total_purchases += memo.total_bill;
        agg.total_given_money += memo.payment_amount;
        agg.memo_count += 1;
    }
    agg.total_payments = payments.into_iter().map(|p| p.amount).sum();
    agg.outstanding_credit = outstanding_credit(
        agg.total_purchases,
        agg.total_payments,
        agg.total_given_money,
    );
    agg.total_received = agg.total_given_money + agg.total_payments;
    if agg.memo_count > 0 {
        agg.average_purchase = agg.total_purchases / Decimal::from(agg.memo_count);
    }
    agg
}
