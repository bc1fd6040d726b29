pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{PaymentMethod, PaymentTransaction, TransactionKind};
pub use requests::{
    CreateTransactionRequest, FinanceRangeQuery, NewTransaction, TransactionFilter,
    TransactionQueryParams,
};
pub use responses::{DailyTotal, FinanceSummary, MethodTotal};
