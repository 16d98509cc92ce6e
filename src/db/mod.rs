//! Persistence module split across logical submodules: one SQLite file for
//! credentials, one for loan records.

mod connection;
mod loans;
mod users;

pub use connection::{ensure_loan_schema, ensure_user_schema, open_loan_store, open_user_store};
pub use loans::{
    count_loans, delete_loan, fetch_loan, fetch_loans, insert_loan, next_loan_id,
    CREATED_AT_FORMAT,
};
pub use users::{authenticate, hash_password, register_user};
