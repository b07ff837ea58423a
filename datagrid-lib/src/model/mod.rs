//! Record model: dynamic values, records and row identity.

mod record;
mod row_key;
mod value;

pub use record::Record;
pub use row_key::{KeyFn, RowKey};
pub use value::Value;
