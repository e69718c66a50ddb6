//! Value custodian abstraction.

mod mock;
mod traits;

pub use mock::MockCustodian;
pub use traits::{Custodian, CustodyError, Transfer};
