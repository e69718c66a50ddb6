//! RPS Custody Library
//!
//! The value-custodian seam of the RPS escrow:
//! - Ledger identities (Address, AssetId, TransferId)
//! - Custodian trait and MockCustodian

pub mod custody;
pub mod types;

pub use custody::{Custodian, CustodyError, MockCustodian, Transfer};
pub use types::{Address, AddressParseError, AssetId, TransferId, ADDRESS_LEN};
