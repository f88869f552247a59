pub mod address;
pub mod credential;

pub use address::{Address, AddressPatch, AddressQuery, AddressType, State, DEFAULT_COUNTRY};
pub use credential::Credential;
