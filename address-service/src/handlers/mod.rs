pub mod addresses;
pub mod health;

pub use addresses::{create_address, delete_address, list_addresses, update_address};
pub use health::health_check;
