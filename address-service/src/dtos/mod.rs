pub mod addresses;

pub use addresses::{
    AddressCreatedResponse, AddressListResponse, AddressResponse, AddressUpdatedResponse,
    CreateAddressRequest, ListAddressParams, UpdateAddressRequest,
};
