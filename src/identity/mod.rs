// Identity module - account and contract addresses

mod address;

pub use address::{Address, AddressError, ADDRESS_LEN};
