mod address_allow_list;

pub use address_allow_list::{AddressAllowList, AddressParseError, AllowedAddress, YOOKASSA_NOTIFICATION_SOURCES};
