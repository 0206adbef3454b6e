pub mod ip_extraction;

pub use ip_extraction::{extract_client_ip, ClientAddr, UNKNOWN_CLIENT};
