pub mod codec;
pub mod http;
pub mod merchants;
pub mod pending;
pub mod range_cache;
pub mod signature;
