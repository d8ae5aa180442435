pub mod http;

pub use self::http::http_method;
