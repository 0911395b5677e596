pub mod debounce;
pub mod price;

pub use debounce::Debounce;
pub use price::format_price;
