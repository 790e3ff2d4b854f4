pub mod list_libraries;
pub mod reload;
pub mod search;

pub use list_libraries::*;
pub use reload::*;
pub use search::*;
