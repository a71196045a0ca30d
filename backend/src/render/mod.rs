mod caption;
mod page;
mod table;
pub use caption::*;
pub use page::*;
