pub mod footer;
pub mod header;
pub mod utils;

pub use footer::draw_footer;
pub use header::{display_host, draw_header, HeaderInfo};
pub use utils::{field, page_count, rating_color, stock_color, truncate};
