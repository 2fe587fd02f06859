// Client-role endpoints under /api/inquiry

pub mod inquiry;
pub mod review;

pub use inquiry::{inquiry_delete, inquiry_get, inquiry_list, inquiry_post, inquiry_put};
pub use review::review_post;
