//! Transport-layer types shared between the service crate and the API
//! layer: pagination requests and the page envelope every listing
//! endpoint returns.

mod page;

pub use page::{Page, PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};
