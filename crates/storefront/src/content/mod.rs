//! Read model for store content: blog posts, categories, products and the
//! promotional banner.
//!
//! Each service wraps one repository. Reads pass straight through; writes
//! stamp timestamps with the current time before handing the row to the
//! store. A missing row is `None`, never an error.

mod blog;
mod catalog;

pub use blog::BlogService;
pub use catalog::{BannerService, CategoryService, ProductService};
