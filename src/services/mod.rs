//! Application services: the flows behind each page and form.

pub mod blog;
pub mod catalog;
pub mod checkout;
pub mod media;
pub mod orders;

pub use blog::BlogService;
pub use catalog::{CatalogService, CreatedProduct, SlotReport, UploadSlot};
pub use checkout::{CheckoutProduct, CheckoutReceipt, CheckoutRequest, CheckoutService, CheckoutStep, PriceCheck};
pub use media::{MediaItem, MediaService, MediaStep};
pub use orders::{Dashboard, OrderService};
