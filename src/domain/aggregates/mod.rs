//! Aggregates module
pub mod blog;
pub mod order;
pub mod product;
pub mod shipping;
pub mod upload;

pub use blog::{Blog, BlogError, NewBlog};
pub use order::{items_total, NewOrder, NewOrderItem, Order, OrderCounts, OrderError, OrderItem, OrderLine, OrderStatus, OrderWithLines};
pub use product::{NewProduct, Product, ProductError};
pub use shipping::{AddressUpsert, FieldErrors, ShippingAddress, ShippingForm};
pub use upload::{NewUpload, PendingFile, Upload};
