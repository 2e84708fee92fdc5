//! Event bus subscribers for commerce lifecycle events.

mod cart;
mod product_variant;
mod subscription;

pub use cart::{CartSubscriber, CART_CUSTOMER_UPDATED};
pub use product_variant::{
    ProductVariantSubscriber, PRODUCT_VARIANT_CREATED, PRODUCT_VARIANT_DELETED,
    PRODUCT_VARIANT_UPDATED,
};
pub use subscription::SubscriptionSubscriber;
