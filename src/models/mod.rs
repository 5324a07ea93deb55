mod order;
mod product;
mod user;

pub use order::{
    NewOrder, NewOrderItem, Order, OrderItem, OrderLineRequest, OrderStatus, OrderWithItems,
    ShippingAddress, max_order_total, order_total, quantities_by_product,
};
pub use product::{
    NewProduct, NewReview, Product, Review, UpdateProduct, average_rating, max_price,
};
pub use user::{Address, NewAddress, NewUser, Role, User};
