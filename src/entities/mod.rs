pub mod book;
pub mod book_category;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod order;
pub mod order_item;
pub mod user;
pub mod user_role;
