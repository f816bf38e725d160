pub mod books;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod users;

pub use books::BookService;
pub use carts::CartService;
pub use categories::CategoryService;
pub use orders::OrderService;
pub use users::UserService;
