pub mod customers;
pub mod employees;
pub mod order_items;
pub mod orders;
pub mod product_categories;
pub mod products;

pub use customers::Entity as Customers;
pub use employees::Entity as Employees;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_categories::Entity as ProductCategories;
pub use products::Entity as Products;
