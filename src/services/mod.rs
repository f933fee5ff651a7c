pub mod auth_service;
pub mod category_service;
pub mod floor_service;
pub mod kitchen_service;
pub mod order_service;
pub mod product_service;
pub mod sales_service;
pub mod table_service;
pub mod user_service;
