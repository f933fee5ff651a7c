use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, SessionUser},
        catalog::{CategoryList, CategoryRequest, ProductList, ProductRequest},
        floor_plan::{
            CreateTableRequest, FloorList, FloorRequest, StatusRequest, TableList,
            UpdateTableRequest,
        },
        kitchen::{ItemStatusChanged, ItemStatusRequest, KitchenItem, KitchenItemList},
        orders::{
            CompleteOrderRequest, CreateOrderRequest, CreatedOrder, OrderLineRequest,
            OrderStatusRequest, OrderWithItems, PendingLine, PendingOrderList, PendingOrderView,
            ProductRef, SoldProduct, StatusChange, TransactionList, TransactionView,
        },
        sales::{DailyPoint, DailyTrend, MonthlyComparison, MonthlyPoint, SalesMetrics, UserReport, UserSales},
        users::{RegisterRequest, UpdateUserRequest, UserList},
    },
    models::{
        Category, DiningTable, Floor, ItemStatus, Order, OrderItem, OrderStatus, Product, Role,
        TableStatus, User,
    },
    response::{Ack, ApiResponse, Meta},
    routes::{
        auth, categories, floors, health, kitchen, orders, params, products, sales, tables, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        products::list_products,
        products::list_low_stock,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        floors::list_floors,
        floors::create_floor,
        floors::update_floor,
        floors::delete_floor,
        tables::list_tables,
        tables::create_table,
        tables::update_table,
        tables::delete_table,
        tables::set_table_status,
        orders::create_order,
        orders::get_order,
        orders::list_transactions,
        orders::list_pending_orders,
        orders::update_order_status,
        orders::complete_order,
        kitchen::list_pending_items,
        kitchen::update_item_status,
        sales::sales_metrics,
        sales::daily_trend,
        sales::monthly_comparison,
        sales::user_report
    ),
    components(
        schemas(
            Role,
            TableStatus,
            OrderStatus,
            ItemStatus,
            User,
            Product,
            Category,
            Floor,
            DiningTable,
            Order,
            OrderItem,
            LoginRequest,
            LoginResponse,
            SessionUser,
            RegisterRequest,
            UpdateUserRequest,
            UserList,
            ProductRequest,
            ProductList,
            CategoryRequest,
            CategoryList,
            FloorRequest,
            FloorList,
            CreateTableRequest,
            UpdateTableRequest,
            StatusRequest,
            TableList,
            ProductRef,
            OrderLineRequest,
            CreateOrderRequest,
            CompleteOrderRequest,
            OrderStatusRequest,
            CreatedOrder,
            StatusChange,
            OrderWithItems,
            TransactionView,
            TransactionList,
            SoldProduct,
            PendingLine,
            PendingOrderView,
            PendingOrderList,
            KitchenItem,
            KitchenItemList,
            ItemStatusRequest,
            ItemStatusChanged,
            SalesMetrics,
            DailyPoint,
            DailyTrend,
            MonthlyPoint,
            MonthlyComparison,
            UserSales,
            UserReport,
            params::Pagination,
            Ack,
            Meta,
            ApiResponse<User>,
            ApiResponse<Product>,
            ApiResponse<CreatedOrder>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Sign-in and staff registration"),
        (name = "Users", description = "Staff accounts"),
        (name = "Products", description = "Menu items and stock"),
        (name = "Categories", description = "Menu categories"),
        (name = "Floor plan", description = "Floors and dining tables"),
        (name = "Orders", description = "Placing, tracking and paying orders"),
        (name = "Kitchen", description = "Per-item preparation status"),
        (name = "Sales", description = "Sales reports"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
