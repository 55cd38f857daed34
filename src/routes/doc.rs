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
        auth::{
            AccessToken, CustomerLoginRequest, EmployeeLoginRequest, RefreshTokenRequest,
            RegisterCustomerRequest, TokenPair,
        },
        categories::{CategoryList, CategoryRequest},
        employees::{EmployeeList, RegisterEmployeeRequest, RegisteredEmployee, UpdateEmployeeRequest},
        orders::{LineItemRequest, OrderList, PlaceOrderRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    entity::{employees::EmployeeRole, orders::OrderStatus},
    models::{Customer, Employee, LineItem, Order, Product, ProductCategory, Role},
    response::{ApiResponse, Meta, ResponseStatus},
    routes::{categories, customers, employees, health, orders, products},
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
        customers::register,
        customers::login,
        customers::refresh_token,
        customers::logout,
        customers::profile,
        employees::list_employees,
        employees::list_deleted,
        employees::profile,
        employees::register,
        employees::login,
        employees::refresh_token,
        employees::logout,
        employees::update_profile,
        employees::delete_employee,
        employees::restore_employee,
        products::list_products,
        products::list_deleted,
        products::get_by_slug,
        products::get_for_edit,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::restore_product,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        orders::place_order,
        orders::list_customer_orders,
        orders::list_manager_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::confirm_order,
        orders::pay_order,
        orders::ship_order,
        orders::complete_order,
        orders::cancel_order
    ),
    components(
        schemas(
            Role,
            EmployeeRole,
            OrderStatus,
            Customer,
            Employee,
            Product,
            ProductCategory,
            LineItem,
            Order,
            RegisterCustomerRequest,
            CustomerLoginRequest,
            EmployeeLoginRequest,
            RefreshTokenRequest,
            TokenPair,
            AccessToken,
            RegisterEmployeeRequest,
            UpdateEmployeeRequest,
            RegisteredEmployee,
            EmployeeList,
            CategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            LineItemRequest,
            PlaceOrderRequest,
            OrderList,
            ResponseStatus,
            Meta,
            ApiResponse<Customer>,
            ApiResponse<Employee>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Customers", description = "Customer accounts and sessions"),
        (name = "Employees", description = "Employee accounts and sessions"),
        (name = "Products", description = "Product catalog"),
        (name = "Categories", description = "Product categories"),
        (name = "Orders", description = "Orders and their status transitions"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
