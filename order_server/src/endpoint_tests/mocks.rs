use mockall::mock;
use order_engine::{
    db_types::{
        CartContents,
        CartLine,
        NewProduct,
        Order,
        OrderId,
        OrderStatusType,
        OrderWithItems,
        Product,
        ProductId,
        UserId,
    },
    traits::{
        CartError,
        CartStore,
        CatalogError,
        CatalogManagement,
        CheckoutDatabase,
        CheckoutDatabaseError,
        OrderError,
        OrderManagement,
        PaymentGateway,
        PaymentGatewayError,
        PaymentRedirect,
        PlacedOrder,
        StatusTransition,
    },
};

mock! {
    pub ShopDb {}
    impl CatalogManagement for ShopDb {
        async fn fetch_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError>;
        async fn fetch_all_products(&self) -> Result<Vec<Product>, CatalogError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;
    }
    impl CheckoutDatabase for ShopDb {
        async fn place_order(&self, user_id: UserId, lines: &[CartLine]) -> Result<PlacedOrder, CheckoutDatabaseError>;
    }
    impl OrderManagement for ShopDb {
        async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError>;
        async fn fetch_order_for_user(&self, order_id: OrderId, user_id: UserId) -> Result<Option<OrderWithItems>, OrderError>;
        async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, OrderError>;
        async fn transition_order_status(&self, order_id: OrderId, new_status: OrderStatusType) -> Result<StatusTransition, OrderError>;
        async fn force_order_status(&self, order_id: OrderId, new_status: OrderStatusType) -> Result<Order, OrderError>;
    }
}

mock! {
    pub Carts {}
    impl CartStore for Carts {
        async fn get_cart(&self, user_id: UserId) -> Result<CartContents, CartError>;
        async fn clear_cart(&self, user_id: UserId) -> Result<(), CartError>;
        async fn add_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError>;
        async fn set_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError>;
        async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<(), CartError>;
    }
}

mock! {
    pub Payments {}
    impl PaymentGateway for Payments {
        async fn create_payment(&self, order: &Order) -> Result<PaymentRedirect, PaymentGatewayError>;
    }
}
