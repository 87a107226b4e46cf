pub mod session;
pub mod user;
pub mod work_order;

pub use session::PostgresSessionStore;
pub use user::PostgresUserRepository;
pub use work_order::PostgresWorkOrderRepository;
