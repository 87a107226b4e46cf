pub mod session;
pub mod user;
pub mod work_order;
