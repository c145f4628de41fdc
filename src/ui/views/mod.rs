mod dashboard;
mod login;
mod product_detail;
mod product_list;
mod user_detail;
mod user_list;

pub use dashboard::DashboardView;
pub use login::LoginView;
pub use product_detail::ProductDetailView;
pub use product_list::ProductListView;
pub use user_detail::UserDetailView;
pub use user_list::UserListView;
