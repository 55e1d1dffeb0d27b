pub mod confirm;
pub mod dispatch;
pub mod health_check;
pub mod subscribe;
pub mod unsubscribe;

pub use confirm::confirm;
pub use dispatch::trigger_dispatch;
pub use health_check::health_check;
pub use subscribe::subscribe;
pub use unsubscribe::unsubscribe;
