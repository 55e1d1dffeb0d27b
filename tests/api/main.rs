mod dispatch;
mod health_check;
mod helpers;
mod subscriptions;
mod subscriptions_confirm;
mod unsubscribe;
