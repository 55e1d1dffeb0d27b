pub mod email;
pub mod name;
pub mod subscriber;
pub mod token;
