pub mod restaurant;
pub mod token;
