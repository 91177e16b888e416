pub mod clock;
pub mod rating;
pub mod rules;
pub mod session;
pub mod utils;
