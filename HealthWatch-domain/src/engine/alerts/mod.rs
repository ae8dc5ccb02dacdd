mod factory;
pub mod lifecycle;

pub use factory::AlertFactory;
