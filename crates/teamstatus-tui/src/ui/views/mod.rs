pub mod form;
pub mod teams;
