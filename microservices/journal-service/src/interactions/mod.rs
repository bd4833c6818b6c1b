pub mod service;

pub use service::InteractionService;
