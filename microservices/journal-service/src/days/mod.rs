pub mod service;

pub use service::DayService;
