pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
#[cfg(test)]
pub(crate) mod testing;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{
    CreatedOrder, InquiryRepository, PartnerRepository, PortfolioRepository, ReviewRepository,
    Store, UserRepository,
};
