//! In-memory stand-ins for the platform and storage, shared by unit and integration tests.

pub mod fake_transport;
pub mod repositories;

pub use fake_transport::{FakeTransport, TransportCall};
pub use repositories::InMemoryTrackedRepository;
