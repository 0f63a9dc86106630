pub mod auth;
pub mod errors;
pub mod router;
pub mod routes;
pub mod serializers;

pub use router::run;
