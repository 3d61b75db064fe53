pub mod campaign;
pub mod client;
pub mod de;
pub mod visit;
