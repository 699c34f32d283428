// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (JWT auth + owner role, ownership where needed)
pub mod public;
pub mod protected;
