// handlers/public/mod.rs - Public handlers (no session required)
//
// Security Level: None
// Route Prefix: /api/session, /, /health
// Middleware: Route guard passes these through (not under a protected prefix)

pub mod session;
pub mod status;
