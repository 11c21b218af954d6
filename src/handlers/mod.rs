// handlers/mod.rs - 2-Tier Handler Architecture
//
// Public (no session) → Protected (session token required, enforced by the
// route guard middleware for every path under a protected prefix)
//
pub mod public;    // Tier 1: No session required (/, /health, /api/session)
pub mod protected; // Tier 2: Session required (/admin/*)

/*
ROUTE GUARD AND HANDLER TIERS:

The guard is not attached per route. `session_guard_middleware` wraps the
whole router and consults `RouteGuard` with the request path:

src/
├── handlers/
│   ├── mod.rs              ← This file
│   ├── public/
│   │   ├── session.rs      ← POST/DELETE/GET /api/session
│   │   └── status.rs       ← GET /, GET /health
│   └── protected/
│       └── entities.rs     ← /admin/api/entities/:kind/{fields,validate}
│
├── middleware/guard.rs     ← Redirects (303) protected paths without a token
└── app.rs                  ← Router assembly

Whether a handler is "protected" is decided by its path, not by which module
it lives in. Moving a route under a configured prefix protects it.
*/
