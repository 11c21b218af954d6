// handlers/protected/mod.rs - Protected handlers (session token required)
//
// Security Level: Session token present (cookie or Bearer header)
// Route Prefix: /admin/*
// Middleware: Route guard redirects to the login path when the token is missing
//
// The token is only checked for presence here. Whether the remote API still
// honours it is discovered when it is used.

pub mod entities;
