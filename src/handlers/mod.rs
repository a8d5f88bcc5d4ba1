// handlers/mod.rs - Two-tier handler layout
//
// Public handlers need no credentials. Protected handlers take a
// `CurrentUser` argument, which rejects the request with 401 before the
// handler body (or its JSON payload) is looked at.
pub mod protected;
pub mod public;
