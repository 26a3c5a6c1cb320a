//! Router Module Index
//!
//! Organizes the application's routes by who may reach them. Each protected
//! module is wrapped in the guard middleware with its own access policy.

/// Routes accessible to everyone (anonymous included).
pub mod public;

/// Views for any authenticated caller.
pub mod authenticated;

/// Views restricted to the 'admin' role.
pub mod admin;

/// Views for the 'admin' and 'editor' roles.
pub mod editor;
