/// Router Module Index
///
/// Organizes the portal's routing logic into access-segregated modules.
/// The route modules themselves carry no authorization logic; the access
/// gate middleware layered over the whole router decides, per path prefix,
/// whether a request may reach them.
///
/// The three modules map directly to the gate's path classes.

/// Routes accessible to all users (anonymous included): login page, health.
pub mod public;

/// Routes under the staff prefix. Reached only by sessions whose directory
/// role is `staff`.
pub mod staff;

/// Routes under the admin prefix. Reached only by sessions whose directory
/// role is `admin`.
pub mod admin;
