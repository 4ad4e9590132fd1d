//! User profiles as seen by dispatch.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/admin/roles` | Grant `worker` or `admin` (stored admin only) |
//! | PUT | `/api/users/me/push-token` | Register the caller's device token |
//! | PUT | `/api/users/me/availability` | Worker toggles availability |

mod directory;

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use directory::{require_admin, PgUserDirectory, UserDirectory};
pub use services::UserService;
