// This file contains all SQL statements issued by users_server.
#![forbid(unsafe_code)]

// ========================= users table =========================
// No ORDER BY: rows come back in whatever order the database chooses.
pub const LIST_USERS: &str = "SELECT id, name, email FROM users";
