//! Keys for values cached in the tower session.

pub const USER_ID: &str = "user_id";
