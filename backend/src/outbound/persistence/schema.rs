//! Diesel table definitions generated from `backend/migrations`.

diesel::table! {
    /// Registered accounts. `email` arrives normalised by `Email::new` and is unique.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// Either `member` or `admin`, enforced by a CHECK constraint.
        role -> Text,
        created_at -> Timestamptz,
    }
}
