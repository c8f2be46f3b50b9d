//! Diesel table definitions matching `backend/migrations`.
//!
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users and their credentials.
    users (id) {
        id -> Uuid,
        /// Lower-cased, unique login email.
        email -> Varchar,
        display_name -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Varchar,
        /// Explicitly granted role names; `ROLE_USER` is implied.
        roles -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ticket aggregate roots.
    tickets (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        /// One of `low`, `normal`, `high`.
        priority -> Varchar,
        /// One of `pending`, `waiting`, `in_progress`, `done`.
        status -> Varchar,
        created_at -> Timestamptz,
        owner_id -> Uuid,
        assignee_id -> Nullable<Uuid>,
        assigned_at_first -> Nullable<Timestamptz>,
        assigned_at_last -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Comments; `ticket_id` is null once a comment is detached.
    comments (id) {
        id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
        author_id -> Uuid,
        ticket_id -> Nullable<Uuid>,
    }
}

diesel::joinable!(comments -> tickets (ticket_id));

diesel::allow_tables_to_appear_in_same_query!(users, tickets, comments);
