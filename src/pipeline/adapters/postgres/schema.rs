//! Diesel schema for case persistence.

diesel::table! {
    /// Case records, one per customer engagement.
    cases (id) {
        /// Opaque case identifier.
        #[max_length = 64]
        id -> Varchar,
        /// Customer name.
        name -> Text,
        /// CPF-like tax identifier.
        #[max_length = 32]
        tax_id -> Varchar,
        /// Pipeline stage in canonical form.
        #[max_length = 32]
        stage -> Varchar,
        /// Contracted amount in cents.
        contracted_amount_cents -> Int8,
        /// Assigned handler name or id.
        assigned_operator -> Text,
        /// Card color tag.
        #[max_length = 16]
        color_tag -> Varchar,
        /// Attached document names as a JSON array.
        attached_documents -> Jsonb,
        /// Optional follow-up reminder.
        follow_up_at -> Nullable<Timestamptz>,
        /// Timestamp of the latest stage change.
        stage_entered_at -> Timestamptz,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
