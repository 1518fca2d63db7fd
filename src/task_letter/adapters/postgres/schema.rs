//! Diesel schema for task-letter persistence.

diesel::table! {
    /// Task-letter records with optional destination completion details.
    task_letters (id) {
        /// Store-generated identifier.
        id -> Int8,
        /// Unique human-assigned register number.
        register_number -> Text,
        /// Letter title.
        title -> Text,
        /// Recipient name.
        recipient_name -> Text,
        /// Recipient position.
        recipient_position -> Text,
        /// Destination.
        destination_place -> Text,
        /// Purpose of travel.
        purpose -> Text,
        /// First day of the assignment.
        start_date -> Date,
        /// Last day of the assignment.
        end_date -> Date,
        /// Means of transportation.
        transportation -> Text,
        /// Advance money, `NUMERIC(12, 2)`.
        advance_money -> Numeric,
        /// Signatory name.
        signatory_name -> Text,
        /// Signatory position.
        signatory_position -> Text,
        /// Place of issue.
        creation_place -> Text,
        /// Date of issue.
        creation_date -> Date,
        /// Arrival date recorded at the destination.
        arrival_date -> Nullable<Date>,
        /// Return date recorded at the destination.
        return_date -> Nullable<Date>,
        /// Whether the ticket was taken.
        ticket_taken -> Nullable<Bool>,
        /// Notes from the destination official.
        official_notes -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
