//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; `diesel print-schema` can
//! regenerate them from a live database.

diesel::table! {
    /// Registered users: doctors, patients, and admins.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique, lower-cased email address.
        email -> Varchar,
        /// Hex-encoded salted SHA-256 credential digest.
        password_digest -> Varchar,
        /// Hex-encoded digest salt.
        password_salt -> Varchar,
        /// Role discriminator: admin, doctor, or patient.
        role -> Varchar,
        /// Display name.
        full_name -> Varchar,
        /// Contact phone number.
        phone -> Nullable<Varchar>,
        /// Age in years.
        age -> Nullable<Int4>,
        /// Free-form gender description.
        gender -> Nullable<Varchar>,
        /// Department, for doctors.
        department -> Nullable<Varchar>,
        /// Medical history notes, for patients.
        medical_history -> Nullable<Text>,
        /// Known allergies, for patients.
        allergies -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookings: one row per reservation, slot start only (fixed duration).
    bookings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Doctor whose calendar the slot belongs to.
        doctor_id -> Uuid,
        /// Patient the slot is reserved for.
        patient_id -> Uuid,
        /// Slot start instant.
        slot_start -> Timestamptz,
        /// Lifecycle state: active or cancelled.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, bookings);
