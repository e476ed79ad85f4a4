//! Row structs bridging Diesel and the domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{bookings, users};

/// Full user row as selected from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_digest: String,
    pub password_salt: String,
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable user row.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub password_salt: &'a str,
    pub role: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
    pub department: Option<&'a str>,
    pub medical_history: Option<&'a str>,
    pub allergies: Option<&'a str>,
}

/// Partial user update; `None` fields keep their stored value.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserProfileChangeset {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
}

/// Full booking row as selected from `bookings`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub slot_start: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable booking row.
#[derive(Debug, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub slot_start: DateTime<Utc>,
    pub status: String,
}
