use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub disabled_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = companies)]
pub struct Company {
    pub id: Uuid,
    pub company_type: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub is_verified: bool,
    pub does_cross_border: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub id: Uuid,
    pub company_type: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = drivers)]
#[diesel(belongs_to(Company))]
pub struct Driver {
    pub id: Uuid,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = drivers)]
pub struct NewDriver {
    pub id: Uuid,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = trucks)]
#[diesel(belongs_to(Company))]
pub struct Truck {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration_number: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub axle_count: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = trucks)]
pub struct NewTruck {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration_number: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub axle_count: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = trailers)]
#[diesel(belongs_to(Company))]
pub struct Trailer {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration_number: String,
    pub trailer_type: String,
    pub payload_capacity_tons: Option<f64>,
    pub length_meters: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = trailers)]
pub struct NewTrailer {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration_number: String,
    pub trailer_type: String,
    pub payload_capacity_tons: Option<f64>,
    pub length_meters: Option<f64>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = documents)]
pub struct Document {
    pub id: Uuid,
    pub owner_company_id: Uuid,
    pub company_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    pub trailer_id: Option<Uuid>,
    pub category: String,
    pub title: String,
    pub s3_key: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub id: Uuid,
    pub owner_company_id: Uuid,
    pub company_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    pub trailer_id: Option<Uuid>,
    pub category: String,
    pub title: String,
    pub s3_key: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = loads)]
pub struct Load {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub created_by: Uuid,
    pub pickup_address: String,
    pub pickup_city: String,
    pub pickup_province: Option<String>,
    pub pickup_country: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_province: Option<String>,
    pub delivery_country: String,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
    pub cargo_type: String,
    pub description: Option<String>,
    pub weight_tons: f64,
    pub required_trailer_types: Vec<String>,
    pub budget_amount: Option<f64>,
    pub is_cross_border: bool,
    pub is_hazardous: bool,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = loads)]
pub struct NewLoad {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub created_by: Uuid,
    pub pickup_address: String,
    pub pickup_city: String,
    pub pickup_province: Option<String>,
    pub pickup_country: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_province: Option<String>,
    pub delivery_country: String,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
    pub cargo_type: String,
    pub description: Option<String>,
    pub weight_tons: f64,
    pub required_trailer_types: Vec<String>,
    pub budget_amount: Option<f64>,
    pub is_cross_border: bool,
    pub is_hazardous: bool,
    pub status: String,
}
