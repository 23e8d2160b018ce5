//! Domain resource types
//!
//! One type per backend resource, each declaring its endpoint path and
//! its status-filtering mode through the [`Resource`] trait. The
//! filtering mode is fixed per resource so a view can never silently
//! mix server-side and client-side filtering.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How status filtering is performed for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// The filter is part of the query sent to the server; changing it
    /// re-fetches
    ServerSide,
    /// The filter narrows the already-fetched page; changing it never
    /// issues a request
    ClientSide,
}

/// A backend resource the browser can page through
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path segment under the API base, e.g. `"patient"`
    const ENDPOINT: &'static str;
    /// Human-readable singular name used in notifications
    const NAME: &'static str;
    /// Fixed status-filtering mode for this resource
    const FILTER_MODE: FilterMode;

    fn id(&self) -> i64;

    /// Status value used by client-side filtering; `None` when the
    /// resource has no status dimension
    fn status_value(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

/// A patient registered at the clinic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub id: i64,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub national_id: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub emergency_contact: String,
    pub emergency_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_provider: Option<String>,
    #[serde(default)]
    pub insurance_number: String,
    pub blood_type: String,
}

impl Resource for Patient {
    const ENDPOINT: &'static str = "patient";
    const NAME: &'static str = "Patient";
    const FILTER_MODE: FilterMode = FilterMode::ServerSide;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffStatus {
    OnDuty,
    Off,
    Suspended,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::OnDuty => "ON_DUTY",
            StaffStatus::Off => "OFF",
            StaffStatus::Suspended => "SUSPENDED",
        }
    }
}

/// A staff member, managed from the administration dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(default)]
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub role: crate::session::Role,
    pub is_active: StaffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Resource for StaffMember {
    const ENDPOINT: &'static str = "staff";
    const NAME: &'static str = "Staff member";
    // The staff endpoint filters and sorts server-side
    const FILTER_MODE: FilterMode = FilterMode::ServerSide;

    fn id(&self) -> i64 {
        self.id
    }

    fn status_value(&self) -> Option<&str> {
        Some(self.is_active.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Complete,
    Incomplete,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Complete => "COMPLETE",
            AppointmentStatus::Incomplete => "INCOMPLETE",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }
}

/// A short patient or doctor reference embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub id: i64,
    #[serde(alias = "fullName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A booked appointment between a patient and a doctor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: i64,
    pub patient: PersonRef,
    pub doctor: PersonRef,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Resource for Appointment {
    const ENDPOINT: &'static str = "appointment";
    const NAME: &'static str = "Appointment";
    // Appointment lists are filtered over the fetched page, no re-fetch
    const FILTER_MODE: FilterMode = FilterMode::ClientSide;

    fn id(&self) -> i64 {
        self.id
    }

    fn status_value(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Cancelled,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Pending => "PENDING",
            BillingStatus::PartiallyPaid => "PARTIALLY_PAID",
            BillingStatus::Paid => "PAID",
            BillingStatus::Cancelled => "CANCELLED",
        }
    }
}

/// A bill raised against a patient visit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    #[serde(default)]
    pub id: i64,
    pub patient: PersonRef,
    /// Itemised charges, service name to amount
    #[serde(default)]
    pub bills: BTreeMap<String, f64>,
    pub total_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub status: BillingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Resource for Billing {
    const ENDPOINT: &'static str = "billing";
    const NAME: &'static str = "Bill";
    const FILTER_MODE: FilterMode = FilterMode::ClientSide;

    fn id(&self) -> i64 {
        self.id
    }

    fn status_value(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    MissingVitals,
    Complete,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::MissingVitals => "MISSING_VITALS",
            RecordStatus::Complete => "COMPLETE",
        }
    }
}

/// Vitals readings captured by a nurse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub temperature: f64,
    pub height: f64,
    pub mass: f64,
    pub heart_rate: f64,
    pub systolic_number: f64,
    pub diastolic_number: f64,
}

/// A visit record, completed by the nurse once vitals are captured
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsRecord {
    #[serde(default)]
    pub id: i64,
    pub patient: PersonRef,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Resource for VitalsRecord {
    const ENDPOINT: &'static str = "records";
    const NAME: &'static str = "Record";
    const FILTER_MODE: FilterMode = FilterMode::ClientSide;

    fn id(&self) -> i64 {
        self.id
    }

    fn status_value(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_deserializes_from_backend_shape() {
        let json = r#"{
            "id": 12,
            "patient": {"id": 3, "name": "Jane Wanjiru"},
            "doctor": {"id": 9, "name": "Dr. Omondi"},
            "status": "PENDING",
            "createdAt": "2025-03-14T09:30:00"
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.id(), 12);
        assert_eq!(appointment.status_value(), Some("PENDING"));
        assert_eq!(appointment.patient.name, "Jane Wanjiru");
    }

    #[test]
    fn billing_parses_itemised_bills() {
        let json = r#"{
            "id": 4,
            "patient": {"id": 3, "name": "Jane Wanjiru", "phone": "0712345678"},
            "bills": {"Consultation": 500.0, "Lab": 1200.0},
            "totalAmount": 1700.0,
            "amountPaid": 500.0,
            "status": "PARTIALLY_PAID"
        }"#;
        let bill: Billing = serde_json::from_str(json).unwrap();
        assert_eq!(bill.bills.len(), 2);
        assert_eq!(bill.status, BillingStatus::PartiallyPaid);
        assert_eq!(Billing::FILTER_MODE, FilterMode::ClientSide);
    }

    #[test]
    fn filter_modes_are_fixed_per_resource() {
        assert_eq!(StaffMember::FILTER_MODE, FilterMode::ServerSide);
        assert_eq!(Patient::FILTER_MODE, FilterMode::ServerSide);
        assert_eq!(Appointment::FILTER_MODE, FilterMode::ClientSide);
        assert_eq!(VitalsRecord::FILTER_MODE, FilterMode::ClientSide);
    }

    #[test]
    fn patient_without_optional_fields_still_parses() {
        let json = r#"{
            "fullName": "Akinyi Achieng",
            "phone": "0712345678",
            "nationalId": "12345678",
            "address": "Kisumu",
            "dateOfBirth": "1990-06-01",
            "gender": "FEMALE",
            "emergencyContact": "0798765432",
            "emergencyName": "Mary Achieng",
            "insuranceNumber": "",
            "bloodType": "O+"
        }"#;
        let patient: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.id, 0);
        assert!(patient.email.is_none());
    }
}
