use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fixed course list for admission preferences.
/// First choice is mandatory on every application; values outside this
/// enumeration are rejected at the edge.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Course {
    #[serde(rename = "Computer Science")]
    ComputerScience,
    #[serde(rename = "Electronics & Communication")]
    ElectronicsCommunication,
    #[serde(rename = "Mechanical Engineering")]
    MechanicalEngineering,
    #[serde(rename = "Civil Engineering")]
    CivilEngineering,
    #[serde(rename = "Electrical Engineering")]
    ElectricalEngineering,
    #[serde(rename = "Information Technology")]
    InformationTechnology,
    #[serde(rename = "Business Administration")]
    BusinessAdministration,
    Commerce,
    Arts,
}

impl Course {
    pub fn as_str(&self) -> &'static str {
        match self {
            Course::ComputerScience => "Computer Science",
            Course::ElectronicsCommunication => "Electronics & Communication",
            Course::MechanicalEngineering => "Mechanical Engineering",
            Course::CivilEngineering => "Civil Engineering",
            Course::ElectricalEngineering => "Electrical Engineering",
            Course::InformationTechnology => "Information Technology",
            Course::BusinessAdministration => "Business Administration",
            Course::Commerce => "Commerce",
            Course::Arts => "Arts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Computer Science" => Some(Course::ComputerScience),
            "Electronics & Communication" => Some(Course::ElectronicsCommunication),
            "Mechanical Engineering" => Some(Course::MechanicalEngineering),
            "Civil Engineering" => Some(Course::CivilEngineering),
            "Electrical Engineering" => Some(Course::ElectricalEngineering),
            "Information Technology" => Some(Course::InformationTechnology),
            "Business Administration" => Some(Course::BusinessAdministration),
            "Commerce" => Some(Course::Commerce),
            "Arts" => Some(Course::Arts),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Reservation category on the personal details section.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    General,
    #[serde(rename = "OBC")]
    Obc,
    #[serde(rename = "SC")]
    Sc,
    #[serde(rename = "ST")]
    St,
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Parse a wire status. `None` for anything outside the enumeration
    /// (callers map that to an invalid-status error, not a 500).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ProfilePhoto,
    #[serde(rename = "marksheet_10th")]
    Marksheet10th,
    #[serde(rename = "marksheet_12th")]
    Marksheet12th,
    IdProof,
    TransferCertificate,
    CastCertificate,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::ProfilePhoto => "profile_photo",
            DocumentType::Marksheet10th => "marksheet_10th",
            DocumentType::Marksheet12th => "marksheet_12th",
            DocumentType::IdProof => "id_proof",
            DocumentType::TransferCertificate => "transfer_certificate",
            DocumentType::CastCertificate => "cast_certificate",
            DocumentType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "profile_photo" => Some(DocumentType::ProfilePhoto),
            "marksheet_10th" => Some(DocumentType::Marksheet10th),
            "marksheet_12th" => Some(DocumentType::Marksheet12th),
            "id_proof" => Some(DocumentType::IdProof),
            "transfer_certificate" => Some(DocumentType::TransferCertificate),
            "cast_certificate" => Some(DocumentType::CastCertificate),
            "other" => Some(DocumentType::Other),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Address {
            street: None,
            city: None,
            state: None,
            pincode: None,
            country: "India".to_string(),
        }
    }
}

/// Identity record. The password hash is persisted with the record but never
/// reaches clients; responses go through `PublicUser`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String, // stored lowercase, globally unique
    pub password_hash: String,
    pub role: Role,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub address: Address,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing view of a user (everything except the password hash).
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Address,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            date_of_birth: user.date_of_birth,
            gender: user.gender,
            address: user.address.clone(),
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub full_name: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub nationality: String,
    pub category: Category,
}

impl Default for PersonalDetails {
    fn default() -> Self {
        PersonalDetails {
            full_name: None,
            father_name: None,
            mother_name: None,
            guardian_phone: None,
            nationality: "Indian".to_string(),
            category: Category::General,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AcademicRecord {
    pub board: Option<String>,
    pub school: Option<String>,
    pub passing_year: Option<i32>,
    pub percentage: Option<f32>,
    pub marksheet_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EntranceExam {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub score: Option<f32>,
    pub rank: Option<i32>,
    pub score_card_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AcademicDetails {
    pub tenth: Option<AcademicRecord>,
    pub twelfth: Option<AcademicRecord>,
    pub entrance_exam: Option<EntranceExam>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoursePreferences {
    pub first_choice: Course,
    #[serde(default)]
    pub second_choice: Option<Course>,
    #[serde(default)]
    pub third_choice: Option<Course>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    pub transaction_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub method: Option<String>,
}

/// One admission submission. At most one per student, enforced by the
/// store's student index. The `documents` list is mutated only through the
/// lifecycle attach/detach operations.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub student: String,
    #[serde(default)]
    pub personal_details: PersonalDetails,
    #[serde(default)]
    pub academic_details: AcademicDetails,
    pub course_preferences: CoursePreferences,
    #[serde(default)]
    pub documents: Vec<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub remarks: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub is_payment_completed: bool,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
}

/// One uploaded supporting file, tied to exactly one application and its
/// owning student.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub application: String,
    pub student: String,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_url: String,
    pub public_id: String, // storage-provider key
    pub file_size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_verified: bool,
    pub verification_notes: Option<String>,
}

/// JWT claims embedded in every bearer token.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthPayload {
    pub sub: String, // user id
    pub email: String,
    pub role: Role,
    pub name: String,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_wire_names_round_trip() {
        let json = serde_json::to_string(&Course::ElectronicsCommunication).unwrap();
        assert_eq!(json, "\"Electronics & Communication\"");
        let back: Course = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Course::ElectronicsCommunication);

        assert_eq!(Course::parse("Computer Science"), Some(Course::ComputerScience));
        assert_eq!(Course::parse("Astrology"), None);
    }

    #[test]
    fn test_status_and_document_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(ApplicationStatus::parse("approved"), Some(ApplicationStatus::Approved));
        assert_eq!(ApplicationStatus::parse("archived"), None);

        assert_eq!(
            serde_json::to_string(&DocumentType::Marksheet10th).unwrap(),
            "\"marksheet_10th\""
        );
        assert_eq!(DocumentType::parse("cast_certificate"), Some(DocumentType::CastCertificate));
        assert_eq!(DocumentType::parse("passport"), None);
    }

    #[test]
    fn test_personal_details_defaults() {
        let details: PersonalDetails = serde_json::from_str("{}").unwrap();
        assert_eq!(details.nationality, "Indian");
        assert_eq!(details.category, Category::General);

        let address: Address = serde_json::from_str("{}").unwrap();
        assert_eq!(address.country, "India");
    }

    #[test]
    fn test_public_user_hides_password_hash() {
        let user = User {
            id: "u1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: Role::Student,
            phone: "9876543210".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2004, 6, 1).unwrap(),
            gender: Gender::Female,
            address: Address::default(),
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let public = PublicUser::from(&user);
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("passwordHash"));
        assert!(!json.contains("secret"));
        assert!(json.contains("\"email\":\"asha@example.com\""));
    }
}
