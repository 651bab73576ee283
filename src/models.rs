use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// --- Roles & Statuses ---

/// Role
///
/// The closed set of platform roles. Serialized as the snake_case names the
/// backend issues (`super_admin`, `admin`, `teacher`, `student`, `parent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Teacher,
        Role::Student,
        Role::Parent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the five role names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {:?}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Account status as managed by admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Blocked,
}

/// Status carried by every relation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    #[default]
    Active,
    Inactive,
}

// --- User Records (Output) ---

/// User
///
/// A user record as returned by the profile and management endpoints.
/// Field presence varies by endpoint, hence the optional fields.
/// The backend emits camelCase keys for user records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The trimmed `{id, role}` / `{id, status}` record returned by the update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRoleUpdate {
    pub id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatusUpdate {
    pub id: i64,
    pub status: UserStatus,
}

// --- Relation Records (Output) ---

/// Admin → teacher relation as echoed by `POST /admin/teachers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdminTeacherRelation {
    pub id: i64,
    pub admin_id: i64,
    pub teacher_id: i64,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub status: RelationStatus,
}

/// Teacher → student relation as echoed by `POST /teacher/students`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TeacherStudentRelation {
    pub id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub course_id: i64,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub status: RelationStatus,
}

/// Student → parent relation as echoed by `POST /student/parents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StudentParentRelation {
    pub id: i64,
    pub student_id: i64,
    pub parent_id: i64,
    /// father, mother, guardian...
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub status: RelationStatus,
}

// --- Request Payloads (Input) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// RegisterRequest
///
/// Self-registration is limited to teacher, student or parent by the backend;
/// an absent role registers a student.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Partial profile update; only provided fields are sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateAdminTeacherRelationRequest {
    pub teacher_id: i64,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateTeacherStudentRelationRequest {
    pub student_id: i64,
    #[serde(default)]
    pub course_id: i64,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub semester: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateStudentParentRelationRequest {
    pub parent_id: i64,
    #[serde(default)]
    pub relationship: String,
}

// --- Response Envelopes ---

/// Returned by both `POST /login` and `POST /refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// `{ "user": ... }`, optionally with a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope<T = User> {
    #[serde(default)]
    pub message: String,
    pub user: T,
}

/// `{ "users": [...] }`. The backend sends `null` for an empty list.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsersEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TeachersEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teachers: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StudentsEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub students: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParentsEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parents: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEnvelope<T> {
    #[serde(default)]
    pub message: String,
    pub relation: T,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
