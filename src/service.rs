use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use crate::{
    client::ApiClient,
    config::AppConfig,
    error::ApiError,
    models::{
        AdminTeacherRelation, CreateAdminTeacherRelationRequest,
        CreateStudentParentRelationRequest, CreateTeacherStudentRelationRequest, LoginRequest,
        MessageResponse, ParentsEnvelope, RegisterRequest, RelationEnvelope, RelationStatus,
        ResetPasswordRequest, Role, StudentParentRelation, StudentsEnvelope, TeacherStudentRelation,
        TeachersEnvelope, TokenResponse, UpdateProfileRequest, UpdateRoleRequest,
        UpdateStatusRequest, User, UserEnvelope, UserRoleUpdate, UserStatus, UserStatusUpdate,
        UsersEnvelope,
    },
    session::SessionStore,
};

/// UserService
///
/// The user-service surface the front-end consumes. `HttpUserService` talks
/// to the real backend; `MockUserService` answers in-process so screens can
/// be developed without one.
///
/// Role scoping of the management calls is enforced by the backend. Nothing
/// here checks the caller's role.
#[async_trait]
pub trait UserService: Send + Sync {
    // --- Authentication ---
    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ApiError>;
    async fn register(&self, req: &RegisterRequest) -> Result<UserEnvelope, ApiError>;
    async fn logout(&self) -> Result<MessageResponse, ApiError>;
    async fn refresh(&self) -> Result<TokenResponse, ApiError>;

    // --- Own Profile ---
    async fn profile(&self) -> Result<User, ApiError>;
    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<UserEnvelope, ApiError>;
    async fn reset_password(
        &self,
        req: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError>;

    // --- Super Admin ---
    async fn all_users(&self) -> Result<Vec<User>, ApiError>;
    async fn update_user_role(
        &self,
        user_id: i64,
        role: Role,
    ) -> Result<UserEnvelope<UserRoleUpdate>, ApiError>;

    // --- User Management (admin and above) ---
    async fn users_by_role(&self, role: Role) -> Result<Vec<User>, ApiError>;
    async fn user_by_id(&self, user_id: i64) -> Result<User, ApiError>;
    async fn update_user_status(
        &self,
        user_id: i64,
        status: UserStatus,
    ) -> Result<UserEnvelope<UserStatusUpdate>, ApiError>;

    // --- Relations: admin → teacher → student → parent ---
    async fn create_admin_teacher_relation(
        &self,
        req: &CreateAdminTeacherRelationRequest,
    ) -> Result<RelationEnvelope<AdminTeacherRelation>, ApiError>;
    async fn teachers(&self) -> Result<Vec<User>, ApiError>;

    async fn create_teacher_student_relation(
        &self,
        req: &CreateTeacherStudentRelationRequest,
    ) -> Result<RelationEnvelope<TeacherStudentRelation>, ApiError>;
    async fn students(&self) -> Result<Vec<User>, ApiError>;

    async fn create_student_parent_relation(
        &self,
        req: &CreateStudentParentRelationRequest,
    ) -> Result<RelationEnvelope<StudentParentRelation>, ApiError>;
    async fn parents(&self) -> Result<Vec<User>, ApiError>;
}

/// UserServiceState
///
/// The concrete type used to share the user service across the front-end.
pub type UserServiceState = Arc<dyn UserService>;

/// build_user_service
///
/// Picks the mock or the HTTP implementation from configuration.
pub fn build_user_service(config: &AppConfig, session: SessionStore) -> UserServiceState {
    if config.use_mock_api {
        tracing::info!("using the in-memory mock user service");
        Arc::new(MockUserService::new())
    } else {
        Arc::new(HttpUserService::new(ApiClient::new(
            config.api_base_url.clone(),
            session,
        )))
    }
}

// --- HTTP Implementation ---

/// HttpUserService
///
/// The real implementation. Every call goes through `ApiClient`, which
/// attaches the session token and normalizes errors.
#[derive(Clone)]
pub struct HttpUserService {
    client: ApiClient,
}

impl HttpUserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl UserService for HttpUserService {
    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.client.post("/login", req).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<UserEnvelope, ApiError> {
        self.client.post("/register", req).await
    }

    async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.client.post_empty("/logout").await
    }

    async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        self.client.post_empty("/refresh").await
    }

    async fn profile(&self) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.client.get("/user").await?;
        Ok(envelope.user)
    }

    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<UserEnvelope, ApiError> {
        self.client.put("/user", req).await
    }

    async fn reset_password(
        &self,
        req: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.client.put("/user/password", req).await
    }

    async fn all_users(&self) -> Result<Vec<User>, ApiError> {
        let envelope: UsersEnvelope = self.client.get("/super-admin/users").await?;
        Ok(envelope.users)
    }

    async fn update_user_role(
        &self,
        user_id: i64,
        role: Role,
    ) -> Result<UserEnvelope<UserRoleUpdate>, ApiError> {
        self.client
            .put(
                &format!("/super-admin/users/{user_id}/role"),
                &UpdateRoleRequest { role },
            )
            .await
    }

    async fn users_by_role(&self, role: Role) -> Result<Vec<User>, ApiError> {
        let envelope: UsersEnvelope = self
            .client
            .get(&format!("/user-management/users/role/{role}"))
            .await?;
        Ok(envelope.users)
    }

    async fn user_by_id(&self, user_id: i64) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self
            .client
            .get(&format!("/user-management/users/{user_id}"))
            .await?;
        Ok(envelope.user)
    }

    async fn update_user_status(
        &self,
        user_id: i64,
        status: UserStatus,
    ) -> Result<UserEnvelope<UserStatusUpdate>, ApiError> {
        self.client
            .put(
                &format!("/user-management/users/{user_id}/status"),
                &UpdateStatusRequest { status },
            )
            .await
    }

    async fn create_admin_teacher_relation(
        &self,
        req: &CreateAdminTeacherRelationRequest,
    ) -> Result<RelationEnvelope<AdminTeacherRelation>, ApiError> {
        self.client.post("/admin/teachers", req).await
    }

    async fn teachers(&self) -> Result<Vec<User>, ApiError> {
        let envelope: TeachersEnvelope = self.client.get("/admin/teachers").await?;
        Ok(envelope.teachers)
    }

    async fn create_teacher_student_relation(
        &self,
        req: &CreateTeacherStudentRelationRequest,
    ) -> Result<RelationEnvelope<TeacherStudentRelation>, ApiError> {
        self.client.post("/teacher/students", req).await
    }

    async fn students(&self) -> Result<Vec<User>, ApiError> {
        let envelope: StudentsEnvelope = self.client.get("/teacher/students").await?;
        Ok(envelope.students)
    }

    async fn create_student_parent_relation(
        &self,
        req: &CreateStudentParentRelationRequest,
    ) -> Result<RelationEnvelope<StudentParentRelation>, ApiError> {
        self.client.post("/student/parents", req).await
    }

    async fn parents(&self) -> Result<Vec<User>, ApiError> {
        let envelope: ParentsEnvelope = self.client.get("/student/parents").await?;
        Ok(envelope.parents)
    }
}

// --- Mock Implementation ---

/// The token every mock login hands out.
pub const MOCK_TOKEN: &str = "mock-token";

/// MockUserService
///
/// In-process stand-in for the backend. Every call succeeds with canned data
/// built around a single mock user, unless constructed failing, in which case
/// every call returns a 500 backend error.
pub struct MockUserService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    /// Role reported for the mock user's profile.
    pub role: Role,
    next_id: AtomicI64,
}

impl Default for MockUserService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUserService {
    pub fn new() -> Self {
        Self::with_role(Role::Student)
    }

    pub fn with_role(role: Role) -> Self {
        Self {
            should_fail: false,
            role,
            // Id 1 belongs to the mock user.
            next_id: AtomicI64::new(2),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// The mock user's profile.
    pub fn mock_user(&self) -> User {
        User {
            id: 1,
            username: "MockUser".to_string(),
            email: "mock@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: Some(self.role),
            status: Some(UserStatus::Active),
            created_at: Utc.with_ymd_and_hms(2025, 3, 13, 0, 0, 0).single(),
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.should_fail {
            return Err(ApiError::Backend {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Mock user service error: simulation requested".to_string(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn message(text: &str) -> MessageResponse {
        MessageResponse {
            message: text.to_string(),
        }
    }
}

#[async_trait]
impl UserService for MockUserService {
    async fn login(&self, _req: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.check()?;
        Ok(TokenResponse {
            message: "login succeeded".to_string(),
            token: MOCK_TOKEN.to_string(),
        })
    }

    async fn register(&self, req: &RegisterRequest) -> Result<UserEnvelope, ApiError> {
        self.check()?;
        Ok(UserEnvelope {
            message: "registration succeeded".to_string(),
            user: User {
                id: self.next_id(),
                username: req.username.clone(),
                email: req.email.clone(),
                first_name: req.first_name.clone(),
                last_name: req.last_name.clone(),
                role: Some(req.role.unwrap_or(Role::Student)),
                status: Some(UserStatus::Active),
                created_at: Some(Utc::now()),
            },
        })
    }

    async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.check()?;
        Ok(Self::message("logout succeeded"))
    }

    async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        self.check()?;
        Ok(TokenResponse {
            message: "token refreshed".to_string(),
            token: format!("{MOCK_TOKEN}-{}", uuid::Uuid::new_v4()),
        })
    }

    async fn profile(&self) -> Result<User, ApiError> {
        self.check()?;
        Ok(self.mock_user())
    }

    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<UserEnvelope, ApiError> {
        self.check()?;
        let mut user = self.mock_user();
        if let Some(email) = &req.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &req.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &req.last_name {
            user.last_name = last_name.clone();
        }
        Ok(UserEnvelope {
            message: "profile updated".to_string(),
            user,
        })
    }

    async fn reset_password(
        &self,
        _req: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.check()?;
        Ok(Self::message("password reset"))
    }

    async fn all_users(&self) -> Result<Vec<User>, ApiError> {
        self.check()?;
        Ok(vec![self.mock_user()])
    }

    async fn update_user_role(
        &self,
        user_id: i64,
        role: Role,
    ) -> Result<UserEnvelope<UserRoleUpdate>, ApiError> {
        self.check()?;
        Ok(UserEnvelope {
            message: "role updated".to_string(),
            user: UserRoleUpdate { id: user_id, role },
        })
    }

    async fn users_by_role(&self, role: Role) -> Result<Vec<User>, ApiError> {
        self.check()?;
        let user = self.mock_user();
        Ok(if user.role == Some(role) {
            vec![user]
        } else {
            Vec::new()
        })
    }

    async fn user_by_id(&self, user_id: i64) -> Result<User, ApiError> {
        self.check()?;
        let user = self.mock_user();
        if user.id != user_id {
            return Err(ApiError::Backend {
                status: StatusCode::NOT_FOUND,
                message: "user not found".to_string(),
            });
        }
        Ok(user)
    }

    async fn update_user_status(
        &self,
        user_id: i64,
        status: UserStatus,
    ) -> Result<UserEnvelope<UserStatusUpdate>, ApiError> {
        self.check()?;
        Ok(UserEnvelope {
            message: "status updated".to_string(),
            user: UserStatusUpdate {
                id: user_id,
                status,
            },
        })
    }

    async fn create_admin_teacher_relation(
        &self,
        req: &CreateAdminTeacherRelationRequest,
    ) -> Result<RelationEnvelope<AdminTeacherRelation>, ApiError> {
        self.check()?;
        Ok(RelationEnvelope {
            message: "admin-teacher relation created".to_string(),
            relation: AdminTeacherRelation {
                id: self.next_id(),
                admin_id: self.mock_user().id,
                teacher_id: req.teacher_id,
                department: req.department.clone(),
                position: req.position.clone(),
                status: RelationStatus::Active,
            },
        })
    }

    async fn teachers(&self) -> Result<Vec<User>, ApiError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn create_teacher_student_relation(
        &self,
        req: &CreateTeacherStudentRelationRequest,
    ) -> Result<RelationEnvelope<TeacherStudentRelation>, ApiError> {
        self.check()?;
        Ok(RelationEnvelope {
            message: "teacher-student relation created".to_string(),
            relation: TeacherStudentRelation {
                id: self.next_id(),
                teacher_id: self.mock_user().id,
                student_id: req.student_id,
                course_id: req.course_id,
                course_name: req.course_name.clone(),
                semester: req.semester.clone(),
                status: RelationStatus::Active,
            },
        })
    }

    async fn students(&self) -> Result<Vec<User>, ApiError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn create_student_parent_relation(
        &self,
        req: &CreateStudentParentRelationRequest,
    ) -> Result<RelationEnvelope<StudentParentRelation>, ApiError> {
        self.check()?;
        Ok(RelationEnvelope {
            message: "student-parent relation created".to_string(),
            relation: StudentParentRelation {
                id: self.next_id(),
                student_id: self.mock_user().id,
                parent_id: req.parent_id,
                relationship: req.relationship.clone(),
                status: RelationStatus::Active,
            },
        })
    }

    async fn parents(&self) -> Result<Vec<User>, ApiError> {
        self.check()?;
        Ok(Vec::new())
    }
}
