use edugo_web::models::{
    RegisterRequest, RelationStatus, Role, StudentParentRelation, TeachersEnvelope,
    UpdateProfileRequest, User, UserStatus, UsersEnvelope,
};
use serde_json::json;

#[test]
fn test_role_names_round_trip() {
    for role in Role::ALL {
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        assert_eq!(role.to_string(), role.as_str());
        assert_eq!(serde_json::to_value(role).unwrap(), json!(role.as_str()));
    }
    assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
}

#[test]
fn test_role_parse_is_strict() {
    for raw in ["Admin", "superadmin", " teacher", "", "root"] {
        let err = raw.parse::<Role>().unwrap_err();
        assert_eq!(err.0, raw);
    }
    assert!(serde_json::from_value::<Role>(json!("janitor")).is_err());
}

#[test]
fn test_user_record_uses_camel_case() {
    let user: User = serde_json::from_value(json!({
        "id": 12,
        "username": "grace",
        "email": "grace@edugo.test",
        "firstName": "Grace",
        "lastName": "Hopper",
        "role": "admin",
        "status": "blocked",
        "createdAt": "2025-03-13T10:15:00Z"
    }))
    .unwrap();

    assert_eq!(user.first_name, "Grace");
    assert_eq!(user.last_name, "Hopper");
    assert_eq!(user.role, Some(Role::Admin));
    assert_eq!(user.status, Some(UserStatus::Blocked));
    assert!(user.created_at.is_some());

    let encoded = serde_json::to_value(&user).unwrap();
    assert_eq!(encoded["firstName"], "Grace");
    assert!(encoded.get("first_name").is_none());
}

#[test]
fn test_user_record_tolerates_missing_optional_fields() {
    let user: User = serde_json::from_value(json!({
        "id": 3,
        "username": "kid",
        "email": "kid@edugo.test"
    }))
    .unwrap();
    assert_eq!(user.role, None);
    assert_eq!(user.first_name, "");
    assert!(serde_json::to_value(&user).unwrap().get("role").is_none());
}

#[test]
fn test_null_lists_read_as_empty() {
    let users: UsersEnvelope = serde_json::from_value(json!({ "users": null })).unwrap();
    assert!(users.users.is_empty());

    let teachers: TeachersEnvelope = serde_json::from_value(json!({})).unwrap();
    assert!(teachers.teachers.is_empty());
}

#[test]
fn test_request_payloads_use_snake_case_and_skip_absent() {
    let register = RegisterRequest {
        username: "new".to_string(),
        password: "pw".to_string(),
        email: "new@edugo.test".to_string(),
        first_name: "New".to_string(),
        ..Default::default()
    };
    let encoded = serde_json::to_value(&register).unwrap();
    assert_eq!(encoded["first_name"], "New");
    assert!(encoded.get("role").is_none());

    let update = UpdateProfileRequest {
        last_name: Some("Doe".to_string()),
        ..Default::default()
    };
    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        json!({ "last_name": "Doe" })
    );
}

#[test]
fn test_relation_status_defaults_to_active() {
    let relation: StudentParentRelation = serde_json::from_value(json!({
        "id": 1,
        "student_id": 2,
        "parent_id": 3
    }))
    .unwrap();
    assert_eq!(relation.status, RelationStatus::Active);
    assert_eq!(relation.relationship, "");
}
