use super::RouteDef;

/// Public Route Group
///
/// Screens reachable without signing in: the landing redirect, the four
/// feature showcases, the evaluation screen and the authentication forms.
/// None of these carry required roles, so the guard always allows them.
pub fn public_routes() -> Vec<RouteDef> {
    vec![
        // `/` is the catch-all entry point and resolves to the assessment view.
        RouteDef::redirect("/", "/assessment"),
        RouteDef::view("/assessment", "IntelligentAssessment"),
        RouteDef::view("/teaching", "IntelligentTeaching"),
        RouteDef::view("/vr", "VirtualReality"),
        RouteDef::view("/robot", "EducationalRobot"),
        RouteDef::view("/evaluation", "IntelligentEvaluation"),
        // The login screen must stay public or the guard would loop on itself.
        RouteDef::view("/login", "Login"),
        RouteDef::view("/register", "Register"),
    ]
}
