use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::reports::analyze_report,
        crate::api::handlers::reports::report_history,
        crate::api::handlers::profile::user_profile,
        crate::api::handlers::profile::update_profile,
    ),
    components(
        schemas(
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::auth::AuthResponse,
            crate::entities::auth::PublicUser,
            crate::entities::reports::AnalyzeReportRequest,
            crate::entities::reports::AnalyzeReportResponse,
            crate::entities::reports::ReportHistoryResponse,
            crate::entities::profile::ProfileResponse,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealth,
            med_report_domain::entities::RegisterRequest,
            med_report_domain::entities::LoginRequest,
            med_report_domain::entities::UpdateProfileRequest,
            med_report_domain::entities::UserProfile,
            med_report_domain::entities::Report,
            med_report_domain::entities::AnalysisResult,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Service status"),
        (name = "auth", description = "Registration and sessions"),
        (name = "reports", description = "Test result analysis and report history"),
        (name = "profile", description = "User profile")
    ),
    info(
        title = "MedReport Analyzer API",
        version = "0.1.0",
        description = "Rule-based analysis of medical test results",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "MedReport Analyzer API");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "reports"));

        for path in [
            "/api/health",
            "/api/register",
            "/api/login",
            "/api/logout",
            "/api/analyze-report",
            "/api/report-history",
            "/api/user-profile",
            "/api/update-profile",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }

        let components = openapi.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.schemas.contains_key("AnalysisResult"));
    }
}
