use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use med_report_domain::entities::UserProfile;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}
