use crate::domain::customer_user::NewAuthUser;
use crate::domain::seed_plan::SeedPlan;
use uuid::Uuid;

pub fn build_customer_user(plan: &SeedPlan, organization_id: Uuid) -> NewAuthUser {
    NewAuthUser {
        email: plan.customer_email.trim().to_lowercase(),
        password: plan.customer_password.clone(),
        full_name: plan.customer_full_name.trim().to_string(),
        organization_id,
    }
}
