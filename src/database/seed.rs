//! Idempotent demo seed: two tenants, their branches, a handful of users
//! and sample patients. Applied at startup and reused by the test suite.

use std::sync::Arc;

use crate::auth::password::hash_password;
use crate::auth::policy::Role;
use crate::database::models::{Branch, Patient, Tenant, User, UserBranch};
use crate::database::{BranchRepository, PatientRepository, TenantRepository, UserRepository};
use crate::error::ApiError;

pub async fn seed_demo_data(
    tenants: &Arc<dyn TenantRepository>,
    branches: &Arc<dyn BranchRepository>,
    users: &Arc<dyn UserRepository>,
    patients: &Arc<dyn PatientRepository>,
    pbkdf2_iterations: u32,
) -> Result<(), ApiError> {
    if users.username_exists("admin@aura").await? {
        return Ok(()); // already seeded
    }

    let aura = Tenant::new("AURA", "Aura Clinic Bangkok");
    let silom = Tenant::new("SLM", "Clinic Silom");
    tenants.create(&aura).await?;
    tenants.create(&silom).await?;

    let siam = Branch::new(
        &aura.id,
        "Siam Branch",
        Some("Siam Square, Bangkok".to_string()),
        Some("02-111-1111".to_string()),
    );
    let thonglor = Branch::new(
        &aura.id,
        "Thonglor Branch",
        Some("Thonglor, Bangkok".to_string()),
        Some("02-222-2222".to_string()),
    );
    let silom_main = Branch::new(
        &silom.id,
        "Silom Main",
        Some("Silom Road, Bangkok".to_string()),
        Some("02-333-3333".to_string()),
    );
    let sathorn = Branch::new(
        &silom.id,
        "Sathorn Branch",
        Some("Sathorn, Bangkok".to_string()),
        Some("02-444-4444".to_string()),
    );
    for branch in [&siam, &thonglor, &silom_main, &sathorn] {
        branches.create(branch).await?;
    }

    let admin = User::new(
        &aura.id,
        "admin@aura",
        hash_password("Admin123!", pbkdf2_iterations),
        "Admin Aura",
        Role::Admin,
    );
    let user = User::new(
        &aura.id,
        "user@aura",
        hash_password("User123!", pbkdf2_iterations),
        "User Aura",
        Role::User,
    );
    let viewer = User::new(
        &aura.id,
        "viewer@aura",
        hash_password("Viewer123!", pbkdf2_iterations),
        "Viewer Aura",
        Role::Viewer,
    );
    let admin_silom = User::new(
        &silom.id,
        "admin@silom",
        hash_password("Admin123!", pbkdf2_iterations),
        "Admin Silom",
        Role::Admin,
    );
    for user in [&admin, &user, &viewer, &admin_silom] {
        users.create(user).await?;
    }

    let memberships = [
        // admin@aura works at both branches
        UserBranch::new(&admin.id, &siam.id),
        UserBranch::new(&admin.id, &thonglor.id),
        // user@aura at Siam only, viewer@aura at Thonglor only
        UserBranch::new(&user.id, &siam.id),
        UserBranch::new(&viewer.id, &thonglor.id),
        // admin@silom at both Silom branches
        UserBranch::new(&admin_silom.id, &silom_main.id),
        UserBranch::new(&admin_silom.id, &sathorn.id),
    ];
    for membership in &memberships {
        users.add_branch(membership).await?;
    }

    let sample_patients = [
        Patient::new(&aura.id, "สมชาย", "ใจดี", "081-111-1111", Some(siam.id.clone())),
        Patient::new(&aura.id, "สมหญิง", "รักสวย", "081-222-2222", Some(thonglor.id.clone())),
        Patient::new(&aura.id, "วิชัย", "สุขสันต์", "081-333-3333", Some(siam.id.clone())),
    ];
    for patient in &sample_patients {
        patients.create(patient).await?;
    }

    tracing::info!("Seeded demo tenants {} and {}", aura.code, silom.code);
    Ok(())
}
