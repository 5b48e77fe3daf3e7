//! Account provisioning: self-service registration, the admin-side staff
//! creation flow, student approval, and teacher removal. Multi-document
//! writes here are not transactional; the accepted partial-failure modes are
//! noted on each operation.

use serde::{Deserialize, Serialize};
use surrealdb::{Surreal, engine::any::Any};
use tracing::warn;
use validator::Validate;

use crate::{
    audit,
    consts::store_const::{TEACHER_TABLE, USER_TABLE},
    errors::{Error, Result},
    identity::{AuthContext, IdentityProvider},
    models::{
        teacher::TeacherProfile,
        user::{Role, UserRecord},
    },
    utils::time,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub role: Role,
}

/// Self-service registration. Only students and admins may register
/// themselves; teachers are provisioned by an admin. Students start
/// unapproved, admins are approved immediately.
///
/// The provider authenticates the account it just created into `ctx`, so the
/// context is signed out before returning: an unapproved student must not
/// walk away with an implicit session.
pub async fn register(
    db: &Surreal<Any>,
    ctx: &AuthContext,
    req: RegisterRequest,
) -> Result<String> {
    req.validate()?;
    if !matches!(req.role, Role::Student | Role::Admin) {
        return Err(Error::InvalidRole(req.role));
    }

    let user = ctx.create_account(&req.email, &req.password).await?;

    let record = UserRecord {
        uid: user.uid.clone(),
        email: req.email,
        name: req.name,
        role: req.role,
        approved: req.role == Role::Admin,
        created_at: time::now_rfc3339(),
        created_by: None,
    };
    let _: Option<UserRecord> = db
        .create((USER_TABLE, user.uid.as_str()))
        .content(record)
        .await?;

    audit::record(
        db.clone(),
        user.uid.clone(),
        format!("User registered as {}", req.role),
    );

    ctx.sign_out();

    Ok(user.uid)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStaffAccount {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub subject: Option<String>,
    pub department: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedAccount {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Admin-initiated teacher/admin creation. The new account is created
/// through a second, isolated [`AuthContext`] so the calling admin's own
/// session is never disturbed; the context is dropped once the documents are
/// written.
///
/// A duplicate email aborts before anything is created. Any later failure
/// can leave an orphaned credential account behind; that is tolerated as a
/// manual-cleanup case rather than auto-reconciled.
pub async fn admin_create_account(
    db: &Surreal<Any>,
    identity: &IdentityProvider,
    admin_uid: &str,
    req: NewStaffAccount,
) -> Result<ProvisionedAccount> {
    req.validate()?;
    if !matches!(req.role, Role::Teacher | Role::Admin) {
        return Err(Error::InvalidRole(req.role));
    }
    if req.role == Role::Teacher {
        if req.subject.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(Error::MissingField("subject"));
        }
        if req.department.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(Error::MissingField("department"));
        }
    }

    let secondary = AuthContext::new(identity.clone());
    let user = match secondary.create_account(&req.email, &req.password).await {
        Ok(user) => user,
        Err(err @ (Error::EmailInUse(_) | Error::WeakPassword)) => return Err(err),
        Err(err) => return Err(Error::ProvisioningError(err.to_string())),
    };

    let created_at = time::now_rfc3339();
    let record = UserRecord {
        uid: user.uid.clone(),
        email: req.email.clone(),
        name: req.name.clone(),
        role: req.role,
        approved: true,
        created_at: created_at.clone(),
        created_by: Some(admin_uid.to_string()),
    };
    let users_write: Result<Option<UserRecord>> = db
        .create((USER_TABLE, user.uid.as_str()))
        .content(record)
        .await
        .map_err(Into::into);
    users_write.map_err(|err| Error::ProvisioningError(err.to_string()))?;

    if req.role == Role::Teacher {
        let profile = TeacherProfile {
            uid: user.uid.clone(),
            name: req.name.clone(),
            email: req.email.clone(),
            subject: req.subject.unwrap_or_default(),
            department: req.department.unwrap_or_default(),
            created_by: admin_uid.to_string(),
            created_at,
        };
        let teachers_write: Result<Option<TeacherProfile>> = db
            .create((TEACHER_TABLE, user.uid.as_str()))
            .content(profile)
            .await
            .map_err(Into::into);
        teachers_write.map_err(|err| Error::ProvisioningError(err.to_string()))?;
    }

    audit::record(
        db.clone(),
        admin_uid,
        format!("Added {} {} with account", req.role, req.name),
    );

    drop(secondary);

    Ok(ProvisionedAccount {
        uid: user.uid,
        name: req.name,
        email: req.email,
        role: req.role,
    })
}

/// Flips `approved` on an existing user record. Safe to repeat; every call
/// lands on the same terminal value.
pub async fn approve_student(db: &Surreal<Any>, admin_uid: &str, uid: &str) -> Result<()> {
    let updated: Option<UserRecord> = db
        .update((USER_TABLE, uid))
        .merge(serde_json::json!({ "approved": true }))
        .await?;
    let updated = updated.ok_or(Error::UserNotFound)?;

    audit::record(
        db.clone(),
        admin_uid,
        format!("Approved student {}", updated.name),
    );

    Ok(())
}

/// Removes a teacher profile, then attempts the matching `users` record as
/// an independent second step. An orphaned `users` record is preferable to a
/// delete action that blocks, so a failure there is only logged.
pub async fn delete_teacher(
    db: &Surreal<Any>,
    admin_uid: &str,
    uid: &str,
) -> Result<TeacherProfile> {
    let removed: Option<TeacherProfile> = db.delete((TEACHER_TABLE, uid)).await?;
    let removed = removed.ok_or(Error::TeacherNotFound)?;

    let users_delete: core::result::Result<Option<UserRecord>, surrealdb::Error> =
        db.delete((USER_TABLE, uid)).await;
    if let Err(err) = users_delete {
        warn!(uid, error = %err, "users record removal failed after teacher delete");
    }

    audit::record(
        db.clone(),
        admin_uid,
        format!("Deleted teacher {}", removed.name),
    );

    Ok(removed)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

pub async fn admin_exists(db: &Surreal<Any>) -> Result<bool> {
    let admins: Vec<UserRecord> = db
        .query("SELECT * FROM type::table($table) WHERE role = $role LIMIT 1")
        .bind(("table", USER_TABLE))
        .bind(("role", Role::Admin))
        .await?
        .take(0)?;
    Ok(!admins.is_empty())
}

/// First-run bootstrap: creates the initial admin account. Refused as soon
/// as any admin record exists.
pub async fn setup_admin(
    db: &Surreal<Any>,
    ctx: &AuthContext,
    req: SetupRequest,
) -> Result<String> {
    req.validate()?;
    if admin_exists(db).await? {
        return Err(Error::SetupAlreadyComplete);
    }

    let user = ctx.create_account(&req.email, &req.password).await?;

    let record = UserRecord {
        uid: user.uid.clone(),
        email: req.email,
        name: req.name,
        role: Role::Admin,
        approved: true,
        created_at: time::now_rfc3339(),
        created_by: None,
    };
    let _: Option<UserRecord> = db
        .create((USER_TABLE, user.uid.as_str()))
        .content(record)
        .await?;

    ctx.sign_out();

    Ok(user.uid)
}
