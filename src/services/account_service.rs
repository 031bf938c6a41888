use std::sync::OnceLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Collection;
use regex::Regex;

use crate::db::mongo::{Store, ADMINS};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::Claims;
use crate::models::admin::{Admin, PasswordChange, ProfileUpdate, SignupRequest, ADMIN_ROLE};
use crate::services::image_service::{self, BlobStore};

pub const MIN_PASSWORD_LENGTH: usize = 6;
const TOKEN_LIFETIME_HOURS: i64 = 24;
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> ApiResult<&'static Regex> {
    static EMAIL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN))
        .as_ref()
        .map_err(|e| ApiError::Internal(format!("Email pattern failed to compile: {}", e)))
}

pub fn is_valid_email(email: &str) -> ApiResult<bool> {
    Ok(email_regex()?.is_match(email))
}

fn weak_password() -> ApiError {
    ApiError::Validation("Password is too weak. Use at least 6 characters.".to_string())
}

/// Checks run in a fixed order so the first problem reported is always the
/// same one the console form shows.
pub fn validate_signup(request: &SignupRequest) -> ApiResult<()> {
    if request.password != request.confirm_password {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(weak_password());
    }
    if !is_valid_email(request.email.trim())? {
        return Err(ApiError::Validation("Invalid email address format.".to_string()));
    }
    if request.full_name.trim().is_empty() {
        return Err(ApiError::missing_fields());
    }
    Ok(())
}

/// Six ASCII digits, nothing else.
pub fn verify_two_factor_code(code: &str) -> ApiResult<()> {
    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Please enter a valid 6-digit verification code.".to_string(),
        ))
    }
}

pub fn generate_token(email: &str, admin_id: ObjectId, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize,
        admin_id: admin_id.to_hex(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}

#[allow(async_fn_in_trait)]
pub trait AdminRepository {
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<Admin>>;
    async fn find_by_id(&self, id: &ObjectId) -> ApiResult<Option<Admin>>;
    async fn insert(&self, admin: &Admin) -> ApiResult<ObjectId>;
    async fn update_fields(&self, id: &ObjectId, fields: Document) -> ApiResult<()>;
}

pub struct MongoAdminRepository {
    admins: Collection<Admin>,
}

impl MongoAdminRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            admins: store.collection(ADMINS),
        }
    }
}

impl AdminRepository for MongoAdminRepository {
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<Admin>> {
        Ok(self.admins.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> ApiResult<Option<Admin>> {
        Ok(self.admins.find_one(doc! { "_id": id }).await?)
    }

    async fn insert(&self, admin: &Admin) -> ApiResult<ObjectId> {
        let result = self.admins.insert_one(admin).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ApiError::Internal("Inserted admin has no ObjectId".to_string()))
    }

    async fn update_fields(&self, id: &ObjectId, fields: Document) -> ApiResult<()> {
        self.admins
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(())
    }
}

pub async fn signup<R: AdminRepository>(repo: &R, request: SignupRequest, secret: &str) -> ApiResult<String> {
    validate_signup(&request)?;

    let email = request.email.trim().to_lowercase();
    if repo.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "Email is already in use by another account.".to_string(),
        ));
    }

    let now = DateTime::now();
    let admin = Admin {
        id: None,
        full_name: request.full_name.trim().to_string(),
        email: email.clone(),
        password: bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)?,
        phone_number: None,
        profile_image_url: None,
        role: ADMIN_ROLE.to_string(),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let admin_id = repo.insert(&admin).await?;
    log::info!("Registered admin {}", email);
    Ok(generate_token(&email, admin_id, secret)?)
}

pub async fn signin<R: AdminRepository>(repo: &R, email: &str, password: &str, secret: &str) -> ApiResult<String> {
    let email = email.trim().to_lowercase();

    let admin = repo
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user found with this email address.".to_string()))?;

    if !bcrypt::verify(password, &admin.password).unwrap_or(false) {
        log::warn!("Failed sign-in for {}", email);
        return Err(ApiError::Unauthorized("Incorrect password.".to_string()));
    }

    let admin_id = admin
        .id
        .ok_or_else(|| ApiError::Internal("Stored admin has no id".to_string()))?;
    Ok(generate_token(&admin.email, admin_id, secret)?)
}

pub async fn load_admin<R: AdminRepository>(repo: &R, admin_id: &ObjectId) -> ApiResult<Admin> {
    repo.find_by_id(admin_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))
}

/// The confirmation is compared before the current password is checked, so a
/// typo never costs a bcrypt round or a failed re-authentication.
pub async fn change_password<R: AdminRepository>(
    repo: &R,
    admin_id: &ObjectId,
    change: &PasswordChange,
) -> ApiResult<()> {
    if change.new_password != change.confirm_password {
        return Err(ApiError::Validation(
            "New password and confirmation do not match.".to_string(),
        ));
    }
    if change.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(weak_password());
    }

    let admin = load_admin(repo, admin_id).await?;
    if !bcrypt::verify(&change.current_password, &admin.password).unwrap_or(false) {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect.".to_string(),
        ));
    }

    let hash = bcrypt::hash(&change.new_password, bcrypt::DEFAULT_COST)?;
    repo.update_fields(admin_id, doc! { "password": hash, "updated_at": DateTime::now() })
        .await?;

    log::info!("Password changed for admin {}", admin_id);
    Ok(())
}

pub async fn update_profile<R: AdminRepository, B: BlobStore>(
    repo: &R,
    blobs: Option<&B>,
    admin_id: &ObjectId,
    update: ProfileUpdate,
) -> ApiResult<Admin> {
    let full_name = update.full_name.as_deref().map(str::trim);
    if full_name == Some("") {
        return Err(ApiError::missing_fields());
    }

    let existing = load_admin(repo, admin_id).await?;

    let mut fields = doc! { "updated_at": DateTime::now() };
    if let Some(full_name) = full_name {
        fields.insert("full_name", full_name);
    }
    if let Some(phone_number) = update.phone_number.as_deref() {
        fields.insert("phone_number", phone_number.trim());
    }

    let mut replaced_image = false;
    if let Some(image) = update.image {
        let blobs =
            blobs.ok_or_else(|| ApiError::Internal("Image storage is not configured".to_string()))?;
        let object_name =
            image_service::admin_object_name(&admin_id.to_hex(), Utc::now().timestamp_millis());
        let url = blobs.upload(&object_name, image).await?;
        fields.insert("profile_image_url", url);
        replaced_image = true;
    }

    repo.update_fields(admin_id, fields).await?;

    if replaced_image {
        image_service::delete_quietly(blobs, existing.profile_image_url.as_deref()).await;
    }

    load_admin(repo, admin_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryAdmins {
        admins: Mutex<Vec<Admin>>,
        ops: Mutex<Vec<&'static str>>,
    }

    impl InMemoryAdmins {
        fn with_admin(password: &str) -> (Self, ObjectId) {
            let id = ObjectId::new();
            let repo = Self::default();
            repo.admins.lock().unwrap().push(Admin {
                id: Some(id),
                full_name: "Console Admin".to_string(),
                email: "admin@example.com".to_string(),
                password: bcrypt::hash(password, 4).unwrap(),
                phone_number: None,
                profile_image_url: None,
                role: ADMIN_ROLE.to_string(),
                created_at: None,
                updated_at: None,
            });
            (repo, id)
        }

        fn ops(&self) -> Vec<&'static str> {
            self.ops.lock().unwrap().clone()
        }
    }

    impl AdminRepository for InMemoryAdmins {
        async fn find_by_email(&self, email: &str) -> ApiResult<Option<Admin>> {
            self.ops.lock().unwrap().push("find_by_email");
            Ok(self.admins.lock().unwrap().iter().find(|a| a.email == email).cloned())
        }

        async fn find_by_id(&self, id: &ObjectId) -> ApiResult<Option<Admin>> {
            self.ops.lock().unwrap().push("find_by_id");
            Ok(self.admins.lock().unwrap().iter().find(|a| a.id == Some(*id)).cloned())
        }

        async fn insert(&self, admin: &Admin) -> ApiResult<ObjectId> {
            self.ops.lock().unwrap().push("insert");
            let id = ObjectId::new();
            let mut admin = admin.clone();
            admin.id = Some(id);
            self.admins.lock().unwrap().push(admin);
            Ok(id)
        }

        async fn update_fields(&self, id: &ObjectId, fields: Document) -> ApiResult<()> {
            self.ops.lock().unwrap().push("update_fields");
            let mut admins = self.admins.lock().unwrap();
            if let Some(admin) = admins.iter_mut().find(|a| a.id == Some(*id)) {
                if let Ok(password) = fields.get_str("password") {
                    admin.password = password.to_string();
                }
                if let Ok(full_name) = fields.get_str("full_name") {
                    admin.full_name = full_name.to_string();
                }
            }
            Ok(())
        }
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            full_name: "Nguyen Van A".to_string(),
            email: "a@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_validate_signup_order() {
        let mut request = signup_request();
        request.confirm_password = "other".to_string();
        request.password = "abc".to_string();
        request.email = "broken".to_string();
        assert_eq!(validate_signup(&request).unwrap_err().to_string(), "Passwords do not match");

        let mut request = signup_request();
        request.password = "abc".to_string();
        request.confirm_password = "abc".to_string();
        request.email = "broken".to_string();
        assert_eq!(
            validate_signup(&request).unwrap_err().to_string(),
            "Password is too weak. Use at least 6 characters."
        );

        let mut request = signup_request();
        request.email = "broken@".to_string();
        assert_eq!(
            validate_signup(&request).unwrap_err().to_string(),
            "Invalid email address format."
        );

        assert!(validate_signup(&signup_request()).is_ok());
    }

    #[test]
    fn test_is_valid_email() {
        assert!(email_regex().is_ok());
        assert!(is_valid_email("a@example.com").unwrap());
        assert!(is_valid_email("first.last@sub.example.vn").unwrap());
        assert!(!is_valid_email("a@example").unwrap());
        assert!(!is_valid_email("a b@example.com").unwrap());
        assert!(!is_valid_email("").unwrap());
    }

    #[test]
    fn test_two_factor_code_format() {
        assert!(verify_two_factor_code("123456").is_ok());
        for code in ["12345", "1234567", "12a456", "", "１２３４５６"] {
            assert_eq!(
                verify_two_factor_code(code).unwrap_err().to_string(),
                "Please enter a valid 6-digit verification code."
            );
        }
    }

    #[test]
    fn test_generated_token_round_trips_claims() {
        let id = ObjectId::new();
        let token = generate_token("admin@example.com", id, "test_secret").unwrap();
        let claims = decode_token(&token, "test_secret").unwrap();

        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.admin_id, id.to_hex());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert!(decode_token(&token, "another_secret").is_err());
    }

    #[actix_rt::test]
    async fn test_signup_rejects_duplicate_email() {
        let (repo, _) = InMemoryAdmins::with_admin("secret1");
        let mut request = signup_request();
        request.email = "Admin@Example.com".to_string();

        let err = signup(&repo, request, "test_secret").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.to_string(), "Email is already in use by another account.");
        assert_eq!(repo.ops(), vec!["find_by_email"]);
    }

    #[actix_rt::test]
    async fn test_signin_errors() {
        let (repo, _) = InMemoryAdmins::with_admin("secret1");

        let err = signin(&repo, "nobody@example.com", "secret1", "s").await.unwrap_err();
        assert_eq!(err.to_string(), "No user found with this email address.");

        let err = signin(&repo, "admin@example.com", "wrong!", "s").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Incorrect password.");

        assert!(signin(&repo, " ADMIN@example.com", "secret1", "s").await.is_ok());
    }

    #[actix_rt::test]
    async fn test_password_mismatch_is_rejected_before_reauthentication() {
        let (repo, id) = InMemoryAdmins::with_admin("secret1");
        let change = PasswordChange {
            current_password: "wrong-current".to_string(),
            new_password: "newsecret".to_string(),
            confirm_password: "newsecret2".to_string(),
        };

        let err = change_password(&repo, &id, &change).await.unwrap_err();
        assert_eq!(err.to_string(), "New password and confirmation do not match.");
        assert!(repo.ops().is_empty());
    }

    #[actix_rt::test]
    async fn test_change_password_checks_current_password() {
        let (repo, id) = InMemoryAdmins::with_admin("secret1");

        let wrong = PasswordChange {
            current_password: "nope".to_string(),
            new_password: "newsecret".to_string(),
            confirm_password: "newsecret".to_string(),
        };
        let err = change_password(&repo, &id, &wrong).await.unwrap_err();
        assert_eq!(err.to_string(), "Current password is incorrect.");
        assert_eq!(repo.ops(), vec!["find_by_id"]);

        let short = PasswordChange {
            current_password: "secret1".to_string(),
            new_password: "abc".to_string(),
            confirm_password: "abc".to_string(),
        };
        assert!(matches!(
            change_password(&repo, &id, &short).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[actix_rt::test]
    async fn test_update_profile_requires_a_name_when_given() {
        let (repo, id) = InMemoryAdmins::with_admin("secret1");
        let update = ProfileUpdate {
            full_name: Some("  ".to_string()),
            ..Default::default()
        };
        let result =
            update_profile::<_, crate::services::image_service::ImageService>(&repo, None, &id, update).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(repo.ops().is_empty());

        let update = ProfileUpdate {
            full_name: Some("Tran Thi B".to_string()),
            ..Default::default()
        };
        let admin =
            update_profile::<_, crate::services::image_service::ImageService>(&repo, None, &id, update)
                .await
                .unwrap();
        assert_eq!(admin.full_name, "Tran Thi B");
    }
}
