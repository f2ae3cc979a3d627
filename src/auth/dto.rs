use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{auth::repo_types::User, error::ApiError};

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `PUT /account`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(deserialize_with = "present")]
    pub phone: Option<Option<String>>,
}

/// Marks a field as present even when its value is `null`, so the outer
/// `Option` tells "omitted" apart from "sent as null".
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn required(value: Option<String>) -> Result<String, ApiError> {
    value.filter(|v| !v.is_empty()).ok_or(ApiError::Validation)
}

fn non_empty_if_present(value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) if v.is_empty() => Err(ApiError::Validation),
        other => Ok(other),
    }
}

#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Validated profile edit; `password` is still plaintext here.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<Option<String>>,
}

impl TryFrom<RegisterRequest> for NewAccount {
    type Error = ApiError;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        let name = required(req.name)?;
        let email = normalize_email(&required(req.email)?);
        if email.is_empty() {
            return Err(ApiError::Validation);
        }
        let password = required(req.password)?;
        Ok(Self {
            name,
            email,
            password,
            phone: req.phone.filter(|p| !p.is_empty()),
        })
    }
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = ApiError;

    fn try_from(req: LoginRequest) -> Result<Self, Self::Error> {
        let email = normalize_email(&required(req.email)?);
        if email.is_empty() {
            return Err(ApiError::Validation);
        }
        Ok(Self {
            email,
            password: required(req.password)?,
        })
    }
}

impl TryFrom<UpdateProfileRequest> for ProfileChanges {
    type Error = ApiError;

    fn try_from(req: UpdateProfileRequest) -> Result<Self, Self::Error> {
        let email = match non_empty_if_present(req.email)? {
            Some(raw) => {
                let email = normalize_email(&raw);
                if email.is_empty() {
                    return Err(ApiError::Validation);
                }
                Some(email)
            }
            None => None,
        };
        Ok(Self {
            name: non_empty_if_present(req.name)?,
            email,
            password: non_empty_if_present(req.password)?,
            phone: req.phone.map(|p| p.filter(|v| !v.is_empty())),
        })
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
        }
    }
}

/// Success envelope shared by every account operation.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

impl AccountResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
            token: None,
            user: None,
        }
    }

    pub fn with_user(message: &'static str, user: impl Into<PublicUser>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::ok(message)
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse<T: for<'de> Deserialize<'de>>(value: serde_json::Value) -> T {
        serde_json::from_value(value).expect("deserialize")
    }

    #[test]
    fn register_requires_name_email_and_password() {
        for body in [
            json!({}),
            json!({"email": "a@x.com", "password": "p"}),
            json!({"name": "A", "password": "p"}),
            json!({"name": "A", "email": "a@x.com"}),
            json!({"name": "", "email": "a@x.com", "password": "p"}),
            json!({"name": "A", "email": "a@x.com", "password": null}),
            json!({"name": "A", "email": "   ", "password": "p"}),
        ] {
            let req: RegisterRequest = parse(body.clone());
            assert!(NewAccount::try_from(req).is_err(), "accepted {body}");
        }
    }

    #[test]
    fn register_normalizes_email_and_defaults_phone() {
        let req: RegisterRequest = parse(json!({
            "name": "A", "email": "  Mixed@Example.COM ", "password": "p1", "phone": ""
        }));
        let account = NewAccount::try_from(req).unwrap();
        assert_eq!(account.email, "mixed@example.com");
        assert_eq!(account.phone, None);
    }

    #[test]
    fn login_normalizes_email() {
        let req: LoginRequest = parse(json!({"email": "A@X.com", "password": "p"}));
        let creds = LoginCredentials::try_from(req).unwrap();
        assert_eq!(creds.email, "a@x.com");
        let req: LoginRequest = parse(json!({"email": "a@x.com"}));
        assert!(LoginCredentials::try_from(req).is_err());
    }

    #[test]
    fn update_distinguishes_omitted_phone_from_null() {
        let omitted: UpdateProfileRequest = parse(json!({"name": "B"}));
        assert_eq!(omitted.phone, None);
        let cleared: UpdateProfileRequest = parse(json!({"phone": null}));
        assert_eq!(cleared.phone, Some(None));
        let set: UpdateProfileRequest = parse(json!({"phone": "555"}));
        assert_eq!(set.phone, Some(Some("555".to_string())));

        let changes = ProfileChanges::try_from(parse::<UpdateProfileRequest>(json!({"phone": ""})))
            .unwrap();
        assert_eq!(changes.phone, Some(None));
    }

    #[test]
    fn update_rejects_empty_strings_but_ignores_nulls() {
        for body in [json!({"name": ""}), json!({"email": ""}), json!({"password": ""})] {
            let req: UpdateProfileRequest = parse(body.clone());
            assert!(ProfileChanges::try_from(req).is_err(), "accepted {body}");
        }
        let req: UpdateProfileRequest = parse(json!({"name": null, "email": "B@X.com"}));
        let changes = ProfileChanges::try_from(req).unwrap();
        assert_eq!(changes.name, None);
        assert_eq!(changes.email.as_deref(), Some("b@x.com"));
    }

    #[test]
    fn public_user_serializes_null_phone_and_no_password() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            phone: None,
        };
        let json = serde_json::to_value(AccountResponse::with_user("ok", user)).unwrap();
        assert_eq!(json["user"]["phone"], serde_json::Value::Null);
        assert!(json["user"].get("password").is_none());
        assert!(json["user"].get("password_hash").is_none());
        assert!(json.get("token").is_none());
    }
}
