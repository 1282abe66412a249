//! Request bodies the gateway checks before contacting the upstream.
//!
//! Only shape is checked here. The forwarded body is always the caller's
//! original JSON, so fields these structs ignore still reach the upstream.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::{Validate, ValidationErrors};

/// Body check run by a proxy route before forwarding
pub type Validator = fn(&JsonValue) -> Result<(), FieldErrors>;

/// Field name to human-readable messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Errors about the body as a whole rather than a single field
    pub fn body(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add("body", message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Self::default();
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Deserialize `body` as `T` and run its validation rules.
pub fn validate_as<T>(body: &JsonValue) -> Result<(), FieldErrors>
where
    T: DeserializeOwned + Validate,
{
    if !body.is_object() {
        return Err(FieldErrors::body("Se esperaba un objeto JSON"));
    }
    let parsed: T = serde_json::from_value(body.clone())
        .map_err(|e| FieldErrors::body(format!("Formato inválido: {e}")))?;
    parsed.validate().map_err(FieldErrors::from)
}

/// POST /auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

/// POST /auth/register
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "El apellido es obligatorio"))]
    pub last_name: String,
}

/// POST /users
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "El apellido es obligatorio"))]
    pub last_name: String,

    #[validate(length(min = 1, message = "El rol no puede estar vacío"))]
    pub role_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_accepts_valid_credentials() {
        let body = json!({"email": "admin@clinic.test", "password": "secret"});
        assert!(validate_as::<LoginRequest>(&body).is_ok());
    }

    #[test]
    fn login_reports_each_bad_field() {
        let errors = validate_as::<LoginRequest>(&json!({"email": "nope"})).unwrap_err();
        assert_eq!(errors.get("email").unwrap(), ["Correo electrónico inválido"]);
        assert_eq!(errors.get("password").unwrap(), ["La contraseña es obligatoria"]);
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        let errors = validate_as::<LoginRequest>(&json!(["a"])).unwrap_err();
        assert_eq!(errors.get("body").unwrap(), ["Se esperaba un objeto JSON"]);
    }

    #[test]
    fn wrong_field_types_are_a_body_error() {
        let errors = validate_as::<LoginRequest>(&json!({"email": 5, "password": "x"})).unwrap_err();
        assert!(errors.get("body").is_some());
    }

    #[test]
    fn create_user_allows_extra_fields() {
        let body = json!({
            "email": "doc@clinic.test",
            "password": "123456",
            "firstName": "Ana",
            "lastName": "Pérez",
            "roleId": "r1",
            "phone": "555-0100"
        });
        assert!(validate_as::<CreateUserRequest>(&body).is_ok());
    }

    #[test]
    fn create_user_rejects_short_password() {
        let body = json!({
            "email": "doc@clinic.test",
            "password": "123",
            "firstName": "Ana",
            "lastName": "Pérez"
        });
        let errors = validate_as::<CreateUserRequest>(&body).unwrap_err();
        assert_eq!(
            errors.get("password").unwrap(),
            ["La contraseña debe tener al menos 6 caracteres"]
        );
    }

    #[test]
    fn field_errors_serialize_as_a_map() {
        let mut errors = FieldErrors::default();
        errors.add("email", "bad");
        assert_eq!(serde_json::to_value(&errors).unwrap(), json!({"email": ["bad"]}));
    }
}
