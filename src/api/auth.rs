use reqwest::multipart::{Form, Part};
use reqwest::Method;

use super::{
    path_segment, ApiClient, ApiError, CurrentUser, EmailRequest, ImageUpload, LoginRequest, LoginResponse,
    ManagerAssignment, MessageResponse, PasswordRequest, ProfileUpdate, Registration, User,
    UserSummary,
};

fn image_part(image: &ImageUpload) -> Result<Part, ApiError> {
    Ok(Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime)?)
}

impl ApiClient {
    /// Exchange credentials for a login token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.send_json(Method::POST, "/auth/login", &body).await?;
        Ok(response.token)
    }

    pub async fn register(
        &self,
        registration: &Registration,
        image: Option<&ImageUpload>,
    ) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("name", registration.name.clone())
            .text("email", registration.email.clone())
            .text("password", registration.password.clone())
            .text("role", registration.role.as_str())
            .text("department", registration.department.clone())
            .text("location", registration.location.clone());
        if let Some(image) = image {
            form = form.part("image", image_part(image)?);
        }
        self.send_multipart_unit(Method::POST, "/auth/register", form)
            .await
    }

    pub async fn request_reset(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = EmailRequest {
            email: email.to_string(),
        };
        self.send_json(Method::POST, "/auth/request-reset", &body).await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<MessageResponse, ApiError> {
        let body = PasswordRequest {
            password: password.to_string(),
        };
        let path = format!("/auth/reset-password/{}", path_segment(token)?);
        self.send_json(Method::POST, &path, &body).await
    }

    pub async fn me(&self) -> Result<CurrentUser, ApiError> {
        self.require_session()?;
        self.get("/auth/me").await
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.require_session()?;
        self.get("/auth/users").await
    }

    /// Employees currently mapped to `manager_id`
    pub async fn manager_employees(&self, manager_id: &str) -> Result<Vec<UserSummary>, ApiError> {
        self.require_session()?;
        self.get(&format!("/auth/users/manager/{}", path_segment(manager_id)?))
            .await
    }

    pub async fn assign_manager(&self, employee_id: &str, manager_id: &str) -> Result<(), ApiError> {
        self.require_session()?;
        let body = ManagerAssignment {
            manager_id: manager_id.to_string(),
        };
        let path = format!("/auth/users/{}/assign-manager", path_segment(employee_id)?);
        self.send_json_unit(Method::PATCH, &path, &body).await
    }

    pub async fn unassign_manager(&self, employee_id: &str, manager_id: &str) -> Result<(), ApiError> {
        self.require_session()?;
        let body = ManagerAssignment {
            manager_id: manager_id.to_string(),
        };
        let path = format!("/auth/users/{}/unassign-manager", path_segment(employee_id)?);
        self.send_json_unit(Method::PATCH, &path, &body).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.require_session()?;
        self.send_json_unit(Method::PATCH, "/auth/update-profile", update)
            .await
    }

    pub async fn update_image(&self, image: &ImageUpload) -> Result<(), ApiError> {
        self.require_session()?;
        let form = Form::new().part("image", image_part(image)?);
        self.send_multipart_unit(Method::PATCH, "/auth/update-image", form)
            .await
    }
}
