//! Profile page: details, edits and the avatar.

use std::path::Path;
use tracing::info;

use crate::access::{landing_route, Route};
use crate::api::{CurrentUser, ImageUpload, ProfileUpdate};
use crate::error::{FieldErrors, PortalError};
use crate::Portal;

/// Largest avatar accepted for upload
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Check size and type of an image before it is uploaded
pub fn validate_image(size: u64, mime: &str) -> Result<(), PortalError> {
    if size > MAX_IMAGE_BYTES {
        return FieldErrors::message("Image size should be less than 5MB").finish();
    }
    if !mime.starts_with("image/") {
        return FieldErrors::message("Please select a valid image file").finish();
    }
    Ok(())
}

/// Read an image file from disk, refusing oversized or non-image files
pub async fn read_image(path: &Path) -> Result<ImageUpload, PortalError> {
    let metadata = tokio::fs::metadata(path).await?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    validate_image(metadata.len(), mime.essence_str())?;

    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(ImageUpload {
        file_name,
        mime: mime.essence_str().to_string(),
        bytes,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ProfileView {
    user: Option<CurrentUser>,
    /// Editable copy of the profile fields
    pub form: ProfileUpdate,
}

impl ProfileView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        match portal.api().me().await {
            Ok(user) => {
                self.form = ProfileUpdate {
                    name: user.name.clone(),
                    department: user.department.clone(),
                    location: user.location.clone(),
                    email: user.email.clone(),
                };
                self.user = Some(user);
                Ok(())
            }
            Err(e) => {
                portal.notifier().error("Failed to load profile");
                Err(e.into())
            }
        }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Public URL of the current avatar
    pub fn avatar_url(&self, portal: &Portal) -> Option<String> {
        let image = self.user.as_ref()?.image.as_deref()?;
        if image.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}",
            portal.config.api.uploads_url.trim_end_matches('/'),
            image
        ))
    }

    /// Save the edited fields, then reload the profile
    pub async fn save(&mut self, portal: &Portal) -> Result<(), PortalError> {
        if let Err(e) = portal.api().update_profile(&self.form).await {
            portal.notifier().error("Failed to update profile");
            return Err(e.into());
        }
        info!("Profile updated");
        portal.notifier().success("Profile updated successfully!");
        self.load(portal).await
    }

    /// Upload a new avatar from `path`, then reload the profile
    pub async fn upload_avatar(&mut self, portal: &Portal, path: &Path) -> Result<(), PortalError> {
        let image = match read_image(path).await {
            Ok(image) => image,
            Err(e) => {
                portal.notifier().error(e.to_string());
                return Err(e);
            }
        };

        if let Err(e) = portal.api().update_image(&image).await {
            portal.notifier().error("Failed to update image");
            return Err(e.into());
        }
        info!(file = %image.file_name, bytes = image.bytes.len(), "Avatar uploaded");
        portal
            .notifier()
            .success("Profile image updated successfully!");
        self.load(portal).await
    }

    /// Where the back button leads
    pub fn back_route(&self, portal: &Portal) -> Route {
        let role = self
            .user
            .as_ref()
            .and_then(|u| u.role)
            .or_else(|| portal.role());
        landing_route(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationKind;
    use crate::test_support::StubBackend;
    use serde_json::json;

    fn me() -> serde_json::Value {
        json!({"_id": "u1", "name": "Ada", "email": "ada@corp.test", "department": "IT",
               "location": "Accra", "image": "ada.png", "role": "manager",
               "mappedEmployees": [{"_id": "e1", "name": "Bo"}]})
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image(1024, "image/png").is_ok());
        assert_eq!(
            validate_image(MAX_IMAGE_BYTES + 1, "image/png").unwrap_err().to_string(),
            "Image size should be less than 5MB"
        );
        assert_eq!(
            validate_image(10, "application/pdf").unwrap_err().to_string(),
            "Please select a valid image file"
        );
    }

    #[tokio::test]
    async fn test_load_and_avatar_url() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/auth/me", 200, me());
        let portal = backend.portal("manager");

        let mut profile = ProfileView::new();
        profile.load(&portal).await.unwrap();
        assert_eq!(profile.form.location, "Accra");
        assert_eq!(
            profile.avatar_url(&portal).as_deref(),
            Some("http://localhost:5000/uploads/ada.png")
        );
        assert_eq!(profile.back_route(&portal), Route::Manager);
    }

    #[tokio::test]
    async fn test_save_then_reload() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/auth/me", 200, me());
        backend.on("PATCH", "/auth/update-profile", 200, json!({"msg": "ok"}));
        let portal = backend.portal("manager");

        let mut profile = ProfileView::new();
        profile.load(&portal).await.unwrap();
        profile.form.location = "Kumasi".to_string();
        profile.save(&portal).await.unwrap();

        assert_eq!(
            backend.last_body("PATCH", "/auth/update-profile"),
            Some(json!({"name": "Ada", "department": "IT", "location": "Kumasi", "email": "ada@corp.test"}))
        );
        assert_eq!(backend.count("GET", "/auth/me"), 2);
    }

    #[tokio::test]
    async fn test_avatar_checked_before_upload() {
        let backend = StubBackend::start().await;
        let portal = backend.portal("employee");
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("cv.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let mut profile = ProfileView::new();
        assert!(profile.upload_avatar(&portal, &pdf).await.is_err());
        assert_eq!(backend.count("PATCH", "/auth/update-image"), 0);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Error).as_deref(),
            Some("Please select a valid image file")
        );
    }

    #[tokio::test]
    async fn test_avatar_upload() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/auth/me", 200, me());
        backend.on("PATCH", "/auth/update-image", 200, json!({"image": "new.png"}));
        let portal = backend.portal("manager");
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("me.png");
        std::fs::write(&png, [0x89, b'P', b'N', b'G']).unwrap();

        let mut profile = ProfileView::new();
        profile.upload_avatar(&portal, &png).await.unwrap();
        assert_eq!(backend.count("PATCH", "/auth/update-image"), 1);
        assert!(profile.user().is_some());
        assert_eq!(
            backend.last_form("PATCH", "/auth/update-image").unwrap(),
            [("image".to_string(), "me.png".to_string())]
        );
    }

    #[tokio::test]
    async fn test_avatar_upload_with_empty_reply() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/auth/me", 200, me());
        backend.on_empty("PATCH", "/auth/update-image", 200);
        let portal = backend.portal("employee");
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("me.png");
        std::fs::write(&png, [0x89, b'P', b'N', b'G']).unwrap();

        let mut profile = ProfileView::new();
        tokio_test::assert_ok!(profile.upload_avatar(&portal, &png).await);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Success).as_deref(),
            Some("Profile image updated successfully!")
        );
        assert_eq!(backend.count("GET", "/auth/me"), 1);
    }
}
