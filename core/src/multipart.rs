//! Single-file `multipart/form-data` bodies for image uploads.
//!
//! The backend accepts exactly one part named `file`. The body is written
//! by hand rather than through a form library because the host may execute
//! the request itself and needs the raw bytes.

use uuid::Uuid;

pub const PHOTO_FIELD: &str = "file";
pub const PHOTO_FILENAME: &str = "photo.jpg";
pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub struct MultipartUpload {
    boundary: String,
    field: String,
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

impl MultipartUpload {
    /// A JPEG photo upload with a random boundary.
    pub fn jpeg_photo(data: Vec<u8>) -> Self {
        Self {
            boundary: Uuid::new_v4().to_string(),
            field: PHOTO_FIELD.to_string(),
            filename: PHOTO_FILENAME.to_string(),
            content_type: PHOTO_CONTENT_TYPE.to_string(),
            data,
        }
    }

    pub fn with_boundary(mut self, boundary: &str) -> Self {
        self.boundary = boundary.to_string();
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.data.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                self.field, self.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.content_type).as_bytes());
        body.extend_from_slice(&self.data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", self.boundary).as_bytes());
        body
    }
}
