//! `multipart/form-data` encoding for uploads.

use std::path::Path;
use uuid::Uuid;

use super::{ApiError, ApiResult};

const CRLF: &str = "\r\n";

/// A form body under construction.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("rollcall-{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(name, None);
        self.body.extend_from_slice(CRLF.as_bytes());
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(CRLF.as_bytes());
        self
    }

    /// Attach a file from disk under its own file name.
    pub fn file(self, name: &str, path: &Path) -> ApiResult<Self> {
        let data = std::fs::read(path).map_err(|e| ApiError::io(path, e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(self.bytes(name, &filename, content_type_for(path), &data))
    }

    pub fn bytes(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.open_part(name, Some(filename));
        self.body
            .extend_from_slice(format!("Content-Type: {}{}{}", content_type, CRLF, CRLF).as_bytes());
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(CRLF.as_bytes());
        self
    }

    /// Close the body, returning the `Content-Type` header value and payload.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--{}", self.boundary, CRLF).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }

    fn open_part(&mut self, name: &str, filename: Option<&str>) {
        let mut header = format!(
            "--{}{}Content-Disposition: form-data; name=\"{}\"",
            self.boundary,
            CRLF,
            escape(name)
        );
        if let Some(filename) = filename {
            header.push_str(&format!("; filename=\"{}\"", escape(filename)));
        }
        header.push_str(CRLF);
        self.body.extend_from_slice(header.as_bytes());
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

/// MIME type for an upload, derived from the image format of its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_and_file_parts() {
        let (content_type, body) = MultipartForm::with_boundary("XYZ")
            .text("name", "Ada Lovelace")
            .bytes("file", "ada.png", "image/png", b"\x89PNG")
            .finish();

        assert_eq!(content_type, "multipart/form-data; boundary=XYZ");
        let mut expected = Vec::new();
        expected.extend_from_slice(b"--XYZ\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nAda Lovelace\r\n");
        expected.extend_from_slice(
            b"--XYZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"ada.png\"\r\nContent-Type: image/png\r\n\r\n\x89PNG\r\n",
        );
        expected.extend_from_slice(b"--XYZ--\r\n");
        assert_eq!(body, expected);
    }

    #[test]
    fn test_filename_quotes_are_escaped() {
        let (_, body) = MultipartForm::with_boundary("B")
            .bytes("file", "a\"b.jpg", "image/jpeg", b"")
            .finish();
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("filename=\"a%22b.jpg\""));
    }

    #[test]
    fn test_file_part_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class.jpg");
        std::fs::File::create(&path).unwrap().write_all(b"jpegdata").unwrap();

        let (_, body) = MultipartForm::with_boundary("B").file("file", &path).unwrap().finish();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("filename=\"class.jpg\""));
        assert!(text.contains("Content-Type: image/jpeg"));
        assert!(text.contains("jpegdata"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = MultipartForm::new().file("file", Path::new("/nonexistent/photo.png"));
        assert!(matches!(result, Err(ApiError::Io { .. })));
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(content_type_for(Path::new("a.png")), "image/png");
        assert_eq!(content_type_for(Path::new("notes.xyz")), "application/octet-stream");
    }

    #[test]
    fn test_boundaries_are_unique() {
        let (a, _) = MultipartForm::new().finish();
        let (b, _) = MultipartForm::new().finish();
        assert_ne!(a, b);
    }
}
