mod document_service;

pub use document_service::{DocumentService, DocumentServiceError, DriveFile, DriveUpload};
