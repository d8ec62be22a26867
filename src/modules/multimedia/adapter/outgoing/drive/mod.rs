mod document_service_drive;

pub use document_service_drive::GoogleDriveDocumentService;
