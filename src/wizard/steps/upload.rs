//! Upload step: attach a CV and send it to the service.

use std::sync::Arc;

use tracing::warn;

use crate::api::DocumentFile;
use crate::error::{ValidationError, WizardError};
use crate::wizard::draft::DraftPatch;

use super::{StepContext, StepOutcome};

/// Extensions the service can ingest.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

const NO_FILE: &str = "Please upload your CV first.";
const UPLOAD_FAILED: &str = "Failed to upload CV. Please try again.";

/// Check a file name against [`ACCEPTED_EXTENSIONS`].
pub fn check_extension(file: &DocumentFile) -> Result<(), ValidationError> {
    match file.metadata.extension() {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::new(
            "file",
            "Unsupported file type. Please upload a PDF, DOC or DOCX file.",
        )),
    }
}

pub struct UploadStep {
    ctx: Arc<StepContext>,
    /// Bytes live here only until the upload succeeds.
    file: Option<DocumentFile>,
    uploading: bool,
}

impl UploadStep {
    pub fn enter(ctx: Arc<StepContext>) -> Self {
        Self {
            ctx,
            file: None,
            uploading: false,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Attach a file. The draft only records it once the upload succeeds.
    pub fn select(&mut self, file: DocumentFile) -> Result<(), WizardError> {
        if let Err(e) = check_extension(&file) {
            self.ctx.notifier.error(&e.message);
            return Err(e.into());
        }
        self.ctx.notifier.success("CV selected");
        self.file = Some(file);
        Ok(())
    }

    /// Name of the file waiting to be uploaded.
    pub fn selected(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.metadata.name.as_str())
    }

    /// Upload the attached file and advance.
    ///
    /// A document uploaded on an earlier visit counts as attached.
    pub async fn submit(&mut self) -> Result<StepOutcome, WizardError> {
        let Some(file) = self.file.as_ref() else {
            if self.ctx.sequencer.draft().await.document.is_some() {
                return Ok(StepOutcome::Advanced(self.ctx.sequencer.next()));
            }
            self.ctx.notifier.error(NO_FILE);
            return Err(ValidationError::new("file", NO_FILE).into());
        };

        let handle = self.ctx.sequencer.draft().await.handle;
        self.uploading = true;
        let result = self.ctx.api.upload_document(&handle, file).await;
        self.uploading = false;

        match result {
            Ok(()) => {
                let metadata = file.metadata.clone();
                self.file = None;
                self.ctx
                    .sequencer
                    .update_draft(DraftPatch {
                        document: Some(Some(metadata)),
                        ..Default::default()
                    })
                    .await;
                self.ctx.notifier.success("CV uploaded successfully!");
                Ok(StepOutcome::Advanced(self.ctx.sequencer.next()))
            }
            Err(e) => {
                warn!(%handle, error = %e, "CV upload failed");
                self.ctx.notifier.error(UPLOAD_FAILED);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::wizard::WizardStep;
    use crate::wizard::steps::fixtures::harness;

    fn cv(name: &str) -> DocumentFile {
        DocumentFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
    }

    #[tokio::test]
    async fn submit_without_file_stays() {
        let h = harness(WizardStep::UploadData);
        let mut step = UploadStep::enter(h.ctx.clone());
        assert!(step.submit().await.is_err());
        assert_eq!(h.notifier.last_error().as_deref(), Some(NO_FILE));
        assert_eq!(h.api.calls("upload_document"), 0);
    }

    #[tokio::test]
    async fn rejects_unknown_extension() {
        let h = harness(WizardStep::UploadData);
        let mut step = UploadStep::enter(h.ctx.clone());
        assert!(step.select(cv("photo.png")).is_err());
        assert!(h.ctx.sequencer.draft().await.document.is_none());
        assert!(step.select(cv("CV.DOCX")).is_ok());
    }

    #[tokio::test]
    async fn upload_success_advances() {
        let h = harness(WizardStep::UploadData);
        h.ctx
            .sequencer
            .update_draft(DraftPatch::handle("alice"))
            .await;
        let mut step = UploadStep::enter(h.ctx.clone());
        step.select(cv("cv.pdf")).unwrap();

        let outcome = step.submit().await.unwrap();
        assert_eq!(outcome, StepOutcome::Advanced(WizardStep::Expertise));
        assert_eq!(
            h.api.last_args("upload_document"),
            Some(vec!["alice".to_string(), "cv.pdf".to_string()])
        );
        assert_eq!(
            h.ctx.sequencer.draft().await.document.map(|d| d.name),
            Some("cv.pdf".to_string())
        );
    }

    #[tokio::test]
    async fn upload_failure_keeps_step_and_file() {
        let h = harness(WizardStep::UploadData);
        h.api.push_upload(Err(ApiError::Transport("reset".into())));
        let mut step = UploadStep::enter(h.ctx.clone());
        step.select(cv("cv.pdf")).unwrap();

        assert!(step.submit().await.is_err());
        assert_eq!(h.notifier.last_error().as_deref(), Some(UPLOAD_FAILED));
        assert_eq!(h.ctx.sequencer.current_step(), WizardStep::UploadData);

        // Manual retry goes through.
        assert!(step.submit().await.is_ok());
        assert_eq!(h.api.calls("upload_document"), 2);
    }

    #[tokio::test]
    async fn failed_upload_does_not_count_on_revisit() {
        let h = harness(WizardStep::UploadData);
        h.api.push_upload(Err(ApiError::Transport("reset".into())));
        let mut step = UploadStep::enter(h.ctx.clone());
        step.select(cv("cv.pdf")).unwrap();
        assert!(step.submit().await.is_err());
        assert!(h.ctx.sequencer.draft().await.document.is_none());

        // Leave and come back without a new file.
        let mut again = UploadStep::enter(h.ctx.clone());
        assert!(again.selected().is_none());
        assert!(again.submit().await.is_err());
        assert_eq!(h.notifier.last_error().as_deref(), Some(NO_FILE));
        assert_eq!(h.ctx.sequencer.current_step(), WizardStep::UploadData);
        assert_eq!(h.api.calls("upload_document"), 1);
    }

    #[tokio::test]
    async fn successful_upload_counts_on_revisit() {
        let h = harness(WizardStep::UploadData);
        let mut step = UploadStep::enter(h.ctx.clone());
        step.select(cv("cv.pdf")).unwrap();
        step.submit().await.unwrap();
        h.ctx.sequencer.back();

        let mut again = UploadStep::enter(h.ctx.clone());
        assert_eq!(
            again.submit().await.unwrap(),
            StepOutcome::Advanced(WizardStep::Expertise)
        );
        assert_eq!(h.api.calls("upload_document"), 1);
    }
}
