use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Values merged into the offer letter template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferLetterContext {
    pub candidate_name: String,
    pub candidate_email: String,
    pub company_name: String,
    pub signatory: String,
    pub job_title: String,
    pub offered_salary: String,
    pub joining_date: NaiveDate,
    pub message: String,
    pub issued_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub trait OfferDocumentRenderer: Send + Sync {
    fn render(&self, context: &OfferLetterContext) -> Result<OfferDocument, DocumentError>;
}

/// Delivers a rendered offer to the candidate's inbox.
pub trait OfferMailer: Send + Sync {
    fn send(
        &self,
        context: &OfferLetterContext,
        document: &OfferDocument,
    ) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("offer template could not be rendered: {0}")]
    Template(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("recipient address rejected: {0}")]
    Recipient(String),
}

/// Renders the letter as plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextOfferRenderer;

impl OfferDocumentRenderer for PlainTextOfferRenderer {
    fn render(&self, context: &OfferLetterContext) -> Result<OfferDocument, DocumentError> {
        if context.candidate_name.trim().is_empty() {
            return Err(DocumentError::Template(
                "candidate name is missing".to_string(),
            ));
        }

        let body = format!(
            "{company}\n\
             Offer of employment\n\
             Issued {issued}\n\n\
             Dear {candidate},\n\n\
             We are pleased to offer you the position of {title}.\n\
             Compensation: {salary}\n\
             Joining date: {joining}\n\n\
             {message}\n\n\
             Sincerely,\n\
             {signatory}\n",
            company = context.company_name,
            issued = context.issued_on.format("%Y-%m-%d"),
            candidate = context.candidate_name,
            title = context.job_title,
            salary = context.offered_salary,
            joining = context.joining_date.format("%Y-%m-%d"),
            message = context.message.trim(),
            signatory = context.signatory,
        );

        let slug: String = context
            .candidate_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();

        Ok(OfferDocument {
            file_name: format!("offer-letter-{slug}.txt"),
            content_type: "text/plain; charset=utf-8",
            body: body.into_bytes(),
        })
    }
}
