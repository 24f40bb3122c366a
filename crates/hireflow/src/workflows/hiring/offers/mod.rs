//! Offer letters: issued once per (posting, freelancer) and answered once.

pub mod document;
pub mod domain;
pub mod repository;
pub mod service;

pub use document::{
    DocumentError, MailError, OfferDocument, OfferDocumentRenderer, OfferLetterContext,
    OfferMailer, PlainTextOfferRenderer,
};
pub use domain::{
    ClientOfferView, FreelancerOfferView, OfferId, OfferLetter, OfferRequest, OfferStatus,
};
pub use repository::{OfferFilter, OfferRepository};
pub use service::OfferService;
