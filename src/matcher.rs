//! Heuristic matching of an email record to a delivery certificate
//!
//! Certificates are scanned in input order. For each certificate the rules in
//! [`MatchRule::ORDER`] are tried in turn; the first certificate for which any
//! rule holds is returned. There is no scoring: an earlier certificate always
//! wins over a later one, even when the later one would match "better".

use crate::utils::prefix_chars;
use crate::{CertificateRecord, EmailRecord, Recipient, TimelineEvent};

/// Subject tokens longer than this corroborate a recipient match
const CORROBORATION_MIN_LEN: usize = 4;
/// Subject tokens longer than this count towards subject similarity
const SIMILARITY_MIN_LEN: usize = 5;
/// Shared long tokens required for a subject-similarity match
const SIMILARITY_MIN_SHARED: usize = 3;
/// Characters compared by the subject-prefix containment checks
const SUBJECT_PREFIX_CHARS: usize = 40;

/// A single matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Recipient address overlap corroborated by a shared subject word
    RecipientAndSubject,
    /// Subject similarity alone
    SubjectSimilarity,
}

impl MatchRule {
    /// Evaluation order within a single certificate
    pub const ORDER: [MatchRule; 2] = [MatchRule::RecipientAndSubject, MatchRule::SubjectSimilarity];

    pub fn matches(self, email: &EmailProbe, cert: &CertificateRecord) -> bool {
        match self {
            MatchRule::RecipientAndSubject => recipient_and_subject(email, cert),
            MatchRule::SubjectSimilarity => subject_similarity(email, &cert.subject),
        }
    }
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchRule::RecipientAndSubject => write!(f, "recipient-and-subject"),
            MatchRule::SubjectSimilarity => write!(f, "subject-similarity"),
        }
    }
}

/// Lower-cased view of the email fields the rules look at
#[derive(Debug, Clone)]
pub struct EmailProbe {
    address: String,
    subject: String,
}

impl EmailProbe {
    pub fn new(email: &EmailRecord) -> Self {
        Self {
            address: email.email.to_lowercase(),
            subject: email.subject.to_lowercase(),
        }
    }

    fn subject_words(&self, min_len_exclusive: usize) -> impl Iterator<Item = &str> {
        self.subject
            .split_whitespace()
            .filter(move |w| w.chars().count() > min_len_exclusive)
    }
}

/// A certificate found for an email, with the rule that selected it
#[derive(Debug, Clone, Copy)]
pub struct CertificateMatch<'a> {
    pub certificate: &'a CertificateRecord,
    pub index: usize,
    pub rule: MatchRule,
}

/// Return the first certificate matching `email`, if any
pub fn match_certificate<'a>(
    email: &EmailRecord,
    certificates: &'a [CertificateRecord],
) -> Option<&'a CertificateRecord> {
    find_match(email, certificates).map(|m| m.certificate)
}

/// Like [`match_certificate`], also reporting which certificate and rule matched
pub fn find_match<'a>(
    email: &EmailRecord,
    certificates: &'a [CertificateRecord],
) -> Option<CertificateMatch<'a>> {
    let probe = EmailProbe::new(email);
    let found = certificates.iter().enumerate().find_map(|(index, certificate)| {
        MatchRule::ORDER
            .iter()
            .find(|rule| rule.matches(&probe, certificate))
            .map(|&rule| CertificateMatch {
                certificate,
                index,
                rule,
            })
    });

    match &found {
        Some(m) => tracing::debug!(email_id = email.id, certificate = m.index, rule = %m.rule, "certificate matched"),
        None => tracing::debug!(email_id = email.id, "no certificate matched"),
    }
    found
}

fn recipient_and_subject(email: &EmailProbe, cert: &CertificateRecord) -> bool {
    if email.address.is_empty() {
        return false;
    }
    let address_overlap = cert.delivered_to.iter().any(|r| {
        let recipient = r.email.to_lowercase();
        recipient.contains(&email.address) || email.address.contains(&recipient)
    });
    if !address_overlap {
        return false;
    }

    let cert_subject = cert.subject.to_lowercase();
    if email.subject.is_empty() || cert_subject.is_empty() {
        return false;
    }
    email
        .subject_words(CORROBORATION_MIN_LEN)
        .any(|w| cert_subject.contains(w))
}

fn subject_similarity(email: &EmailProbe, cert_subject: &str) -> bool {
    if email.subject.is_empty() || cert_subject.is_empty() {
        return false;
    }
    let cert_subject = cert_subject.to_lowercase();

    let shared = email
        .subject_words(SIMILARITY_MIN_LEN)
        .filter(|w| cert_subject.contains(w))
        .count();
    if shared >= SIMILARITY_MIN_SHARED {
        return true;
    }

    cert_subject.contains(prefix_chars(&email.subject, SUBJECT_PREFIX_CHARS))
        || email
            .subject
            .contains(prefix_chars(&cert_subject, SUBJECT_PREFIX_CHARS))
}

/// Whether any timeline actor mentions the recipient's address or name
pub fn recipient_opened(recipient: &Recipient, timeline: &[TimelineEvent]) -> bool {
    let address = recipient.email.to_lowercase();
    let name = recipient
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase);

    timeline.iter().any(|event| {
        let actor = event.actor.to_lowercase();
        actor.contains(&address) || name.as_deref().is_some_and(|n| actor.contains(n))
    })
}
