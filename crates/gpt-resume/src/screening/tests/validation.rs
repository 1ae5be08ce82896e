use super::common::*;
use crate::screening::domain::{ApplicantFields, CollegeDraft, JobDraft, JobId, RecommendationFilter};
use crate::screening::validation::{
    check_document_name, check_email, clean_file_name, check_relevance, ValidationError, APPLICANT_RELEVANCE_MAX,
    EXPERIENCE_RELEVANCE_MAX, PROJECT_RELEVANCE_MAX,
};

#[test]
fn relevance_bounds_are_inclusive() {
    for (max, field) in [
        (APPLICANT_RELEVANCE_MAX, 100),
        (PROJECT_RELEVANCE_MAX, 5),
        (EXPERIENCE_RELEVANCE_MAX, 10),
    ] {
        assert_eq!(max, field);
        assert!(check_relevance("relevance", 0, max).is_ok());
        assert!(check_relevance("relevance", max, max).is_ok());
        assert_eq!(
            check_relevance("relevance", max + 1, max),
            Err(ValidationError::OutOfRange {
                field: "relevance",
                min: 0,
                max,
                found: max + 1,
            })
        );
        assert!(check_relevance("relevance", -1, max).is_err());
    }
}

#[test]
fn job_requires_title_and_description() {
    assert!(job_draft().validate().is_ok());

    let blank_title = JobDraft {
        job_title: "   ".to_string(),
        ..job_draft()
    };
    assert_eq!(
        blank_title.validate(),
        Err(ValidationError::Blank { field: "job_title" })
    );

    let blank_description = JobDraft {
        job_description: String::new(),
        ..job_draft()
    };
    assert_eq!(
        blank_description.validate(),
        Err(ValidationError::Blank {
            field: "job_description"
        })
    );
}

#[test]
fn applicant_needs_a_resume_but_not_a_name() {
    let draft = applicant_draft(JobId::generate(), "Ada", 40);
    let anonymous = ApplicantFields {
        name: String::new(),
        email: String::new(),
        ..draft.fields.clone()
    };
    assert!(anonymous.validate().is_ok());

    let missing_resume = ApplicantFields {
        resume: String::new(),
        ..draft.fields
    };
    assert_eq!(
        missing_resume.validate(),
        Err(ValidationError::Blank { field: "resume" })
    );
}

#[test]
fn email_shape_is_checked_when_present() {
    assert!(check_email("").is_ok());
    assert!(check_email("ada@example.com").is_ok());
    assert!(check_email("ada.lovelace+cv@mail.example.org").is_ok());

    for bad in ["ada", "ada@", "@example.com", "ada@example", "ada @example.com", "ada@example..com"] {
        assert_eq!(
            check_email(bad),
            Err(ValidationError::InvalidEmail(bad.to_string())),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn college_dates_are_capped_at_year_month() {
    assert!(college_draft().validate().is_ok());
    assert!(CollegeDraft::default().validate().is_ok());

    let long_end = CollegeDraft {
        end_date: Some("2022-05-31".to_string()),
        ..college_draft()
    };
    assert_eq!(
        long_end.validate(),
        Err(ValidationError::TooLong {
            field: "end_date",
            max: 7
        })
    );
}

#[test]
fn sub_record_relevance_uses_its_own_scale() {
    assert!(project_draft("Cache", 5).validate().is_ok());
    assert!(project_draft("Cache", 6).validate().is_err());
    assert!(experience_draft(10).validate().is_ok());
    assert!(experience_draft(11).validate().is_err());
}

#[test]
fn only_pdf_documents_are_accepted() {
    assert!(check_document_name("cv.pdf").is_ok());
    assert!(check_document_name("CV.PDF").is_ok());

    match check_document_name("cv.docx") {
        Err(ValidationError::FileExtension { found, allowed }) => {
            assert_eq!(found, "docx");
            assert_eq!(allowed, "pdf");
        }
        other => panic!("expected extension rejection, got {other:?}"),
    }
    assert!(check_document_name("cv").is_err());
    assert!(check_document_name(".pdf").is_err());
}

#[test]
fn upload_names_lose_client_directories() {
    assert_eq!(clean_file_name("C:\\Users\\ada\\cv.pdf").as_deref(), Ok("cv.pdf"));
    assert_eq!(clean_file_name("../../etc/cv.pdf").as_deref(), Ok("cv.pdf"));
    assert_eq!(clean_file_name("  cv.pdf ").as_deref(), Ok("cv.pdf"));

    for raw in ["", "  ", ".", "..", "cv.pdf/", "docs\\"] {
        assert_eq!(
            clean_file_name(raw),
            Err(ValidationError::InvalidFileName(raw.to_string())),
            "{raw:?} should be rejected"
        );
    }
}

#[test]
fn list_types_parse_from_query_values() {
    assert_eq!("rec".parse(), Ok(RecommendationFilter::Recommended));
    assert_eq!("norec".parse(), Ok(RecommendationFilter::NotRecommended));
    assert_eq!(
        "REC".parse::<RecommendationFilter>(),
        Err(ValidationError::UnknownListType("REC".to_string()))
    );
}
