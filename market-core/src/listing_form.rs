//! Create/edit listing form: field state, client-side validation, multipart
//! payload assembly and the unsaved-changes flag.

use crate::error::{ApiError, FieldErrors, NON_FIELD_ERRORS};
use crate::images::{AddOutcome, ImageFile, ImageSelection, ImageSlot};
use crate::models::{Listing, SavedListing, User};
use crate::routes::{can_edit_listing, Route};
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 200;
/// Error-map key for the image picker.
pub const IMAGES_FIELD: &str = "images";
/// Multipart part name of each uploaded file.
pub const IMAGES_PART: &str = "images_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingField {
    Title,
    Description,
    Price,
    Category,
    Phone,
}

impl ListingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price",
            Self::Category => "category",
            Self::Phone => "phone",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    /// Raw input; validated, then sent as typed.
    pub price: String,
    pub category: Option<i64>,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { listing_id: i64 },
}

impl FormMode {
    /// `None` for a new listing; otherwise the listing being edited.
    pub fn listing_id(&self) -> Option<i64> {
        match self {
            Self::Create => None,
            Self::Edit { listing_id } => Some(*listing_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("You do not have permission to edit this listing")]
pub struct EditDenied;

/// Text parts plus the files to upload as repeated `images_data` parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSubmission<F> {
    pub mode: FormMode,
    pub fields: Vec<(&'static str, String)>,
    pub images: Vec<F>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Saved; go to the listing page.
    Saved(Route),
    /// Server rejected fields; messages are in the error map.
    Invalid,
    /// Anything else; show this once as an alert.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ListingForm<F> {
    mode: FormMode,
    draft: ListingDraft,
    images: ImageSelection<F>,
    errors: FieldErrors,
    dirty: bool,
    submitting: bool,
}

impl<F: ImageFile + Clone> ListingForm<F> {
    /// Empty form; the phone is prefilled from the profile when known.
    pub fn create(user: Option<&User>) -> Self {
        let phone = user.and_then(|u| u.phone.clone()).unwrap_or_default();
        Self {
            mode: FormMode::Create,
            draft: ListingDraft {
                phone,
                ..Default::default()
            },
            images: ImageSelection::new(),
            errors: FieldErrors::new(),
            dirty: false,
            submitting: false,
        }
    }

    /// Loads a listing for editing. Only its author or staff get a form.
    pub fn for_edit(listing: &Listing, user: Option<&User>) -> Result<Self, EditDenied> {
        if !can_edit_listing(listing.author.id, user) {
            tracing::warn!(listing_id = listing.id, "Edit refused for non-owner");
            return Err(EditDenied);
        }

        Ok(Self {
            mode: FormMode::Edit {
                listing_id: listing.id,
            },
            draft: ListingDraft {
                title: listing.title.clone(),
                description: listing.description.clone(),
                price: listing.price.to_string(),
                category: listing.category.as_ref().map(|c| c.id),
                phone: listing.phone.clone(),
            },
            images: ImageSelection::from_uploaded(listing.images.clone()),
            errors: FieldErrors::new(),
            dirty: false,
            submitting: false,
        })
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Whether this form was built for the page showing `listing_id`
    /// (`None` being the create page).
    pub fn is_for(&self, listing_id: Option<i64>) -> bool {
        self.mode.listing_id() == listing_id
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn images(&self) -> &ImageSelection<F> {
        &self.images
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: ListingField) -> Option<&str> {
        self.errors.get(field.as_str())
    }

    /// True once anything changed since load; cleared only by a successful save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_field(&mut self, field: ListingField, value: &str) {
        match field {
            ListingField::Title => self.draft.title = value.to_string(),
            ListingField::Description => self.draft.description = value.to_string(),
            ListingField::Price => self.draft.price = value.to_string(),
            ListingField::Category => self.draft.category = value.trim().parse::<i64>().ok(),
            ListingField::Phone => self.draft.phone = value.to_string(),
        }
        self.dirty = true;
        self.errors.remove(field.as_str());
    }

    pub fn add_images(&mut self, files: impl IntoIterator<Item = F>) -> AddOutcome {
        let outcome = self.images.add(files);
        if outcome.accepted > 0 {
            self.dirty = true;
            self.errors.remove(IMAGES_FIELD);
        }
        outcome
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageSlot<F>> {
        let removed = self.images.remove(index);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let draft = &self.draft;

        if draft.title.trim().is_empty() {
            errors.insert(ListingField::Title.as_str(), "Title is required");
        } else if draft.title.chars().count() > TITLE_MAX_CHARS {
            errors.insert(
                ListingField::Title.as_str(),
                "Title must be at most 200 characters",
            );
        }

        if draft.description.trim().is_empty() {
            errors.insert(ListingField::Description.as_str(), "Description is required");
        }

        let price = draft.price.trim();
        if price.is_empty() {
            errors.insert(ListingField::Price.as_str(), "Price is required");
        } else {
            match price.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => {}
                Ok(_) => errors.insert(
                    ListingField::Price.as_str(),
                    "Price must be a positive number",
                ),
                Err(_) => errors.insert(ListingField::Price.as_str(), "Price must be a number"),
            }
        }

        if draft.category.is_none() {
            errors.insert(ListingField::Category.as_str(), "Category is required");
        }

        if draft.phone.trim().is_empty() {
            errors.insert(ListingField::Phone.as_str(), "Phone number is required");
        }

        if self.images.is_empty() {
            errors.insert(IMAGES_FIELD, "At least one image is required");
        } else if self.images.len() > self.images.max() {
            errors.insert(IMAGES_FIELD, "Maximum 5 images allowed");
        }

        errors
    }

    /// Validates and, when everything passes, returns the payload to send.
    /// Returns `None` (and fills the error map) otherwise; nothing should be
    /// sent in that case.
    pub fn begin_submit(&mut self) -> Option<ListingSubmission<F>> {
        if self.submitting {
            return None;
        }

        self.errors = self.validate();
        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "Listing form blocked by validation");
            return None;
        }

        let draft = &self.draft;
        let mut fields = vec![
            (ListingField::Title.as_str(), draft.title.trim().to_string()),
            (
                ListingField::Description.as_str(),
                draft.description.trim().to_string(),
            ),
            (ListingField::Price.as_str(), draft.price.trim().to_string()),
        ];
        if let Some(category) = draft.category {
            fields.push((ListingField::Category.as_str(), category.to_string()));
        }
        fields.push((ListingField::Phone.as_str(), draft.phone.trim().to_string()));

        self.submitting = true;
        Some(ListingSubmission {
            mode: self.mode,
            fields,
            // Already-uploaded images stay on the server untouched.
            images: self.images.new_files().cloned().collect(),
        })
    }

    pub fn finish_submit(&mut self, result: Result<SavedListing, ApiError>) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(saved) => {
                self.dirty = false;
                SubmitOutcome::Saved(Route::ListingDetail(saved.id))
            }
            Err(ApiError::Validation(server)) => {
                let mut server_errors = server;
                if let Some(message) = server_errors.remove(IMAGES_PART) {
                    server_errors.insert(IMAGES_FIELD, message);
                }
                let only_general = server_errors.iter().all(|(k, _)| k == NON_FIELD_ERRORS);
                let general = server_errors.get(NON_FIELD_ERRORS).map(str::to_string);
                self.errors.merge(server_errors);
                match general {
                    Some(message) if only_general => SubmitOutcome::Failed(message),
                    _ => SubmitOutcome::Invalid,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to save listing: {}", e);
                let action = match self.mode {
                    FormMode::Create => "create",
                    FormMode::Edit { .. } => "update",
                };
                let message = match &e {
                    ApiError::Forbidden(reason) if !reason.is_empty() => reason.clone(),
                    _ => format!("Failed to {} listing. Please try again.", action),
                };
                SubmitOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::LocalImage;
    use crate::models::{Category, ListingImage, ListingStatus};
    use chrono::Utc;

    fn user(id: i64, is_staff: bool) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: String::new(),
            phone: Some("5551234567".into()),
            profile_photo: None,
            is_staff,
            is_blocked: false,
            active_listings_count: None,
        }
    }

    fn listing(author: User) -> Listing {
        Listing {
            id: 42,
            title: "Bike".into(),
            description: "Red bike".into(),
            price: 120.5,
            category: Some(Category {
                id: 2,
                name: "Sport".into(),
                slug: None,
            }),
            author,
            phone: "5550000000".into(),
            images: vec![ListingImage {
                id: 9,
                image: "http://cdn/9.jpg".into(),
                order: Some(0),
            }],
            status: ListingStatus::Active,
            is_moderated: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn png(name: &str) -> LocalImage {
        LocalImage::new(name, "image/png", vec![0u8; 16])
    }

    fn filled_form() -> ListingForm<LocalImage> {
        let mut form = ListingForm::create(Some(&user(1, false)));
        form.set_field(ListingField::Title, "Bike");
        form.set_field(ListingField::Description, "  Red bike  ");
        form.set_field(ListingField::Price, "120.50");
        form.set_field(ListingField::Category, "2");
        form.add_images(vec![png("a.png")]);
        form
    }

    #[test]
    fn create_prefills_phone_and_starts_clean() {
        let form: ListingForm<LocalImage> = ListingForm::create(Some(&user(1, false)));
        assert_eq!(form.draft().phone, "5551234567");
        assert!(!form.is_dirty());
    }

    #[test]
    fn empty_form_reports_every_field() {
        let mut form: ListingForm<LocalImage> = ListingForm::create(None);
        assert!(form.begin_submit().is_none());
        for field in ["title", "description", "price", "category", "phone", IMAGES_FIELD] {
            assert!(form.errors().contains(field), "missing error for {}", field);
        }
        assert!(!form.is_submitting());
    }

    #[test]
    fn title_of_201_chars_blocks_submission() {
        let mut form = filled_form();
        form.set_field(ListingField::Title, &"x".repeat(201));
        assert!(form.begin_submit().is_none());
        assert_eq!(
            form.error(ListingField::Title),
            Some("Title must be at most 200 characters")
        );

        form.set_field(ListingField::Title, &"é".repeat(200));
        assert!(form.begin_submit().is_some());
    }

    #[test]
    fn negative_or_garbage_price_is_refused() {
        let mut form = filled_form();
        form.set_field(ListingField::Price, "-1");
        assert!(form.begin_submit().is_none());
        assert_eq!(
            form.error(ListingField::Price),
            Some("Price must be a positive number")
        );

        form.set_field(ListingField::Price, "cheap");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.error(ListingField::Price), Some("Price must be a number"));

        form.set_field(ListingField::Price, "0");
        assert!(form.begin_submit().is_some());
    }

    #[test]
    fn submission_trims_text_and_carries_files() {
        let mut form = filled_form();
        let submission = form.begin_submit().unwrap();
        assert_eq!(submission.mode, FormMode::Create);
        assert_eq!(
            submission.fields,
            vec![
                ("title", "Bike".to_string()),
                ("description", "Red bike".to_string()),
                ("price", "120.50".to_string()),
                ("category", "2".to_string()),
                ("phone", "5551234567".to_string()),
            ]
        );
        assert_eq!(submission.images.len(), 1);
        assert!(form.is_submitting());
        assert!(form.begin_submit().is_none(), "double submit must be ignored");
    }

    #[test]
    fn success_navigates_and_disarms_leave_guard() {
        let mut form = filled_form();
        assert!(form.is_dirty());
        form.begin_submit().unwrap();
        let outcome = form.finish_submit(Ok(SavedListing {
            id: 77,
            title: "Bike".into(),
        }));
        assert_eq!(outcome, SubmitOutcome::Saved(Route::ListingDetail(77)));
        assert!(!form.is_dirty());
    }

    #[test]
    fn server_field_errors_merge_into_local_map() {
        let mut form = filled_form();
        form.begin_submit().unwrap();

        let mut server = FieldErrors::new();
        server.insert("phone", "Enter a valid phone number.");
        server.insert(IMAGES_PART, "Maximum 5 images allowed per listing.");
        let outcome = form.finish_submit(Err(ApiError::Validation(server)));

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(form.error(ListingField::Phone), Some("Enter a valid phone number."));
        assert_eq!(
            form.errors().get(IMAGES_FIELD),
            Some("Maximum 5 images allowed per listing.")
        );
        assert!(form.is_dirty());
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let mut form: ListingForm<LocalImage> = ListingForm::create(None);
        form.begin_submit();
        assert!(form.error(ListingField::Title).is_some());
        form.set_field(ListingField::Title, "Lamp");
        assert!(form.error(ListingField::Title).is_none());
    }

    #[test]
    fn edit_is_denied_to_strangers() {
        let listing = listing(user(1, false));
        assert!(ListingForm::<LocalImage>::for_edit(&listing, Some(&user(2, false))).is_err());
        assert!(ListingForm::<LocalImage>::for_edit(&listing, None).is_err());
        assert!(ListingForm::<LocalImage>::for_edit(&listing, Some(&user(3, true))).is_ok());
    }

    #[test]
    fn edit_sends_only_new_files() {
        let listing = listing(user(1, false));
        let mut form = ListingForm::<LocalImage>::for_edit(&listing, Some(&user(1, false))).unwrap();
        assert_eq!(form.draft().category, Some(2));
        assert_eq!(form.draft().price, "120.5");
        assert!(!form.is_dirty());

        let unchanged = form.begin_submit().unwrap();
        assert!(unchanged.images.is_empty());
        assert_eq!(unchanged.mode, FormMode::Edit { listing_id: 42 });
        form.finish_submit(Err(ApiError::Network("down".into())));

        form.add_images(vec![png("new.png")]);
        let with_new = form.begin_submit().unwrap();
        assert_eq!(with_new.images.len(), 1);
        assert_eq!(with_new.images[0].name, "new.png");
    }

    #[test]
    fn form_knows_which_page_it_belongs_to() {
        let edit =
            ListingForm::<LocalImage>::for_edit(&listing(user(1, false)), Some(&user(1, false))).unwrap();
        assert!(edit.is_for(Some(42)));
        assert!(!edit.is_for(None));
        assert!(!edit.is_for(Some(7)));

        let create: ListingForm<LocalImage> = ListingForm::create(Some(&user(1, false)));
        assert!(create.is_for(None));
        assert!(!create.is_for(Some(42)));
        assert_eq!(create.mode().listing_id(), None);
    }

    #[test]
    fn blocked_user_sees_server_reason() {
        let mut form = filled_form();
        form.begin_submit().unwrap();
        let outcome = form.finish_submit(Err(ApiError::Forbidden(
            "Blocked users cannot create listings.".into(),
        )));
        assert_eq!(
            outcome,
            SubmitOutcome::Failed("Blocked users cannot create listings.".into())
        );
    }
}
