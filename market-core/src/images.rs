//! Image picker state: accepted files waiting for upload mixed with images
//! the listing already has, in display order.

use crate::models::ListingImage;

pub const MAX_IMAGES: usize = 5;
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// A file picked locally and not uploaded yet.
pub trait ImageFile {
    fn name(&self) -> &str;
    fn mime(&self) -> &str;
    fn size(&self) -> u64;
    fn bytes(&self) -> &[u8];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl LocalImage {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

impl ImageFile for LocalImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime(&self) -> &str {
        &self.mime
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotAnImage,
    TooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn message(&self) -> String {
        match self.reason {
            RejectReason::NotAnImage => format!("{} is not an image file", self.name),
            RejectReason::TooLarge => format!("{} is too large. Max size is 5MB", self.name),
        }
    }
}

/// Result of one picker or drop batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub accepted: usize,
    pub rejected: Vec<Rejection>,
    pub dropped_for_capacity: usize,
    /// Free slots before the batch, for the capacity message.
    pub remaining_before: usize,
    pub max: usize,
}

impl AddOutcome {
    /// One user-visible line per problem, empty when everything fit.
    pub fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self.rejected.iter().map(Rejection::message).collect();
        if self.dropped_for_capacity > 0 {
            messages.push(format!(
                "You can only upload {} more image(s). Maximum is {} images. {} image(s) were not added.",
                self.remaining_before, self.max, self.dropped_for_capacity
            ));
        }
        messages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSlot<F> {
    New(F),
    Uploaded(ListingImage),
}

impl<F: ImageFile> ImageSlot<F> {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }

    pub fn label(&self) -> &str {
        match self {
            Self::New(file) => file.name(),
            Self::Uploaded(image) => &image.image,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSelection<F> {
    slots: Vec<ImageSlot<F>>,
    max: usize,
}

impl<F> Default for ImageSelection<F> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            max: MAX_IMAGES,
        }
    }
}

impl<F: ImageFile> ImageSelection<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the images a listing already has.
    pub fn from_uploaded(images: Vec<ListingImage>) -> Self {
        let mut selection = Self::new();
        selection.slots = images.into_iter().map(ImageSlot::Uploaded).collect();
        selection
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn remaining(&self) -> usize {
        self.max.saturating_sub(self.slots.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn slots(&self) -> &[ImageSlot<F>] {
        &self.slots
    }

    pub fn new_files(&self) -> impl Iterator<Item = &F> {
        self.slots.iter().filter_map(|slot| match slot {
            ImageSlot::New(file) => Some(file),
            ImageSlot::Uploaded(_) => None,
        })
    }

    /// Screens a batch, then keeps as many valid files as still fit.
    pub fn add(&mut self, files: impl IntoIterator<Item = F>) -> AddOutcome {
        let mut outcome = AddOutcome {
            remaining_before: self.remaining(),
            max: self.max,
            ..Default::default()
        };

        let mut valid = Vec::new();
        for file in files {
            match screen(&file) {
                Some(reason) => outcome.rejected.push(Rejection {
                    name: file.name().to_string(),
                    reason,
                }),
                None => valid.push(file),
            }
        }

        if valid.len() > outcome.remaining_before {
            outcome.dropped_for_capacity = valid.len() - outcome.remaining_before;
            valid.truncate(outcome.remaining_before);
        }

        outcome.accepted = valid.len();
        self.slots.extend(valid.into_iter().map(ImageSlot::New));

        if !outcome.rejected.is_empty() || outcome.dropped_for_capacity > 0 {
            tracing::debug!(
                rejected = outcome.rejected.len(),
                dropped = outcome.dropped_for_capacity,
                "Image batch partly refused"
            );
        }
        outcome
    }

    pub fn remove(&mut self, index: usize) -> Option<ImageSlot<F>> {
        if index < self.slots.len() {
            Some(self.slots.remove(index))
        } else {
            None
        }
    }
}

fn screen<F: ImageFile>(file: &F) -> Option<RejectReason> {
    if !file.mime().starts_with("image/") {
        Some(RejectReason::NotAnImage)
    } else if file.size() > MAX_IMAGE_BYTES {
        Some(RejectReason::TooLarge)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports a size without carrying the bytes.
    struct FakeFile {
        name: String,
        mime: String,
        size: u64,
    }

    impl FakeFile {
        fn new(name: &str, mime: &str, size: u64) -> Self {
            Self {
                name: name.into(),
                mime: mime.into(),
                size,
            }
        }
    }

    impl ImageFile for FakeFile {
        fn name(&self) -> &str {
            &self.name
        }
        fn mime(&self) -> &str {
            &self.mime
        }
        fn size(&self) -> u64 {
            self.size
        }
        fn bytes(&self) -> &[u8] {
            &[]
        }
    }

    fn pngs(prefix: &str, n: usize) -> Vec<FakeFile> {
        (0..n)
            .map(|i| FakeFile::new(&format!("{}{}.png", prefix, i), "image/png", 1024))
            .collect()
    }

    #[test]
    fn batch_is_truncated_to_remaining_capacity() {
        let mut selection = ImageSelection::new();
        let first = selection.add(pngs("a", 3));
        assert_eq!(first.accepted, 3);
        assert!(first.messages().is_empty());

        let second = selection.add(pngs("b", 4));
        assert_eq!(second.accepted, 2);
        assert_eq!(second.dropped_for_capacity, 2);
        assert_eq!(selection.len(), MAX_IMAGES);
        assert!(selection.is_full());
        assert_eq!(second.messages().len(), 1);
    }

    #[test]
    fn oversized_files_are_rejected_whatever_their_type() {
        let six_mb = 6 * 1024 * 1024;
        for mime in ["image/jpeg", "image/png", "application/pdf", ""] {
            let mut selection = ImageSelection::new();
            let outcome = selection.add(vec![FakeFile::new("big", mime, six_mb)]);
            assert_eq!(outcome.accepted, 0);
            assert_eq!(outcome.rejected.len(), 1);
        }
    }

    #[test]
    fn non_images_are_rejected_whatever_their_size() {
        for size in [0, 10, MAX_IMAGE_BYTES, MAX_IMAGE_BYTES + 1] {
            let mut selection = ImageSelection::new();
            let outcome = selection.add(vec![FakeFile::new("doc.txt", "text/plain", size)]);
            assert_eq!(outcome.accepted, 0);
            assert_eq!(outcome.rejected[0].reason, RejectReason::NotAnImage);
            assert_eq!(outcome.rejected[0].message(), "doc.txt is not an image file");
        }
    }

    #[test]
    fn exactly_five_megabytes_is_accepted() {
        let mut selection = ImageSelection::new();
        let outcome = selection.add(vec![FakeFile::new("edge.jpg", "image/jpeg", MAX_IMAGE_BYTES)]);
        assert_eq!(outcome.accepted, 1);
    }

    #[test]
    fn removal_is_positional_over_mixed_slots() {
        let uploaded = vec![
            ListingImage {
                id: 1,
                image: "http://cdn/1.jpg".into(),
                order: Some(0),
            },
            ListingImage {
                id: 2,
                image: "http://cdn/2.jpg".into(),
                order: Some(1),
            },
        ];
        let mut selection: ImageSelection<FakeFile> = ImageSelection::from_uploaded(uploaded);
        selection.add(pngs("n", 1));
        assert_eq!(selection.remaining(), 2);

        let removed = selection.remove(0).unwrap();
        assert!(!removed.is_new());
        assert_eq!(selection.slots()[0].label(), "http://cdn/2.jpg");
        assert_eq!(selection.slots()[1].label(), "n0.png");
        assert_eq!(selection.new_files().count(), 1);
        assert!(selection.remove(9).is_none());
    }
}
