mod common;
mod filters;
mod images;
mod listing_card;
mod navbar;

pub use common::{ConfirmModal, ErrorMessage, Footer, LoadingSpinner};
pub use filters::{FilterSidebar, SortingDropdown};
pub use images::{ImagePicker, ImageSlider, PickerPreview};
pub use listing_card::ListingCard;
pub use navbar::Navbar;

use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

pub fn input_value(e: &InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

pub fn textarea_value(e: &InputEvent) -> String {
    let input: HtmlTextAreaElement = e.target_unchecked_into();
    input.value()
}

pub fn select_value(e: &Event) -> String {
    let select: HtmlSelectElement = e.target_unchecked_into();
    select.value()
}
