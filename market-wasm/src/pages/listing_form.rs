use super::field_error;
use crate::api::media_url;
use crate::app::SessionContext;
use crate::components::{
    input_value, select_value, textarea_value, ErrorMessage, ImagePicker, LoadingSpinner,
    PickerPreview,
};
use crate::router::AppRoute;
use js_sys::Uint8Array;
use market_core::error::{ApiError, NON_FIELD_ERRORS};
use market_core::images::{ImageFile, ImageSlot, MAX_IMAGE_BYTES};
use market_core::listing_form::{
    FormMode, ListingField, ListingForm, SubmitOutcome, IMAGES_FIELD, TITLE_MAX_CHARS,
};
use market_core::models::{Category, Listing, SavedListing};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{BeforeUnloadEvent, File, Url};
use yew::prelude::*;
use yew_router::prelude::*;

const UNSAVED_CHANGES: &str = "You have unsaved changes. Are you sure you want to leave?";

/// A file picked in the browser, with an object URL for its preview.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserImage {
    name: String,
    mime: String,
    size: u64,
    bytes: Rc<[u8]>,
    preview_url: String,
}

impl BrowserImage {
    /// Bytes are only read for files that can pass the type and size checks.
    async fn read(file: File) -> Self {
        let name = file.name();
        let mime = file.type_();
        let size = file.size() as u64;

        let bytes: Rc<[u8]> = if mime.starts_with("image/") && size <= MAX_IMAGE_BYTES {
            match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => Uint8Array::new(&buffer).to_vec().into(),
                Err(e) => {
                    log::warn!("Failed to read {}: {:?}", name, e);
                    Rc::from(Vec::new())
                }
            }
        } else {
            Rc::from(Vec::new())
        };

        let preview_url = Url::create_object_url_with_blob(&file).unwrap_or_default();

        Self {
            name,
            mime,
            size,
            bytes,
            preview_url,
        }
    }

    fn release(&self) {
        if !self.preview_url.is_empty() {
            if let Err(e) = Url::revoke_object_url(&self.preview_url) {
                log::warn!("Failed to release preview of {}: {:?}", self.name, e);
            }
        }
    }
}

impl ImageFile for BrowserImage {
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
        &self.bytes
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct ListingFormProps {
    pub session: SessionContext,
    /// `None` creates a new listing.
    pub listing_id: Option<i64>,
}

pub enum Msg {
    CategoriesLoaded(Result<Vec<Category>, ApiError>),
    ListingLoaded(i64, Result<Listing, ApiError>),
    Update(ListingField, String),
    FilesPicked(Vec<File>),
    FilesRead(Vec<BrowserImage>),
    RemoveImage(usize),
    Submit,
    Saved(Result<SavedListing, ApiError>),
    Cancel,
    DismissAlert,
}

enum FormState {
    Loading,
    LoadFailed(String),
    Ready(ListingForm<BrowserImage>),
}

pub struct ListingFormPage {
    state: FormState,
    categories: Vec<Category>,
    image_messages: Vec<String>,
    alert: Option<String>,
    unload_guard: Option<Closure<dyn FnMut(BeforeUnloadEvent)>>,
}

impl ListingFormPage {
    fn form_mut(&mut self) -> Option<&mut ListingForm<BrowserImage>> {
        match &mut self.state {
            FormState::Ready(form) => Some(form),
            _ => None,
        }
    }

    fn navigate(ctx: &Context<Self>, route: AppRoute) {
        if let Some(navigator) = ctx.link().navigator() {
            navigator.push(&route);
        }
    }

    /// Keeps the browser's leave-page prompt in step with the dirty flag.
    fn sync_unload_guard(&mut self) {
        let dirty = matches!(&self.state, FormState::Ready(form) if form.is_dirty());
        let Some(window) = web_sys::window() else {
            return;
        };

        match (dirty, self.unload_guard.is_some()) {
            (true, false) => {
                let guard = Closure::<dyn FnMut(BeforeUnloadEvent)>::new(|e: BeforeUnloadEvent| {
                    e.prevent_default();
                    e.set_return_value(UNSAVED_CHANGES);
                });
                window.set_onbeforeunload(Some(guard.as_ref().unchecked_ref()));
                self.unload_guard = Some(guard);
            }
            (false, true) => {
                window.set_onbeforeunload(None);
                self.unload_guard = None;
            }
            _ => {}
        }
    }

    /// A fresh create form, or a pending load of the listing to edit.
    fn initial_state(ctx: &Context<Self>) -> FormState {
        let props = ctx.props();
        match props.listing_id {
            None => FormState::Ready(ListingForm::create(props.session.user())),
            Some(id) => {
                let http = props.session.http();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = http.get_listing(id).await.map_err(|e| e.into_api_error());
                    link.send_message(Msg::ListingLoaded(id, result));
                });
                FormState::Loading
            }
        }
    }

    fn release_previews(&self) {
        if let FormState::Ready(form) = &self.state {
            for file in form.images().new_files() {
                file.release();
            }
        }
    }

    fn view_form(&self, ctx: &Context<Self>, form: &ListingForm<BrowserImage>) -> Html {
        let link = ctx.link();
        let draft = form.draft();
        let submitting = form.is_submitting();
        let is_edit = matches!(form.mode(), FormMode::Edit { .. });
        let selected_category = draft.category.map(|c| c.to_string()).unwrap_or_default();

        let previews: Vec<PickerPreview> = form
            .images()
            .slots()
            .iter()
            .map(|slot| match slot {
                ImageSlot::New(file) => PickerPreview {
                    url: file.preview_url.clone().into(),
                    name: file.name.clone().into(),
                    is_new: true,
                },
                ImageSlot::Uploaded(image) => PickerPreview {
                    url: media_url(&image.image).into(),
                    name: slot.label().to_string().into(),
                    is_new: false,
                },
            })
            .collect();

        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <form class="listing-form" {onsubmit}>
                <div class="form-group">
                    <label class="form-label">{ "Title *" }</label>
                    <input
                        type="text"
                        class="form-input"
                        value={draft.title.clone()}
                        disabled={submitting}
                        oninput={link.callback(|e: InputEvent| Msg::Update(ListingField::Title, input_value(&e)))}
                    />
                    <span class="form-hint">
                        { format!("{}/{}", draft.title.chars().count(), TITLE_MAX_CHARS) }
                    </span>
                    { field_error(form.error(ListingField::Title)) }
                </div>

                <div class="form-group">
                    <label class="form-label">{ "Description *" }</label>
                    <textarea
                        class="form-textarea"
                        rows="6"
                        value={draft.description.clone()}
                        disabled={submitting}
                        oninput={link.callback(|e: InputEvent| Msg::Update(ListingField::Description, textarea_value(&e)))}
                    />
                    { field_error(form.error(ListingField::Description)) }
                </div>

                <div class="form-row">
                    <div class="form-group">
                        <label class="form-label">{ "Price *" }</label>
                        <input
                            type="number"
                            class="form-input"
                            min="0"
                            step="0.01"
                            value={draft.price.clone()}
                            disabled={submitting}
                            oninput={link.callback(|e: InputEvent| Msg::Update(ListingField::Price, input_value(&e)))}
                        />
                        { field_error(form.error(ListingField::Price)) }
                    </div>

                    <div class="form-group">
                        <label class="form-label">{ "Category *" }</label>
                        <select
                            class="form-select"
                            disabled={submitting}
                            onchange={link.callback(|e: Event| Msg::Update(ListingField::Category, select_value(&e)))}
                        >
                            <option value="" selected={draft.category.is_none()}>{ "Select a category" }</option>
                            { for self.categories.iter().map(|category| {
                                let value = category.id.to_string();
                                html! {
                                    <option
                                        key={category.id}
                                        value={value.clone()}
                                        selected={value == selected_category}
                                    >
                                        { &category.name }
                                    </option>
                                }
                            }) }
                        </select>
                        { field_error(form.error(ListingField::Category)) }
                    </div>
                </div>

                <div class="form-group">
                    <label class="form-label">{ "Phone *" }</label>
                    <input
                        type="tel"
                        class="form-input"
                        value={draft.phone.clone()}
                        disabled={submitting}
                        oninput={link.callback(|e: InputEvent| Msg::Update(ListingField::Phone, input_value(&e)))}
                    />
                    { field_error(form.error(ListingField::Phone)) }
                </div>

                <ImagePicker
                    {previews}
                    max={form.images().max()}
                    on_files={link.callback(Msg::FilesPicked)}
                    on_remove={link.callback(Msg::RemoveImage)}
                    messages={self.image_messages.clone()}
                    error={form.errors().get(IMAGES_FIELD).map(|e| AttrValue::from(e.to_string()))}
                    disabled={submitting}
                />

                if let Some(general) = form.errors().get(NON_FIELD_ERRORS) {
                    <div class="alert alert-error">{ general }</div>
                }

                <div class="form-actions">
                    <button
                        type="button"
                        class="btn btn-secondary"
                        disabled={submitting}
                        onclick={link.callback(|_| Msg::Cancel)}
                    >
                        { "Cancel" }
                    </button>
                    <button type="submit" class="btn btn-primary" disabled={submitting}>
                        {
                            match (submitting, is_edit) {
                                (true, _) => "Saving...",
                                (false, true) => "Save Changes",
                                (false, false) => "Post Listing",
                            }
                        }
                    </button>
                </div>
            </form>
        }
    }
}

impl Component for ListingFormPage {
    type Message = Msg;
    type Properties = ListingFormProps;

    fn create(ctx: &Context<Self>) -> Self {
        let http = ctx.props().session.http();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = http.categories().await.map_err(|e| e.into_api_error());
            link.send_message(Msg::CategoriesLoaded(result));
        });

        Self {
            state: Self::initial_state(ctx),
            categories: Vec::new(),
            image_messages: Vec::new(),
            alert: None,
            unload_guard: None,
        }
    }

    /// Create and edit share this component, so switching between them
    /// must start over instead of keeping the previous form.
    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().listing_id != old_props.listing_id {
            self.release_previews();
            self.state = Self::initial_state(ctx);
            self.image_messages.clear();
            self.alert = None;
            self.sync_unload_guard();
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let render = match msg {
            Msg::CategoriesLoaded(Ok(categories)) => {
                self.categories = categories;
                true
            }
            Msg::CategoriesLoaded(Err(e)) => {
                log::warn!("Failed to load categories: {}", e);
                false
            }

            // Answer for a listing this page no longer shows.
            Msg::ListingLoaded(id, _) if ctx.props().listing_id != Some(id) => false,
            Msg::ListingLoaded(_, Ok(listing)) => {
                match ListingForm::for_edit(&listing, ctx.props().session.user()) {
                    Ok(form) => self.state = FormState::Ready(form),
                    Err(denied) => {
                        log::warn!("{}", denied);
                        Self::navigate(ctx, AppRoute::Home);
                    }
                }
                true
            }
            Msg::ListingLoaded(_, Err(e)) => {
                let message = if e.is_not_found() {
                    "Listing not found.".to_string()
                } else {
                    "Failed to load listing. Please try again.".to_string()
                };
                self.state = FormState::LoadFailed(message);
                true
            }

            Msg::Update(field, value) => match self.form_mut() {
                Some(form) => {
                    form.set_field(field, &value);
                    true
                }
                None => false,
            },

            Msg::FilesPicked(files) => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    let mut images = Vec::with_capacity(files.len());
                    for file in files {
                        images.push(BrowserImage::read(file).await);
                    }
                    link.send_message(Msg::FilesRead(images));
                });
                false
            }
            Msg::FilesRead(images) => {
                let Some(form) = self.form_mut() else {
                    images.iter().for_each(BrowserImage::release);
                    return false;
                };
                let outcome = form.add_images(images.iter().cloned());
                let kept: Vec<&str> = form
                    .images()
                    .new_files()
                    .map(|f| f.preview_url.as_str())
                    .collect();
                for image in images.iter().filter(|i| !kept.contains(&i.preview_url.as_str())) {
                    image.release();
                }
                self.image_messages = outcome.messages();
                true
            }
            Msg::RemoveImage(index) => match self.form_mut() {
                Some(form) => {
                    if let Some(ImageSlot::New(file)) = form.remove_image(index) {
                        file.release();
                    }
                    self.image_messages.clear();
                    true
                }
                None => false,
            },

            Msg::Submit => {
                let listing_id = ctx.props().listing_id;
                let Some(form) = self.form_mut() else {
                    return false;
                };
                if !form.is_for(listing_id) {
                    log::warn!("Form does not belong to the current page; not submitting");
                    return false;
                }
                if let Some(submission) = form.begin_submit() {
                    self.alert = None;
                    let http = ctx.props().session.http();
                    let link = ctx.link().clone();
                    spawn_local(async move {
                        let result = http
                            .save_listing(&submission)
                            .await
                            .map_err(|e| e.into_api_error());
                        link.send_message(Msg::Saved(result));
                    });
                }
                true
            }
            Msg::Saved(result) => {
                let Some(form) = self.form_mut().filter(|form| form.is_submitting()) else {
                    return false;
                };
                match form.finish_submit(result) {
                    SubmitOutcome::Saved(route) => {
                        self.sync_unload_guard();
                        Self::navigate(ctx, AppRoute::from(route));
                    }
                    SubmitOutcome::Invalid => {}
                    SubmitOutcome::Failed(message) => self.alert = Some(message),
                }
                true
            }

            Msg::Cancel => {
                let dirty = matches!(&self.state, FormState::Ready(form) if form.is_dirty());
                let leave = !dirty
                    || web_sys::window()
                        .and_then(|w| w.confirm_with_message(UNSAVED_CHANGES).ok())
                        .unwrap_or(false);
                if leave {
                    let target = match ctx.props().listing_id {
                        Some(id) => AppRoute::ListingDetail { id },
                        None => AppRoute::Home,
                    };
                    Self::navigate(ctx, target);
                }
                false
            }
            Msg::DismissAlert => {
                self.alert = None;
                true
            }
        };

        self.sync_unload_guard();
        render
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let heading = if ctx.props().listing_id.is_some() {
            "Edit Listing"
        } else {
            "Create New Listing"
        };

        let body = match &self.state {
            FormState::Loading => html! { <LoadingSpinner /> },
            FormState::LoadFailed(message) => html! { <ErrorMessage message={message.clone()} /> },
            FormState::Ready(form) => self.view_form(ctx, form),
        };

        html! {
            <div class="listing-form-page">
                <h1>{ heading }</h1>
                if let Some(alert) = &self.alert {
                    <div class="alert alert-error">
                        <span>{ alert }</span>
                        <button class="alert-close" onclick={ctx.link().callback(|_| Msg::DismissAlert)}>
                            { "×" }
                        </button>
                    </div>
                }
                { body }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.release_previews();
        if self.unload_guard.take().is_some() {
            if let Some(window) = web_sys::window() {
                window.set_onbeforeunload(None);
            }
        }
    }
}
