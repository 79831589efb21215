use super::{field_error, PageProps};
use crate::components::{input_value, ErrorMessage, ListingCard, LoadingSpinner};
use crate::router::AppRoute;
use market_core::error::{ApiError, NON_FIELD_ERRORS};
use market_core::format::format_phone;
use market_core::models::{ListingStatus, ListingSummary, Page, User};
use market_core::profile::{ProfileField, ProfileForm};
use market_core::request::LoadState;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    LoadListings,
    ListingsLoaded(Result<Page<ListingSummary>, ApiError>),
    StartEdit,
    CancelEdit,
    Update(ProfileField, String),
    Save,
    Saved(Result<User, ApiError>),
}

pub struct ProfilePage {
    listings: LoadState<Page<ListingSummary>>,
    /// Open while the user is editing their details.
    form: Option<ProfileForm>,
    notice: Option<String>,
}

impl ProfilePage {
    fn load_listings(&mut self, ctx: &Context<Self>) {
        self.listings = LoadState::Loading;
        let http = ctx.props().session.http();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = http.my_listings().await.map_err(|e| e.into_api_error());
            link.send_message(Msg::ListingsLoaded(result));
        });
    }

    fn view_details(&self, ctx: &Context<Self>, user: &User) -> Html {
        html! {
            <div class="profile-details">
                <div class="profile-row">
                    <span class="profile-label">{ "Username" }</span>
                    <span>{ &user.username }</span>
                </div>
                <div class="profile-row">
                    <span class="profile-label">{ "Email" }</span>
                    <span>{ &user.email }</span>
                </div>
                <div class="profile-row">
                    <span class="profile-label">{ "Phone" }</span>
                    <span>{ user.phone.as_deref().map(format_phone).unwrap_or_else(|| "-".to_string()) }</span>
                </div>
                <button class="btn btn-secondary" onclick={ctx.link().callback(|_| Msg::StartEdit)}>
                    { "Edit Profile" }
                </button>
            </div>
        }
    }

    fn view_form(&self, ctx: &Context<Self>, form: &ProfileForm) -> Html {
        let link = ctx.link();
        let submitting = form.is_submitting();
        let input = |label: &'static str, input_type: &'static str, field: ProfileField, value: &str| {
            html! {
                <div class="form-group">
                    <label class="form-label">{ label }</label>
                    <input
                        type={input_type}
                        class="form-input"
                        value={value.to_string()}
                        disabled={submitting}
                        oninput={link.callback(move |e: InputEvent| Msg::Update(field, input_value(&e)))}
                    />
                    { field_error(form.error(field)) }
                </div>
            }
        };
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Save
        });

        html! {
            <form class="profile-form" {onsubmit}>
                { input("Username *", "text", ProfileField::Username, &form.username) }
                { input("Email *", "email", ProfileField::Email, &form.email) }
                { input("Phone", "tel", ProfileField::Phone, &form.phone) }
                if let Some(general) = form.errors().get(NON_FIELD_ERRORS) {
                    <div class="alert alert-error">{ general }</div>
                }
                <div class="form-actions">
                    <button
                        type="button"
                        class="btn btn-secondary"
                        disabled={submitting}
                        onclick={link.callback(|_| Msg::CancelEdit)}
                    >
                        { "Cancel" }
                    </button>
                    <button type="submit" class="btn btn-primary" disabled={submitting}>
                        { if submitting { "Saving..." } else { "Save" } }
                    </button>
                </div>
            </form>
        }
    }

    fn view_listings(&self, ctx: &Context<Self>) -> Html {
        match &self.listings {
            LoadState::Idle | LoadState::Loading => html! { <LoadingSpinner /> },
            LoadState::Failed(_) => html! {
                <ErrorMessage
                    message="Failed to load your listings."
                    on_retry={ctx.link().callback(|_: ()| Msg::LoadListings)}
                />
            },
            LoadState::Loaded(page) if page.items.is_empty() => html! {
                <div class="empty-state">
                    <p>{ "You have not posted any listings yet." }</p>
                    <Link<AppRoute> to={AppRoute::CreateListing} classes="btn btn-primary">
                        { "+ Post Ad" }
                    </Link<AppRoute>>
                </div>
            },
            LoadState::Loaded(page) => html! {
                <div class="listings-grid">
                    { for page.items.iter().map(|listing| html! {
                        <div key={listing.id} class="my-listing">
                            if listing.status != ListingStatus::Active {
                                <span class={classes!("status-badge", listing.status.as_str())}>
                                    { listing.status.as_str() }
                                </span>
                            }
                            <ListingCard listing={listing.clone()} />
                        </div>
                    }) }
                </div>
            },
        }
    }
}

impl Component for ProfilePage {
    type Message = Msg;
    type Properties = PageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut page = Self {
            listings: LoadState::Idle,
            form: None,
            notice: None,
        };
        page.load_listings(ctx);
        page
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::LoadListings => {
                self.load_listings(ctx);
                true
            }
            Msg::ListingsLoaded(result) => {
                if let Err(e) = &result {
                    log::warn!("Failed to load my listings: {}", e);
                }
                self.listings = LoadState::from_result(result);
                true
            }

            Msg::StartEdit => {
                self.notice = None;
                self.form = ctx.props().session.user().map(ProfileForm::from_user);
                true
            }
            Msg::CancelEdit => {
                self.form = None;
                true
            }
            Msg::Update(field, value) => match &mut self.form {
                Some(form) => {
                    form.set_field(field, &value);
                    true
                }
                None => false,
            },

            Msg::Save => {
                let Some(update) = self.form.as_mut().and_then(ProfileForm::begin_submit) else {
                    return true;
                };
                let http = ctx.props().session.http();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = match http.update_profile(&update).await {
                        Ok(_) => http.profile().await,
                        Err(e) => Err(e),
                    };
                    link.send_message(Msg::Saved(result.map_err(|e| e.into_api_error())));
                });
                true
            }
            Msg::Saved(result) => {
                let Some(form) = &mut self.form else {
                    return false;
                };
                if let Some(user) = form.finish_submit(result) {
                    ctx.props().session.on_user_updated.emit(user);
                    self.form = None;
                    self.notice = Some("Profile updated.".to_string());
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(user) = ctx.props().session.user() else {
            return html! { <LoadingSpinner /> };
        };

        html! {
            <div class="profile-page">
                <section class="profile-card">
                    <h1>{ "My Profile" }</h1>
                    if let Some(notice) = &self.notice {
                        <div class="alert alert-success">{ notice }</div>
                    }
                    {
                        match &self.form {
                            Some(form) => self.view_form(ctx, form),
                            None => self.view_details(ctx, user),
                        }
                    }
                </section>

                <section class="profile-listings">
                    <div class="listings-header">
                        <h2>{ "My Listings" }</h2>
                    </div>
                    { self.view_listings(ctx) }
                </section>
            </div>
        }
    }
}
