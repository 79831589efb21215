use crate::app::SessionContext;
use crate::components::{ConfirmModal, ErrorMessage, ImageSlider, LoadingSpinner};
use crate::router::AppRoute;
use market_core::detail::{DetailDisplay, DetailTicket, ListingDetailView};
use market_core::error::ApiError;
use market_core::format::{format_date, format_phone, format_price};
use market_core::models::{Listing, ListingStatus};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub struct ListingDetailProps {
    pub session: SessionContext,
    pub id: i64,
}

pub enum Msg {
    Load,
    Loaded(DetailTicket, Result<Listing, ApiError>),
    RequestDelete,
    CancelDelete,
    ConfirmDelete,
    Deleted(Result<(), ApiError>),
    DismissAlert,
}

pub struct ListingDetailPage {
    view: ListingDetailView,
}

impl ListingDetailPage {
    fn load(&mut self, ctx: &Context<Self>) {
        let ticket = self.view.load();
        let http = ctx.props().session.http();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = http
                .get_listing(ticket.listing_id())
                .await
                .map_err(|e| e.into_api_error());
            link.send_message(Msg::Loaded(ticket, result));
        });
    }

    fn view_listing(&self, ctx: &Context<Self>, listing: &Listing) -> Html {
        let is_owner = self.view.is_owner(ctx.props().session.user());

        html! {
            <div class="listing-detail">
                <div class="listing-detail-gallery">
                    <ImageSlider images={listing.images.clone()} alt={listing.title.clone()} />
                </div>

                <div class="listing-detail-info">
                    if listing.status != ListingStatus::Active {
                        <span class={classes!("status-badge", listing.status.as_str())}>
                            { listing.status.as_str() }
                        </span>
                    }
                    <h1 class="listing-detail-title">{ &listing.title }</h1>
                    <div class="listing-detail-price">{ format_price(listing.price) }</div>
                    if let Some(category) = &listing.category {
                        <div class="listing-detail-category">{ &category.name }</div>
                    }

                    <div class="listing-detail-section">
                        <h2>{ "Description" }</h2>
                        <p class="listing-detail-description">{ &listing.description }</p>
                    </div>

                    <div class="listing-detail-section listing-detail-seller">
                        <h2>{ "Seller" }</h2>
                        <p>{ &listing.author.username }</p>
                        if !listing.phone.is_empty() {
                            <a class="listing-detail-phone" href={format!("tel:{}", listing.phone)}>
                                { format_phone(&listing.phone) }
                            </a>
                        }
                    </div>

                    <div class="listing-detail-meta">
                        { format!("Posted {}", format_date(&listing.created_at)) }
                    </div>

                    if is_owner {
                        <div class="listing-detail-actions">
                            <Link<AppRoute> to={AppRoute::EditListing { id: listing.id }} classes="btn btn-secondary">
                                { "Edit" }
                            </Link<AppRoute>>
                            <button
                                class="btn btn-danger"
                                disabled={self.view.is_deleting()}
                                onclick={ctx.link().callback(|_| Msg::RequestDelete)}
                            >
                                { if self.view.is_deleting() { "Deleting..." } else { "Delete" } }
                            </button>
                        </div>
                    }
                </div>

                if self.view.is_confirming_delete() {
                    <ConfirmModal
                        title="Delete Listing"
                        message={format!("Are you sure you want to delete \"{}\"? This cannot be undone.", listing.title)}
                        confirm_label="Delete"
                        destructive=true
                        busy={self.view.is_deleting()}
                        on_confirm={ctx.link().callback(|_| Msg::ConfirmDelete)}
                        on_cancel={ctx.link().callback(|_| Msg::CancelDelete)}
                    />
                }
            </div>
        }
    }
}

impl Component for ListingDetailPage {
    type Message = Msg;
    type Properties = ListingDetailProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut page = Self {
            view: ListingDetailView::new(ctx.props().id),
        };
        page.load(ctx);
        page
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().id != old_props.id {
            self.view = ListingDetailView::new(ctx.props().id);
            self.load(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.load(ctx);
                true
            }
            Msg::Loaded(ticket, result) => self.view.complete(ticket, result),

            Msg::RequestDelete => self.view.request_delete(),
            Msg::CancelDelete => {
                self.view.cancel_delete();
                true
            }
            Msg::ConfirmDelete => {
                let Some(id) = self.view.confirm_delete() else {
                    return false;
                };
                let http = ctx.props().session.http();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = http.delete_listing(id).await.map_err(|e| e.into_api_error());
                    link.send_message(Msg::Deleted(result));
                });
                true
            }
            Msg::Deleted(result) => {
                if let Some(route) = self.view.finish_delete(result) {
                    if let Some(navigator) = ctx.link().navigator() {
                        navigator.push(&AppRoute::from(route));
                    }
                }
                true
            }
            Msg::DismissAlert => {
                self.view.dismiss_alert();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let alert = match self.view.alert() {
            Some(alert) => html! {
                <div class="alert alert-error">
                    <span>{ alert }</span>
                    <button class="alert-close" onclick={ctx.link().callback(|_| Msg::DismissAlert)}>
                        { "×" }
                    </button>
                </div>
            },
            None => html! {},
        };

        let body = match self.view.display() {
            DetailDisplay::Loading => html! { <LoadingSpinner /> },
            DetailDisplay::NotFound => html! {
                <div class="empty-state">
                    <h2>{ "Listing not found" }</h2>
                    <Link<AppRoute> to={AppRoute::Home}>{ "Back to listings" }</Link<AppRoute>>
                </div>
            },
            DetailDisplay::Error(message) => html! {
                <ErrorMessage message={message} on_retry={ctx.link().callback(|_: ()| Msg::Load)} />
            },
            DetailDisplay::Loaded(listing) => self.view_listing(ctx, listing),
        };

        html! {
            <div class="listing-detail-page">
                { alert }
                { body }
            </div>
        }
    }
}
