use crate::api::media_url;
use crate::router::AppRoute;
use chrono::Utc;
use market_core::format::{format_price_rounded, format_relative_date, truncate};
use market_core::models::ListingSummary;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ListingCardProps {
    pub listing: ListingSummary,
}

#[function_component(ListingCard)]
pub fn listing_card(props: &ListingCardProps) -> Html {
    let listing = &props.listing;

    html! {
        <Link<AppRoute> to={AppRoute::ListingDetail { id: listing.id }} classes="listing-card">
            <div class="listing-card-image">
                if let Some(image) = &listing.first_image {
                    <img src={media_url(image)} alt={listing.title.clone()} />
                } else {
                    <div class="no-image-placeholder">{ "No image" }</div>
                }
            </div>
            <div class="listing-card-body">
                <div class="listing-card-price">{ format_price_rounded(listing.price) }</div>
                <h3 class="listing-card-title">{ truncate(&listing.title, 60) }</h3>
                if let Some(category) = &listing.category_name {
                    <span class="listing-card-category">{ category }</span>
                }
                <div class="listing-card-meta">
                    <span>{ format_relative_date(&listing.created_at, &Utc::now()) }</span>
                    if !listing.author_username.is_empty() {
                        <span>{ &listing.author_username }</span>
                    }
                </div>
            </div>
        </Link<AppRoute>>
    }
}
