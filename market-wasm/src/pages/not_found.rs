use crate::router::AppRoute;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <div class="not-found-page">
            <h1>{ "404" }</h1>
            <p>{ "The page you are looking for does not exist." }</p>
            <Link<AppRoute> to={AppRoute::Home} classes="btn btn-primary">
                { "Back to listings" }
            </Link<AppRoute>>
        </div>
    }
}
