use super::input_value;
use crate::app::SessionContext;
use crate::router::AppRoute;
use market_core::session::SessionState;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(Navbar)]
pub fn navbar() -> Html {
    let session = use_context::<SessionContext>();
    let navigator = use_navigator();
    let search = use_state(String::new);

    let on_search_input = {
        let search = search.clone();
        Callback::from(move |e: InputEvent| search.set(input_value(&e)))
    };

    let on_search_submit = {
        let search = search.clone();
        let navigator = navigator.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(navigator) = &navigator else {
                return;
            };
            let term = search.trim().to_string();
            let result = if term.is_empty() {
                navigator.push(&AppRoute::Home);
                Ok(())
            } else {
                navigator.push_with_query(&AppRoute::Home, &[("search", term)])
            };
            if let Err(e) = result {
                log::warn!("Failed to navigate to search results: {}", e);
            }
        })
    };

    let on_logout = {
        let session = session.clone();
        let navigator = navigator.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(session) = &session {
                session.on_sign_out.emit(());
            }
            if let Some(navigator) = &navigator {
                navigator.push(&AppRoute::Home);
            }
        })
    };

    let state = session.map(|s| s.state).unwrap_or(SessionState::Loading);

    html! {
        <nav class="navbar">
            <div class="navbar-container">
                <Link<AppRoute> to={AppRoute::Home} classes="navbar-logo">
                    { "ClassifiedsBoard" }
                </Link<AppRoute>>

                <form class="navbar-search" onsubmit={on_search_submit}>
                    <input
                        type="text"
                        class="navbar-search-input"
                        placeholder="Search listings..."
                        value={(*search).clone()}
                        oninput={on_search_input}
                    />
                    <button type="submit" class="navbar-search-button">{ "Search" }</button>
                </form>

                <div class="navbar-menu">
                    {
                        match &state {
                            SessionState::Loading => html! {},
                            SessionState::SignedIn(user) => html! {
                                <>
                                    <Link<AppRoute> to={AppRoute::CreateListing} classes="navbar-button navbar-button-primary">
                                        { "+ Post Ad" }
                                    </Link<AppRoute>>
                                    <Link<AppRoute> to={AppRoute::Profile} classes="navbar-link">
                                        { &user.username }
                                    </Link<AppRoute>>
                                    if user.is_staff {
                                        <Link<AppRoute> to={AppRoute::AdminDashboard} classes="navbar-link">
                                            { "Admin" }
                                        </Link<AppRoute>>
                                    }
                                    <button class="navbar-button" onclick={on_logout}>{ "Logout" }</button>
                                </>
                            },
                            SessionState::Anonymous => html! {
                                <>
                                    <Link<AppRoute> to={AppRoute::Login} classes="navbar-link">{ "Login" }</Link<AppRoute>>
                                    <Link<AppRoute> to={AppRoute::Register} classes="navbar-button navbar-button-primary">
                                        { "Register" }
                                    </Link<AppRoute>>
                                </>
                            },
                        }
                    }
                </div>
            </div>
        </nav>
    }
}
