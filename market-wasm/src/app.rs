use crate::api;
use crate::components::{Footer, LoadingSpinner, Navbar};
use crate::pages::{
    AdminDashboardPage, AdminListingsPage, HomePage, ListingDetailPage, ListingFormPage,
    LoginPage, NotFoundPage, ProfilePage, RegisterPage,
};
use crate::router::AppRoute;
use crate::storage::LocalTokenStore;
use market_client::HttpClient;
use market_core::error::ApiError;
use market_core::models::{AuthResponse, User};
use market_core::routes::{guard_route, GuardDecision, Route};
use market_core::session::{Session, SessionState};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

/// Read-only view of the session handed to every page, plus the callbacks
/// that are allowed to change it.
#[derive(Clone, PartialEq)]
pub struct SessionContext {
    pub state: SessionState,
    token: Option<String>,
    /// Bumped on every session change; `User` equality only compares ids.
    revision: u64,
    pub on_auth: Callback<AuthResponse>,
    pub on_sign_out: Callback<()>,
    pub on_user_updated: Callback<User>,
}

impl SessionContext {
    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    /// Client authorized as the current user.
    pub fn http(&self) -> HttpClient {
        api::client(self.token.clone())
    }
}

pub enum Msg {
    Hydrated(Result<User, ApiError>),
    Authenticated(AuthResponse),
    SignOut,
    UserUpdated(User),
}

pub struct App {
    session: Session<LocalTokenStore>,
    revision: u64,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut session = Session::new(LocalTokenStore);

        if let Some(token) = session.begin_hydrate() {
            let http = api::client(Some(token));
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = http.profile().await.map_err(|e| e.into_api_error());
                link.send_message(Msg::Hydrated(result));
            });
        }

        Self {
            session,
            revision: 0,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        self.revision += 1;
        match msg {
            Msg::Hydrated(result) => {
                self.session.finish_hydrate(result);
                true
            }

            Msg::Authenticated(auth) => {
                if let Err(e) = self.session.establish(auth) {
                    log::error!("Failed to persist token: {}", e);
                }
                true
            }

            Msg::SignOut => {
                if let Err(e) = self.session.sign_out() {
                    log::warn!("Failed to clear token: {}", e);
                }
                true
            }

            Msg::UserUpdated(user) => {
                self.session.update_user(user);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let context = SessionContext {
            state: self.session.state().clone(),
            token: self.session.access_token().map(str::to_string),
            revision: self.revision,
            on_auth: ctx.link().callback(Msg::Authenticated),
            on_sign_out: ctx.link().callback(|_| Msg::SignOut),
            on_user_updated: ctx.link().callback(Msg::UserUpdated),
        };

        html! {
            <ContextProvider<SessionContext> context={context}>
                <BrowserRouter>
                    <div class="app">
                        <Navbar />
                        <main class="main-content">
                            <Switch<AppRoute> render={switch} />
                        </main>
                        <Footer />
                    </div>
                </BrowserRouter>
            </ContextProvider<SessionContext>>
        }
    }
}

fn switch(route: AppRoute) -> Html {
    html! { <GuardedRoute route={route} /> }
}

#[derive(Properties, PartialEq)]
struct GuardedRouteProps {
    route: AppRoute,
}

/// Applies the route guard, then renders the page.
#[function_component(GuardedRoute)]
fn guarded_route(props: &GuardedRouteProps) -> Html {
    let Some(session) = use_context::<SessionContext>() else {
        return html! { <LoadingSpinner /> };
    };

    let route: Route = props.route.into();
    match guard_route(&route, &session.state) {
        GuardDecision::Pending => html! {},
        GuardDecision::Redirect(target) => {
            html! { <Redirect<AppRoute> to={AppRoute::from(target)} /> }
        }
        GuardDecision::Allow => render_page(route, session),
    }
}

fn render_page(route: Route, session: SessionContext) -> Html {
    match route {
        Route::Home => html! { <HomePage session={session} /> },
        Route::Login => html! { <LoginPage session={session} /> },
        Route::Register => html! { <RegisterPage session={session} /> },
        Route::Profile => html! { <ProfilePage session={session} /> },
        Route::CreateListing => html! { <ListingFormPage session={session} listing_id={None::<i64>} /> },
        Route::ListingDetail(id) => html! { <ListingDetailPage session={session} id={id} /> },
        Route::EditListing(id) => html! { <ListingFormPage session={session} listing_id={Some(id)} /> },
        Route::AdminDashboard => html! { <AdminDashboardPage session={session} /> },
        Route::AdminListings => html! { <AdminListingsPage session={session} /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}
