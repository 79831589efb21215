use super::PageProps;
use crate::components::{input_value, select_value, ConfirmModal, ErrorMessage, LoadingSpinner};
use crate::router::AppRoute;
use market_core::admin::{
    block_control, AdminAction, AdminConsole, AdminFetch, AdminFetchRequest, AdminListingOrdering,
    AdminListingsQuery, AdminTab, AdminUsersQuery,
};
use market_core::error::ApiError;
use market_core::format::{format_date_short, format_price, truncate};
use market_core::models::{Listing, ListingStatus, ModerationAction, Page, User};
use market_core::request::LoadState;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    SwitchTab(AdminTab),
    UpdateSearch(String),
    Search,
    SetOrdering(AdminListingOrdering),
    Retry,
    ListingsLoaded(AdminFetch<AdminListingsQuery>, Result<Page<Listing>, ApiError>),
    UsersLoaded(AdminFetch<AdminUsersQuery>, Result<Page<User>, ApiError>),
    RequestDelete(i64),
    RequestBlockToggle(i64),
    Moderate(i64, ModerationAction),
    Cancel,
    Confirm,
    ActionDone(AdminAction, Result<(), ApiError>),
    Moderated(Result<Listing, ApiError>),
    DismissAlert,
}

pub struct AdminListingsPage {
    console: AdminConsole,
    busy: bool,
}

impl AdminListingsPage {
    fn fetch(ctx: &Context<Self>, request: AdminFetchRequest) {
        let http = ctx.props().session.http();
        let link = ctx.link().clone();
        spawn_local(async move {
            match request {
                AdminFetchRequest::Listings(ticket) => {
                    let result = http
                        .admin_listings(ticket.query())
                        .await
                        .map_err(|e| e.into_api_error());
                    link.send_message(Msg::ListingsLoaded(ticket, result));
                }
                AdminFetchRequest::Users(ticket) => {
                    let result = http
                        .admin_users(ticket.query())
                        .await
                        .map_err(|e| e.into_api_error());
                    link.send_message(Msg::UsersLoaded(ticket, result));
                }
            }
        });
    }

    fn search_term(&self) -> &str {
        match self.console.tab() {
            AdminTab::Listings => &self.console.listings().draft().search,
            AdminTab::Users => &self.console.users().draft().search,
        }
    }

    fn view_tabs(&self, ctx: &Context<Self>) -> Html {
        let tab = |target: AdminTab, label: &'static str| {
            html! {
                <button
                    class={classes!("admin-tab", (self.console.tab() == target).then_some("active"))}
                    onclick={ctx.link().callback(move |_| Msg::SwitchTab(target))}
                >
                    { label }
                </button>
            }
        };

        html! {
            <div class="admin-tabs">
                { tab(AdminTab::Listings, "Listings") }
                { tab(AdminTab::Users, "Users") }
            </div>
        }
    }

    fn view_toolbar(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Search
        });
        let placeholder = match self.console.tab() {
            AdminTab::Listings => "Search listings...",
            AdminTab::Users => "Search users...",
        };

        html! {
            <div class="admin-toolbar">
                <form class="admin-search" {onsubmit}>
                    <input
                        type="text"
                        class="form-input"
                        {placeholder}
                        value={self.search_term().to_string()}
                        oninput={link.callback(|e: InputEvent| Msg::UpdateSearch(input_value(&e)))}
                    />
                    <button type="submit" class="btn btn-secondary">{ "Search" }</button>
                </form>
                if self.console.tab() == AdminTab::Listings {
                    <select
                        class="form-select"
                        onchange={link.callback(|e: Event| {
                            Msg::SetOrdering(AdminListingOrdering::from_param(&select_value(&e)).unwrap_or_default())
                        })}
                    >
                        { for AdminListingOrdering::ALL.iter().map(|ordering| html! {
                            <option
                                value={ordering.as_param()}
                                selected={*ordering == self.console.listings().draft().ordering}
                            >
                                { ordering.label() }
                            </option>
                        }) }
                    </select>
                }
            </div>
        }
    }

    fn view_rows<T>(&self, ctx: &Context<Self>, state: &LoadState<Vec<T>>, rows: impl Fn(&[T]) -> Html) -> Html {
        match state {
            LoadState::Idle | LoadState::Loading => html! { <LoadingSpinner /> },
            LoadState::Failed(error) => html! {
                <ErrorMessage
                    message={error.user_message()}
                    on_retry={ctx.link().callback(|_: ()| Msg::Retry)}
                />
            },
            LoadState::Loaded(items) if items.is_empty() => html! {
                <div class="empty-state"><p>{ "Nothing found." }</p></div>
            },
            LoadState::Loaded(items) => rows(items.as_slice()),
        }
    }

    fn view_listings(&self, ctx: &Context<Self>, listings: &[Listing]) -> Html {
        let link = ctx.link();
        html! {
            <table class="admin-table">
                <thead>
                    <tr>
                        <th>{ "Title" }</th>
                        <th>{ "Author" }</th>
                        <th>{ "Price" }</th>
                        <th>{ "Status" }</th>
                        <th>{ "Created" }</th>
                        <th>{ "Actions" }</th>
                    </tr>
                </thead>
                <tbody>
                    { for listings.iter().map(|listing| {
                        let id = listing.id;
                        html! {
                            <tr key={id}>
                                <td>
                                    <Link<AppRoute> to={AppRoute::ListingDetail { id }}>
                                        { truncate(&listing.title, 50) }
                                    </Link<AppRoute>>
                                </td>
                                <td>{ &listing.author.username }</td>
                                <td>{ format_price(listing.price) }</td>
                                <td>
                                    <span class={classes!("status-badge", listing.status.as_str())}>
                                        { listing.status.as_str() }
                                    </span>
                                </td>
                                <td>{ format_date_short(&listing.created_at) }</td>
                                <td class="admin-actions">
                                    if listing.status != ListingStatus::Active {
                                        <button
                                            class="btn btn-small btn-success"
                                            disabled={self.busy}
                                            onclick={link.callback(move |_| Msg::Moderate(id, ModerationAction::Approve))}
                                        >
                                            { "Approve" }
                                        </button>
                                    }
                                    if listing.status != ListingStatus::Rejected {
                                        <button
                                            class="btn btn-small btn-secondary"
                                            disabled={self.busy}
                                            onclick={link.callback(move |_| Msg::Moderate(id, ModerationAction::Reject))}
                                        >
                                            { "Reject" }
                                        </button>
                                    }
                                    <button
                                        class="btn btn-small btn-danger"
                                        disabled={self.busy}
                                        onclick={link.callback(move |_| Msg::RequestDelete(id))}
                                    >
                                        { "Delete" }
                                    </button>
                                </td>
                            </tr>
                        }
                    }) }
                </tbody>
            </table>
        }
    }

    fn view_users(&self, ctx: &Context<Self>, users: &[User]) -> Html {
        let link = ctx.link();
        html! {
            <table class="admin-table">
                <thead>
                    <tr>
                        <th>{ "Username" }</th>
                        <th>{ "Email" }</th>
                        <th>{ "Listings" }</th>
                        <th>{ "Status" }</th>
                        <th>{ "Actions" }</th>
                    </tr>
                </thead>
                <tbody>
                    { for users.iter().map(|user| {
                        let status = if user.is_staff {
                            "staff"
                        } else if user.is_blocked {
                            "blocked"
                        } else {
                            "active"
                        };
                        html! {
                            <tr key={user.id}>
                                <td>{ &user.username }</td>
                                <td>{ &user.email }</td>
                                <td>{ user.active_listings_count.unwrap_or(0) }</td>
                                <td><span class={classes!("status-badge", status)}>{ status }</span></td>
                                <td class="admin-actions">
                                    if let Some(control) = block_control(user) {
                                        <button
                                            class={classes!("btn", "btn-small", if control.block { "btn-danger" } else { "btn-success" })}
                                            disabled={self.busy}
                                            onclick={link.callback(move |_| Msg::RequestBlockToggle(control.user_id))}
                                        >
                                            { control.label() }
                                        </button>
                                    }
                                </td>
                            </tr>
                        }
                    }) }
                </tbody>
            </table>
        }
    }
}

impl Component for AdminListingsPage {
    type Message = Msg;
    type Properties = PageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut console = AdminConsole::new();
        Self::fetch(ctx, console.refresh());
        Self {
            console,
            busy: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SwitchTab(tab) => {
                if tab == self.console.tab() {
                    return false;
                }
                Self::fetch(ctx, self.console.switch_tab(tab));
                true
            }
            Msg::UpdateSearch(search) => {
                match self.console.tab() {
                    AdminTab::Listings => self.console.listings_mut().set_search(&search),
                    AdminTab::Users => self.console.users_mut().set_search(&search),
                }
                true
            }
            Msg::Search | Msg::Retry => {
                Self::fetch(ctx, self.console.refresh());
                true
            }
            Msg::SetOrdering(ordering) => {
                let ticket = self.console.listings_mut().set_ordering(ordering);
                Self::fetch(ctx, AdminFetchRequest::Listings(ticket));
                true
            }
            Msg::ListingsLoaded(ticket, result) => {
                self.console.listings_mut().complete(ticket, result)
            }
            Msg::UsersLoaded(ticket, result) => self.console.users_mut().complete(ticket, result),

            Msg::RequestDelete(id) => self.console.request_delete(id),
            Msg::RequestBlockToggle(id) => self.console.request_block_toggle(id),
            Msg::Cancel => {
                self.console.cancel();
                true
            }
            Msg::Confirm => {
                let Some(action) = self.console.confirm() else {
                    return false;
                };
                self.busy = true;
                let http = ctx.props().session.http();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = match &action {
                        AdminAction::DeleteListing { id, .. } => http.admin_delete_listing(*id).await,
                        AdminAction::SetBlocked { user_id, block, .. } => {
                            http.admin_set_blocked(*user_id, *block).await.map(|_| ())
                        }
                    };
                    link.send_message(Msg::ActionDone(action, result.map_err(|e| e.into_api_error())));
                });
                true
            }
            Msg::ActionDone(action, result) => {
                self.busy = false;
                self.console.apply(&action, result);
                true
            }

            Msg::Moderate(id, action) => {
                self.busy = true;
                let http = ctx.props().session.http();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = http
                        .admin_moderate_listing(id, action)
                        .await
                        .map_err(|e| e.into_api_error());
                    link.send_message(Msg::Moderated(result));
                });
                true
            }
            Msg::Moderated(result) => {
                self.busy = false;
                self.console.apply_moderation(result);
                true
            }

            Msg::DismissAlert => {
                self.console.dismiss_alert();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let table = match self.console.tab() {
            AdminTab::Listings => self.view_rows(ctx, self.console.listings().state(), |rows| {
                self.view_listings(ctx, rows)
            }),
            AdminTab::Users => self.view_rows(ctx, self.console.users().state(), |rows| {
                self.view_users(ctx, rows)
            }),
        };

        html! {
            <div class="admin-page">
                <div class="admin-header">
                    <h1>{ "Moderation" }</h1>
                    <Link<AppRoute> to={AppRoute::AdminDashboard} classes="btn btn-secondary">
                        { "Dashboard" }
                    </Link<AppRoute>>
                </div>

                if let Some(alert) = self.console.alert() {
                    <div class="alert alert-error">
                        <span>{ alert }</span>
                        <button class="alert-close" onclick={link.callback(|_| Msg::DismissAlert)}>
                            { "×" }
                        </button>
                    </div>
                }

                { self.view_tabs(ctx) }
                { self.view_toolbar(ctx) }
                { table }

                if let Some(action) = self.console.pending() {
                    <ConfirmModal
                        title={action.heading()}
                        message={action.message()}
                        confirm_label={action.confirm_label()}
                        destructive={!matches!(action, AdminAction::SetBlocked { block: false, .. })}
                        on_confirm={link.callback(|_| Msg::Confirm)}
                        on_cancel={link.callback(|_| Msg::Cancel)}
                    />
                }
            </div>
        }
    }
}
