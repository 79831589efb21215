use super::PageProps;
use crate::components::{ErrorMessage, LoadingSpinner};
use crate::router::AppRoute;
use market_core::admin::{AdminDashboard, StatsTicket};
use market_core::error::ApiError;
use market_core::models::AdminStats;
use market_core::request::LoadState;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    Load,
    Loaded(StatsTicket, Result<AdminStats, ApiError>),
}

pub struct AdminDashboardPage {
    dashboard: AdminDashboard,
}

impl AdminDashboardPage {
    fn load(&mut self, ctx: &Context<Self>) {
        let ticket = self.dashboard.load();
        let http = ctx.props().session.http();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = http.admin_stats().await.map_err(|e| e.into_api_error());
            link.send_message(Msg::Loaded(ticket, result));
        });
    }

    fn stat_card(label: &'static str, value: u64) -> Html {
        html! {
            <div class="stat-card">
                <div class="stat-value">{ value }</div>
                <div class="stat-label">{ label }</div>
            </div>
        }
    }

    fn view_stats(stats: &AdminStats) -> Html {
        html! {
            <>
                <div class="stats-grid">
                    { Self::stat_card("Total Users", stats.total_users) }
                    { Self::stat_card("Active Users", stats.active_users) }
                    { Self::stat_card("Total Listings", stats.total_listings) }
                    { Self::stat_card("Active Listings", stats.active_listings) }
                    { Self::stat_card("Inactive Listings", stats.inactive_listings) }
                    { Self::stat_card("New in Last 7 Days", stats.listings_last_7_days) }
                </div>

                if !stats.user_activity.is_empty() {
                    <section class="admin-section">
                        <h2>{ "Most Active Users" }</h2>
                        <table class="admin-table">
                            <thead>
                                <tr>
                                    <th>{ "User" }</th>
                                    <th>{ "Listings" }</th>
                                </tr>
                            </thead>
                            <tbody>
                                { for stats.user_activity.iter().map(|activity| html! {
                                    <tr key={activity.id}>
                                        <td>{ &activity.username }</td>
                                        <td>{ activity.listings_count }</td>
                                    </tr>
                                }) }
                            </tbody>
                        </table>
                    </section>
                }
            </>
        }
    }
}

impl Component for AdminDashboardPage {
    type Message = Msg;
    type Properties = PageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut page = Self {
            dashboard: AdminDashboard::default(),
        };
        page.load(ctx);
        page
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.load(ctx);
                true
            }
            Msg::Loaded(ticket, result) => self.dashboard.complete(ticket, result),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let body = match self.dashboard.state() {
            LoadState::Idle | LoadState::Loading => html! { <LoadingSpinner /> },
            LoadState::Failed(error) => html! {
                <ErrorMessage
                    message={format!("Failed to load statistics. {}", error.user_message())}
                    on_retry={ctx.link().callback(|_: ()| Msg::Load)}
                />
            },
            LoadState::Loaded(stats) => Self::view_stats(stats),
        };

        html! {
            <div class="admin-page">
                <div class="admin-header">
                    <h1>{ "Admin Dashboard" }</h1>
                    <Link<AppRoute> to={AppRoute::AdminListings} classes="btn btn-primary">
                        { "Manage Listings & Users" }
                    </Link<AppRoute>>
                </div>
                { body }
            </div>
        }
    }
}
