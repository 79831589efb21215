mod logging;
mod token_store;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use market_client::{ClientError, MarketClient};
use market_core::admin::{
    AdminAction, AdminConsole, AdminFetchRequest, AdminListingOrdering, AdminTab,
};
use market_core::auth_form::{LoginForm, RegisterForm};
use market_core::browse::{BrowseDisplay, BrowseView, ListingFilters, ListingOrdering, ListingQuery};
use market_core::detail::{DetailDisplay, ListingDetailView};
use market_core::error::{ApiError, FieldErrors};
use market_core::format::{
    format_date, format_phone, format_price, format_price_rounded, format_relative_date, truncate,
};
use market_core::images::LocalImage;
use market_core::listing_form::{ListingField, ListingForm, SubmitOutcome, TITLE_MAX_CHARS};
use market_core::models::{ListingSummary, ModerationAction, User};
use market_core::profile::{ProfileField, ProfileForm};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use token_store::FileTokenStore;

type Client = MarketClient<FileTokenStore>;

#[derive(Parser)]
#[command(author, version, about = "Marketplace command-line client", long_about = None)]
struct Cli {
    #[arg(short, long, env = "MARKET_SERVER", default_value = "http://localhost:8000")]
    server: String,

    #[arg(long, env = "MARKET_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(short, long)]
        password: String,

        /// Defaults to the password itself.
        #[arg(long)]
        password_confirm: Option<String>,
    },

    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    Logout,

    Whoami,

    UpdateProfile {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    Categories,

    List {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        category: Option<i64>,

        #[arg(long)]
        min_price: Option<String>,

        #[arg(long)]
        max_price: Option<String>,

        #[arg(long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,

        #[arg(long)]
        page: Option<u32>,
    },

    /// Listings created by the signed-in user.
    Mine,

    Get {
        #[arg(short, long)]
        id: i64,
    },

    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        #[arg(long)]
        price: String,

        #[arg(short, long)]
        category: i64,

        /// Defaults to the phone on your profile.
        #[arg(long)]
        phone: Option<String>,

        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    Update {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(short, long)]
        category: Option<i64>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    Delete {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },

    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    Stats,

    Listings {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, value_enum, default_value_t = AdminSortArg::Newest)]
        sort: AdminSortArg,
    },

    Users {
        #[arg(short, long)]
        search: Option<String>,
    },

    DeleteListing {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },

    Block {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },

    Unblock {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },

    Approve {
        #[arg(short, long)]
        id: i64,
    },

    Reject {
        #[arg(short, long)]
        id: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
}

impl From<SortArg> for ListingOrdering {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => ListingOrdering::NewestFirst,
            SortArg::Oldest => ListingOrdering::OldestFirst,
            SortArg::PriceAsc => ListingOrdering::PriceLowToHigh,
            SortArg::PriceDesc => ListingOrdering::PriceHighToLow,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AdminSortArg {
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    Status,
}

impl From<AdminSortArg> for AdminListingOrdering {
    fn from(sort: AdminSortArg) -> Self {
        match sort {
            AdminSortArg::Newest => AdminListingOrdering::NewestFirst,
            AdminSortArg::Oldest => AdminListingOrdering::OldestFirst,
            AdminSortArg::PriceAsc => AdminListingOrdering::PriceLowToHigh,
            AdminSortArg::PriceDesc => AdminListingOrdering::PriceHighToLow,
            AdminSortArg::Status => AdminListingOrdering::Status,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let store = FileTokenStore::new(cli.token_file)?;
    tracing::debug!(server = %cli.server, token_file = ?store.path(), "Starting");
    let mut client = MarketClient::new(cli.server, store);

    match cli.command {
        Commands::Register {
            username,
            email,
            phone,
            password,
            password_confirm,
        } => {
            let form = RegisterForm {
                username,
                email,
                phone: phone.unwrap_or_default(),
                password_confirm: password_confirm.unwrap_or_else(|| password.clone()),
                password,
            };
            let request = match form.to_request() {
                Ok(request) => request,
                Err(errors) => fail_fields("Registration", &errors),
            };

            println!("📝 Registering user: {}", request.username);
            match client.sign_up(&request).await {
                Ok(user) => {
                    println!("{}", "✅ Registration successful!".green());
                    print_user(&user);
                }
                Err(e) => fail_with("Registration", e),
            }
        }

        Commands::Login { username, password } => {
            let request = match LoginForm::new(username, password).to_request() {
                Ok(request) => request,
                Err(errors) => fail_fields("Login", &errors),
            };

            println!("🔑 Logging in as: {}", request.username);
            match client.sign_in(&request).await {
                Ok(user) => {
                    println!("{}", "✅ Login successful!".green());
                    print_user(&user);
                }
                Err(e) => fail_with("Login", e),
            }
        }

        Commands::Logout => {
            client.sign_out().context("Failed to remove token file")?;
            println!("{}", "✅ Logged out".green());
        }

        Commands::Whoami => {
            let user = require_user(&mut client).await;
            print_user(&user);
        }

        Commands::UpdateProfile {
            username,
            email,
            phone,
        } => {
            let user = require_user(&mut client).await;
            let mut form = ProfileForm::from_user(&user);
            if let Some(username) = username {
                form.set_field(ProfileField::Username, &username);
            }
            if let Some(email) = email {
                form.set_field(ProfileField::Email, &email);
            }
            if let Some(phone) = phone {
                form.set_field(ProfileField::Phone, &phone);
            }

            let Some(update) = form.begin_submit() else {
                fail_fields("Profile update", form.errors());
            };
            let result = client
                .update_profile(&update)
                .await
                .map_err(ClientError::into_api_error);
            match form.finish_submit(result) {
                Some(user) => {
                    println!("{}", "✅ Profile updated".green());
                    print_user(&user);
                }
                None => fail_fields("Profile update", form.errors()),
            }
        }

        Commands::Categories => match client.http().categories().await {
            Ok(categories) => {
                println!("📂 {} categories", categories.len());
                for category in categories {
                    println!("   [{}] {}", category.id, category.name);
                }
            }
            Err(e) => fail_with("Loading categories", e),
        },

        Commands::List {
            search,
            category,
            min_price,
            max_price,
            sort,
            page,
        } => {
            let mut filters = ListingFilters {
                search: search.unwrap_or_default(),
                ..Default::default()
            };
            filters.category = category;
            filters.set_min_price(min_price.as_deref().unwrap_or_default());
            filters.set_max_price(max_price.as_deref().unwrap_or_default());

            let mut view = BrowseView::new(ListingQuery {
                filters,
                ordering: sort.into(),
            });
            let ticket = match page {
                Some(page) => view.set_page(page),
                None => view.refresh(),
            };
            println!("📋 Listings ({})", view.ordering().label());

            let result = client
                .http()
                .list_listings(ticket.query())
                .await
                .map_err(ClientError::into_api_error);
            view.complete(ticket, result);

            match view.display() {
                BrowseDisplay::Results(page) => {
                    println!("✅ Found {} listings (page {})", page.total(), view.current_page());
                    println!();
                    print_summaries(&page.items);
                    if page.has_next() {
                        println!("   More results: --page {}", view.current_page() + 1);
                    }
                }
                BrowseDisplay::Empty => {
                    println!("   No listings found");
                    if view.filters().has_active_filters() {
                        println!("   Tip: try removing some filters");
                    }
                }
                BrowseDisplay::Error(e) => fail(&format!("Failed to load listings: {}", e)),
                BrowseDisplay::Loading => {}
            }
        }

        Commands::Mine => {
            let user = require_user(&mut client).await;
            match client.http().my_listings().await {
                Ok(page) => {
                    println!("📋 Listings by {} ({})", user.username, page.total());
                    println!();
                    if page.items.is_empty() {
                        println!("   You have not created any listings yet");
                    }
                    print_summaries(&page.items);
                }
                Err(e) => fail_with("Loading your listings", e),
            }
        }

        Commands::Get { id } => {
            let mut view = ListingDetailView::new(id);
            let ticket = view.load();
            let result = client
                .http()
                .get_listing(ticket.listing_id())
                .await
                .map_err(ClientError::into_api_error);
            view.complete(ticket, result);

            match view.display() {
                DetailDisplay::Loaded(listing) => {
                    println!("🔍 Listing #{}", listing.id);
                    println!("   Title: {}", listing.title);
                    println!("   Price: {}", format_price(listing.price));
                    println!("   Status: {}", listing.status.as_str());
                    if let Some(category) = &listing.category {
                        println!("   Category: {}", category.name);
                    }
                    println!("   Seller: {}", listing.author.username);
                    println!("   Phone: {}", format_phone(&listing.phone));
                    println!("   Posted on {}", format_date(&listing.created_at));
                    println!("   Images: {}", listing.images.len());
                    for image in &listing.images {
                        println!("      {}", image.image);
                    }
                    println!();
                    println!("{}", listing.description);
                }
                DetailDisplay::NotFound => {
                    fail(&format!("Listing #{} not found", id));
                }
                DetailDisplay::Error(message) => fail(&message),
                DetailDisplay::Loading => {}
            }
        }

        Commands::Create {
            title,
            description,
            price,
            category,
            phone,
            images,
        } => {
            let mut form: ListingForm<LocalImage> = ListingForm::create(None);
            form.set_field(ListingField::Title, &title);
            form.set_field(ListingField::Description, &description);
            form.set_field(ListingField::Price, &price);
            form.set_field(ListingField::Category, &category.to_string());
            if let Some(phone) = &phone {
                form.set_field(ListingField::Phone, phone);
            }
            add_image_files(&mut form, &images)?;

            // The phone may still come from the profile; everything else is
            // checked before touching the network.
            let mut errors = form.validate();
            if phone.is_none() {
                errors.remove(ListingField::Phone.as_str());
            }
            if !errors.is_empty() {
                fail_fields("Create listing", &errors);
            }

            let user = require_user(&mut client).await;
            if phone.is_none() {
                form.set_field(ListingField::Phone, user.phone.as_deref().unwrap_or_default());
            }
            submit_listing(&client, &mut form).await;
        }

        Commands::Update {
            id,
            title,
            description,
            price,
            category,
            phone,
            images,
        } => {
            if title
                .as_ref()
                .is_some_and(|t| t.chars().count() > TITLE_MAX_CHARS)
            {
                fail("Title must be at most 200 characters");
            }
            let files = load_image_files(&images)?;

            let user = require_user(&mut client).await;
            let listing = match client.http().get_listing(id).await {
                Ok(listing) => listing,
                Err(e) => fail_with("Loading listing", e),
            };
            let mut form: ListingForm<LocalImage> = match ListingForm::for_edit(&listing, Some(&user)) {
                Ok(form) => form,
                Err(denied) => fail(&denied.to_string()),
            };

            let updates = [
                (ListingField::Title, title),
                (ListingField::Description, description),
                (ListingField::Price, price),
                (ListingField::Category, category.map(|c| c.to_string())),
                (ListingField::Phone, phone),
            ];
            for (field, value) in updates {
                if let Some(value) = value {
                    form.set_field(field, &value);
                }
            }
            report_image_outcome(form.add_images(files).messages());

            if !form.is_dirty() {
                println!("Nothing to update");
                return Ok(());
            }
            submit_listing(&client, &mut form).await;
        }

        Commands::Delete { id, yes } => {
            let prompt = format!(
                "Delete listing #{}? This action cannot be undone.",
                id
            );
            if !confirm(&prompt, yes)? {
                println!("Cancelled");
                return Ok(());
            }

            require_user(&mut client).await;
            println!("🗑️ Deleting listing #{}", id);
            match client.http().delete_listing(id).await {
                Ok(()) => println!("{}", "✅ Listing deleted".green()),
                Err(e) => fail_with("Delete", e),
            }
        }

        Commands::Admin { command } => {
            let user = require_user(&mut client).await;
            if !user.is_staff {
                fail("Administrator access required");
            }
            run_admin(&client, command).await?;
        }
    }

    Ok(())
}

async fn run_admin(client: &Client, command: AdminCommands) -> Result<()> {
    let http = client.http();
    let mut console = AdminConsole::new();

    match command {
        AdminCommands::Stats => match http.admin_stats().await {
            Ok(stats) => {
                println!("📊 Marketplace statistics");
                println!("   Users: {} ({} with listings)", stats.total_users, stats.active_users);
                println!(
                    "   Listings: {} total, {} active, {} inactive",
                    stats.total_listings, stats.active_listings, stats.inactive_listings
                );
                println!("   New in the last 7 days: {}", stats.listings_last_7_days);
                if !stats.user_activity.is_empty() {
                    println!();
                    println!("   Most active users:");
                    for activity in &stats.user_activity {
                        println!(
                            "      [{}] {} ({} listings)",
                            activity.id, activity.username, activity.listings_count
                        );
                    }
                }
            }
            Err(e) => fail_with("Loading statistics", e),
        },

        AdminCommands::Listings { search, sort } => {
            console
                .listings_mut()
                .set_search(search.as_deref().unwrap_or_default());
            let ticket = console.listings_mut().set_ordering(sort.into());
            let result = http
                .admin_listings(ticket.query())
                .await
                .map_err(ClientError::into_api_error);
            console.listings_mut().complete(ticket, result);

            if let Some(e) = console.listings().state().error() {
                fail(&format!("Failed to load listings: {}", e));
            }
            let rows = console.listings().rows();
            println!("📋 {} listings", rows.len());
            for listing in rows {
                println!(
                    "   [{}] {} | {} | {} | by {} | {}",
                    listing.id,
                    truncate(&listing.title, 40),
                    format_price(listing.price),
                    listing.status.as_str(),
                    listing.author.username,
                    format_date(&listing.created_at)
                );
            }
        }

        AdminCommands::Users { search } => {
            console
                .users_mut()
                .set_search(search.as_deref().unwrap_or_default());
            load_users(client, &mut console).await;
            let rows = console.users().rows();
            println!("👥 {} users", rows.len());
            for user in rows {
                let role = if user.is_staff { "admin" } else { "user" };
                let status = if user.is_blocked { "blocked" } else { "active" };
                println!(
                    "   [{}] {} <{}> | {} | {}",
                    user.id, user.username, user.email, role, status
                );
            }
        }

        AdminCommands::DeleteListing { id, yes } => {
            let AdminFetchRequest::Listings(ticket) = console.switch_tab(AdminTab::Listings) else {
                return Ok(());
            };
            let result = http
                .admin_listings(ticket.query())
                .await
                .map_err(ClientError::into_api_error);
            console.listings_mut().complete(ticket, result);
            if let Some(e) = console.listings().state().error() {
                fail(&format!("Failed to load listings: {}", e));
            }
            while !console.listings().rows().iter().any(|l| l.id == id) {
                let Some(next) = console.listings().next_page().map(str::to_string) else {
                    fail(&format!("Listing #{} not found", id));
                };
                match http.follow_page(&next).await {
                    Ok(page) => {
                        console.listings_mut().extend(page);
                    }
                    Err(e) => fail_with("Loading listings", e),
                }
            }
            console.request_delete(id);
            confirm_and_apply(client, &mut console, yes).await?;
        }

        AdminCommands::Block { id, yes } => set_blocked(client, &mut console, id, true, yes).await?,
        AdminCommands::Unblock { id, yes } => {
            set_blocked(client, &mut console, id, false, yes).await?
        }

        AdminCommands::Approve { id } => moderate(client, id, ModerationAction::Approve).await,
        AdminCommands::Reject { id } => moderate(client, id, ModerationAction::Reject).await,
    }

    Ok(())
}

async fn load_users(client: &Client, console: &mut AdminConsole) {
    let AdminFetchRequest::Users(ticket) = console.switch_tab(AdminTab::Users) else {
        return;
    };
    let result = client
        .http()
        .admin_users(ticket.query())
        .await
        .map_err(ClientError::into_api_error);
    console.users_mut().complete(ticket, result);
    if let Some(e) = console.users().state().error() {
        fail(&format!("Failed to load users: {}", e));
    }
}

async fn set_blocked(
    client: &Client,
    console: &mut AdminConsole,
    id: i64,
    block: bool,
    yes: bool,
) -> Result<()> {
    load_users(client, console).await;
    while !console.users().rows().iter().any(|u| u.id == id) {
        let Some(next) = console.users().next_page().map(str::to_string) else {
            fail(&format!("User #{} not found", id));
        };
        match client.http().follow_page(&next).await {
            Ok(page) => {
                console.users_mut().extend(page);
            }
            Err(e) => fail_with("Loading users", e),
        }
    }
    if !console.request_block_toggle(id) {
        match console.users().rows().iter().find(|u| u.id == id) {
            Some(_) => fail("Cannot block admin users"),
            None => fail(&format!("User #{} not found", id)),
        }
    }

    let already = match console.pending() {
        Some(AdminAction::SetBlocked {
            username,
            block: toggles_to,
            ..
        }) if *toggles_to != block => Some(username.clone()),
        _ => None,
    };
    if let Some(username) = already {
        let state = if block { "blocked" } else { "active" };
        println!("{} is already {}", username, state);
        console.cancel();
        return Ok(());
    }

    confirm_and_apply(client, console, yes).await
}

async fn confirm_and_apply(client: &Client, console: &mut AdminConsole, yes: bool) -> Result<()> {
    let Some(pending) = console.pending().cloned() else {
        return Ok(());
    };
    println!("{}", pending.heading().bold());
    if !confirm(&pending.message(), yes)? {
        console.cancel();
        println!("Cancelled");
        return Ok(());
    }

    let Some(action) = console.confirm() else {
        return Ok(());
    };
    let result = match &action {
        AdminAction::DeleteListing { id, .. } => client.http().admin_delete_listing(*id).await,
        AdminAction::SetBlocked { user_id, block, .. } => client
            .http()
            .admin_set_blocked(*user_id, *block)
            .await
            .map(|_| ()),
    };

    if console.apply(&action, result.map_err(ClientError::into_api_error)) {
        println!("{}", format!("✅ {} done", action.confirm_label()).green());
    } else if let Some(alert) = console.alert() {
        fail(alert);
    }
    Ok(())
}

async fn moderate(client: &Client, id: i64, action: ModerationAction) {
    match client.http().admin_moderate_listing(id, action).await {
        Ok(listing) => println!(
            "{}",
            format!("✅ Listing #{} is now {}", listing.id, listing.status.as_str()).green()
        ),
        Err(e) => fail_with("Moderation", e),
    }
}

async fn submit_listing(client: &Client, form: &mut ListingForm<LocalImage>) {
    let Some(submission) = form.begin_submit() else {
        fail_fields("Saving listing", form.errors());
    };
    println!("📝 Saving listing...");
    let result = client
        .http()
        .save_listing(&submission)
        .await
        .map_err(ClientError::into_api_error);

    match form.finish_submit(result) {
        SubmitOutcome::Saved(route) => {
            println!("{}", "✅ Listing saved".green());
            println!("   {}", route);
        }
        SubmitOutcome::Invalid => fail_fields("Saving listing", form.errors()),
        SubmitOutcome::Failed(message) => fail(&message),
    }
}

async fn require_user(client: &mut Client) -> User {
    match client.refresh_from_stored_token().await {
        Ok(Some(user)) => user,
        Ok(None) => fail(
            "Not logged in. Please login first: market-cli login --username <username> --password <password>",
        ),
        Err(e) if e.is_unauthorized() => fail("Session expired. Please login again"),
        Err(e) => fail(&format!("Failed to verify session: {}", e)),
    }
}

fn load_image_files(paths: &[PathBuf]) -> Result<Vec<LocalImage>> {
    paths.iter().map(|path| load_image(path)).collect()
}

fn load_image(path: &Path) -> Result<LocalImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read image {:?}", path))?;
    let mime = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(LocalImage::new(name, mime, bytes))
}

fn add_image_files(form: &mut ListingForm<LocalImage>, paths: &[PathBuf]) -> Result<()> {
    let files = load_image_files(paths)?;
    report_image_outcome(form.add_images(files).messages());
    Ok(())
}

fn report_image_outcome(messages: Vec<String>) {
    for message in messages {
        println!("{} {}", "⚠️".yellow(), message);
    }
}

/// Asks on stdin unless `--yes` was given. Anything but y/yes declines.
fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_user(user: &User) {
    println!("   User ID: {}", user.id);
    println!("   Username: {}", user.username);
    println!("   Email: {}", user.email);
    if let Some(phone) = &user.phone {
        println!("   Phone: {}", format_phone(phone));
    }
    if user.is_staff {
        println!("   Role: administrator");
    }
    if user.is_blocked {
        println!("   {}", "Account is blocked".red());
    }
}

fn print_summaries(listings: &[ListingSummary]) {
    let now = Utc::now();
    for (i, listing) in listings.iter().enumerate() {
        println!(
            "   {}. [{}] {} {}",
            i + 1,
            listing.id,
            listing.title,
            format_price_rounded(listing.price).bold()
        );
        if let Some(category) = &listing.category_name {
            println!("      Category: {}", category);
        }
        println!(
            "      {} by {}",
            format_relative_date(&listing.created_at, &now),
            listing.author_username
        );
        if !listing.description.is_empty() {
            println!("      {}", truncate(&listing.description, 60));
        }
        println!();
    }
}

fn fail(message: &str) -> ! {
    println!("{} {}", "❌".red(), message);
    std::process::exit(1);
}

fn fail_fields(action: &str, errors: &FieldErrors) -> ! {
    println!("{} {} failed:", "❌".red(), action);
    for (field, message) in errors.iter() {
        println!("   {}: {}", field, message);
    }
    std::process::exit(1);
}

fn fail_with(action: &str, err: ClientError) -> ! {
    match err.into_api_error() {
        ApiError::Unauthorized(_) => fail(
            "Unauthorized. Please login first: market-cli login --username <username> --password <password>",
        ),
        ApiError::Forbidden(reason) if !reason.is_empty() => {
            fail(&format!("{} failed: {}", action, reason))
        }
        ApiError::Validation(errors) => fail_fields(action, &errors),
        ApiError::NotFound => fail(&format!("{} failed: not found", action)),
        other => fail(&format!("{} failed: {}", action, other)),
    }
}
